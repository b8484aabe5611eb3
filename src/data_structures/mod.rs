//! Engine data structures: models, textures, scene graphs, and instances.
//!
//! - `model` contains mesh and material definitions, GPU resources for 3D models
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation data
//! - `bounds` is the axis-aligned box used for picking
//! - `scene_graph` enables hierarchical scene organization
//! - `group` is a flat set of nodes moved and spun together

pub mod bounds;
pub mod group;
pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
