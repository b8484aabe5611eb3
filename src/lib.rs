//! petal-ngin
//!
//! A small instancing renderer for one scene: a glTF model floating in a
//! slowly turning cloud of petals, with the model draggable by pointer and an
//! ambient track behind a play button. It runs natively and on the web.
//!
//! High-level modules
//! - `scene`: the petal scene and its entry points ([`scene::create_scene`])
//! - `config`: asset locations and tuning constants, with the two presets
//! - `particles`: point sampling inside a sphere
//! - `petals`: petal placement and per-frame motion
//! - `interaction`: pointer dragging against the camera-facing plane
//! - `audio`: play/pause state over a platform audio backend
//! - `frame`: frame-rate independent ticks
//! - `flow`: the event loop and the [`flow::GraphicsFlow`] trait
//! - `context`: window, device, queue, camera and light
//! - `data_structures`: models, textures, instances, scene nodes and groups
//! - `pipelines`: the render pipeline and light uniform
//! - `resources`: binary and glTF loading
//! - `render`: render composition for instanced draws
//!

pub mod assets;
pub mod audio;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod flow;
pub mod frame;
pub mod interaction;
pub mod particles;
pub mod petals;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use config::{DragTarget, SceneConfig};
pub use scene::create_scene;
pub use winit::event::WindowEvent;
