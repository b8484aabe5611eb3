//! Render pipelines.
//!
//! - `basic` is the instanced, ambient-lit pipeline for glTF meshes
//! - `light` holds the ambient light uniform and its bind group

pub mod basic;
pub mod light;

/// All pipelines the engine renders with.
#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
}
