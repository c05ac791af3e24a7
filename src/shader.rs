//! Point-sprite shader and its uniform block.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// WGSL for camera-facing particle quads, one instance per particle.
///
/// Vertex inputs: location 0 position, location 1 color (both `vec3<f32>`,
/// one buffer each, stepped per instance).
pub const POINTS_SHADER: &str = include_str!("points.wgsl");

/// Matches `struct Uniforms` in `points.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub point_size: f32,
    pub opacity: f32,
    pub _padding: [f32; 2],
}

impl Uniforms {
    pub fn new(view: Mat4, proj: Mat4, model: Mat4, point_size: f32, opacity: f32) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            point_size,
            opacity,
            _padding: [0.0; 2],
        }
    }
}
