pub mod gpu;
pub mod helpers;

use crate::textures::DecodedImage;
use glam::{Mat4, Vec3};
use thiserror::Error;

pub use gpu::GpuRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not create drawing surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter")]
    NoAdapter,
    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface frame unavailable: {0}")]
    Frame(#[from] wgpu::SurfaceError),
    #[error("texture upload for slot {slot} rejected: {reason}")]
    Upload { slot: usize, reason: String },
}

/// Per-tile draw data, one entry per visible tile.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileInstance {
    /// World-space centre, then half-extent in world units.
    pub center_size: [f32; 4],
    /// Tangent right, then emphasis in 0..1.
    pub right_emphasis: [f32; 4],
    pub up: [f32; 3],
    /// Texture slot (item index).
    pub slot: u32,
}

impl TileInstance {
    pub fn new(center: Vec3, half_size: f32, right: Vec3, up: Vec3, emphasis: f32, slot: usize) -> Self {
        Self {
            center_size: [center.x, center.y, center.z, half_size],
            right_emphasis: [right.x, right.y, right.z, emphasis],
            up: up.to_array(),
            slot: slot as u32,
        }
    }

    pub fn emphasis(&self) -> f32 {
        self.right_emphasis[3]
    }

    pub fn half_size(&self) -> f32 {
        self.center_size[3]
    }

    pub fn slot(&self) -> usize {
        self.slot as usize
    }
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct SceneFrame<'a> {
    pub view_proj: Mat4,
    pub instances: &'a [TileInstance],
}

/// Drawing backend driven by the engine. Implementations must tolerate
/// `draw` before any texture has been uploaded.
pub trait SceneRenderer {
    /// New backing size in physical pixels; never called with a zero side.
    fn resize(&mut self, width: u32, height: u32);
    fn upload_texture(&mut self, slot: usize, image: &DecodedImage) -> Result<(), RenderError>;
    fn draw(&mut self, frame: &SceneFrame<'_>) -> Result<(), RenderError>;
}
