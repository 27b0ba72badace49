pub mod camera;
pub mod config;
pub mod constants;
pub mod engine;
pub mod geometry;
pub mod input;
pub mod item;
pub mod observer;
pub mod render;
pub mod resolver;
pub mod scheduler;
pub mod textures;

pub static TILES_WGSL: &str = include_str!("../shaders/tiles.wgsl");

pub use camera::{Camera, Viewport};
pub use config::MenuConfig;
pub use engine::MenuEngine;
pub use geometry::{build_layout, SphereLayout, Tile};
pub use input::{DragPhase, InteractionController, Release};
pub use item::{default_items, MenuItem};
pub use observer::{ActiveItemObserver, MovingObserver};
pub use render::{GpuRenderer, RenderError, SceneFrame, SceneRenderer, TileInstance};
pub use resolver::{nearest_tile, ActiveItemResolver};
pub use scheduler::{run_fixed, FrameDriver, FrameTimer};
pub use textures::{decode_image, DecodedImage, ImageLoader, SlotState, TextureError, TextureSink, TextureTable};
