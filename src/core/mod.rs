//! Platform-agnostic core - scene construction and per-frame animation,
//! shared between the browser app, the native window and headless runs

pub mod animation;
pub mod camera;
pub mod color;
pub mod field;
pub mod input;
pub mod layer;
pub mod render_loop;
pub mod scene;
pub mod sprite;
pub mod stats;

pub use animation::{elapsed_scalar, Snowfall, TIME_SCALE};
pub use camera::Camera;
pub use color::{cycled_hue, Hsl};
pub use field::{SnowField, POINT_COUNT};
pub use input::{PointerEvent, PointerState, Viewport};
pub use layer::{layer_spin, Blending, LayerParams, ParticleLayer, PointMaterial, LAYER_COUNT, LAYER_PARAMS};
pub use render_loop::{Clock, DebugStats, FrameInfo, FrameScheduler, Immediate, RenderLoop, Renderer, WallClock};
pub use scene::{Fog, Scene, SceneBuilder};
pub use sprite::{decode_sprite, SpriteId, SpriteImage, SpriteLoader, SpriteSlot, SpriteStore};
pub use stats::FpsCounter;
