//! GPU snow renderer
//!
//! Draws every particle layer as instanced, screen-facing quads with
//! additive blending, sharing one position buffer across layers.

mod renderer;

pub use renderer::{CameraUniforms, LayerFrame, LayerUniforms, SnowCallback, SnowRenderer};
