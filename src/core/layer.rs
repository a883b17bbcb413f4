//! Particle layers: fixed parameters, point material, per-layer transform

use std::f64::consts::TAU;

use nalgebra::{Matrix4, Rotation3, Vector3};
use rand::Rng;

use super::color::{cycled_hue, Hsl};
use super::field::SnowField;
use super::sprite::SpriteId;

/// Number of particle layers.
pub const LAYER_COUNT: usize = 5;

/// Layers with index below this spin positively, the rest negatively.
const FORWARD_SPIN_LAYERS: usize = 4;

/// Upper bound (exclusive) of the random initial rotation per axis.
pub const MAX_INITIAL_ROTATION: f32 = 6.0;

/// Fixed (color, sprite, size) parameters of one layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerParams {
    pub color: Hsl,
    pub sprite: SpriteId,
    pub size: f32,
}

const fn sprite(n: u8) -> SpriteId {
    match SpriteId::new(n) {
        Some(id) => id,
        None => panic!("sprite number out of range"),
    }
}

/// The five layers, largest and reddest flakes first.
pub const LAYER_PARAMS: [LayerParams; LAYER_COUNT] = [
    LayerParams { color: Hsl::new(1.0, 0.2, 0.5), sprite: sprite(2), size: 20.0 },
    LayerParams { color: Hsl::new(0.95, 0.2, 0.5), sprite: sprite(3), size: 15.0 },
    LayerParams { color: Hsl::new(0.9, 0.2, 0.5), sprite: sprite(1), size: 10.0 },
    LayerParams { color: Hsl::new(0.85, 0.2, 0.5), sprite: sprite(5), size: 8.0 },
    LayerParams { color: Hsl::new(0.8, 0.2, 0.5), sprite: sprite(4), size: 5.0 },
];

/// How overlapping fragments combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blending {
    Normal,
    Additive,
}

/// Point material: what the renderer needs to draw one layer.
#[derive(Clone, Debug, PartialEq)]
pub struct PointMaterial {
    pub color: Hsl,
    pub size: f32,
    /// Sprite drawn at every point; `None` renders plain colored squares.
    pub map: Option<SpriteId>,
    pub blending: Blending,
    pub transparent: bool,
    pub depth_test: bool,
    /// Set when `map` changed. The renderer rebinds the layer's sprite on
    /// it; the frame loop clears it after the frame is rendered.
    pub needs_update: bool,
}

impl PointMaterial {
    /// Additive, transparent, no depth test: overlapping layers glow.
    pub fn snow(params: &LayerParams) -> Self {
        Self {
            color: params.color,
            size: params.size,
            map: Some(params.sprite),
            blending: Blending::Additive,
            transparent: true,
            depth_test: false,
            needs_update: false,
        }
    }
}

/// Euler rotation in radians, applied X then Y then Z.
///
/// Kept in f64: the Y component is driven by the wall clock and grows
/// without bound.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Rotation {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let max = MAX_INITIAL_ROTATION as f64;
        Self {
            x: rng.gen_range(0.0..max),
            y: rng.gen_range(0.0..max),
            z: rng.gen_range(0.0..max),
        }
    }

    /// Model matrix for this rotation.
    pub fn matrix(&self) -> Matrix4<f32> {
        let angle = |a: f64| a.rem_euclid(TAU) as f32;
        let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), angle(self.x))
            * Rotation3::from_axis_angle(&Vector3::y_axis(), angle(self.y))
            * Rotation3::from_axis_angle(&Vector3::z_axis(), angle(self.z));
        rotation.to_homogeneous()
    }
}

/// Y-axis spin of layer `index` at elapsed-time scalar `t`.
///
/// `t * (i + 1)` for the first four layers, `t * -(i + 1)` after that.
pub fn layer_spin(index: usize, t: f64) -> f64 {
    let rate = (index + 1) as f64;
    if index < FORWARD_SPIN_LAYERS {
        t * rate
    } else {
        -t * rate
    }
}

/// One renderable group of points: the shared field plus its own material
/// and transform.
#[derive(Clone, Debug)]
pub struct ParticleLayer {
    pub params: LayerParams,
    pub field: SnowField,
    pub material: PointMaterial,
    pub rotation: Rotation,
}

impl ParticleLayer {
    pub fn new(params: LayerParams, field: SnowField, rotation: Rotation) -> Self {
        Self {
            material: PointMaterial::snow(&params),
            params,
            field,
            rotation,
        }
    }

    /// Per-frame update: spin around Y and cycle the hue.
    pub fn animate(&mut self, index: usize, t: f64) {
        self.rotation.y = layer_spin(index, t);
        let hue = cycled_hue(self.params.color.h, t);
        self.material.color = self.params.color.with_hue(hue);
    }

    /// Show or hide the sprite map. Color and size are untouched.
    pub fn set_texture_visible(&mut self, visible: bool) {
        self.material.map = visible.then_some(self.params.sprite);
        self.material.needs_update = true;
    }
}
