//! Scene construction: one snow field, five particle layers

use rand::Rng;
use tracing::{debug, info};

use super::field::SnowField;
use super::layer::{LayerParams, ParticleLayer, Rotation, LAYER_PARAMS};
use super::sprite::SpriteLoader;

/// Exponential-squared fog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: [f32; 3],
    pub density: f32,
}

impl Fog {
    /// Fraction of fog color at `depth` units from the camera.
    pub fn factor(&self, depth: f32) -> f32 {
        let d = self.density * depth;
        (1.0 - (-d * d).exp()).clamp(0.0, 1.0)
    }
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: [0.0; 3],
            density: 0.0008,
        }
    }
}

/// Scene graph: particle layers in insertion order.
#[derive(Clone, Debug)]
pub struct Scene {
    pub field: SnowField,
    pub layers: Vec<ParticleLayer>,
    pub fog: Fog,
}

/// Builds the snow scene from a fixed parameter table.
pub struct SceneBuilder<'a> {
    params: &'a [LayerParams],
    assets_dir: String,
}

impl Default for SceneBuilder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBuilder<'static> {
    pub fn new() -> Self {
        Self {
            params: &LAYER_PARAMS,
            assets_dir: String::new(),
        }
    }
}

impl<'a> SceneBuilder<'a> {
    /// Directory sprite paths are resolved against.
    pub fn assets_dir(mut self, dir: impl Into<String>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    /// Sample the field, start one sprite load per layer, and create the
    /// layers with random initial rotations.
    pub fn build<R, L>(&self, rng: &mut R, loader: &mut L) -> Scene
    where
        R: Rng + ?Sized,
        L: SpriteLoader + ?Sized,
    {
        let field = SnowField::sample(&mut *rng);

        for params in self.params {
            let url = params.sprite.url(&self.assets_dir);
            debug!(sprite = %params.sprite, url = %url, "Requesting sprite");
            loader.load(params.sprite, &url);
        }

        let layers: Vec<ParticleLayer> = self
            .params
            .iter()
            .map(|params| ParticleLayer::new(*params, field.clone(), Rotation::random(&mut *rng)))
            .collect();

        info!(layers = layers.len(), points = field.len(), "Scene built");

        Scene {
            field,
            layers,
            fog: Fog::default(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::field::POINT_COUNT;
    use crate::core::layer::LAYER_COUNT;
    use crate::core::sprite::SpriteId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Records load requests without loading anything.
    #[derive(Default)]
    pub(crate) struct RecordingLoader {
        pub requests: Vec<(SpriteId, String)>,
    }

    impl SpriteLoader for RecordingLoader {
        fn load(&mut self, id: SpriteId, path: &str) {
            self.requests.push((id, path.to_string()));
        }
    }

    #[test]
    fn five_layers_share_one_field() {
        for seed in [0u64, 1, 2, 77, 12345] {
            let mut loader = RecordingLoader::default();
            let scene = SceneBuilder::new().build(&mut StdRng::seed_from_u64(seed), &mut loader);
            assert_eq!(scene.layers.len(), LAYER_COUNT);
            assert_eq!(scene.field.len(), POINT_COUNT);
            for layer in &scene.layers {
                assert!(layer.field.shares_storage_with(&scene.field));
            }
        }
    }

    #[test]
    fn one_sprite_request_per_layer() {
        let mut loader = RecordingLoader::default();
        SceneBuilder::new()
            .assets_dir("./assets")
            .build(&mut StdRng::seed_from_u64(0), &mut loader);
        assert_eq!(loader.requests.len(), LAYER_COUNT);
        let numbers: Vec<u8> = loader.requests.iter().map(|(id, _)| id.number()).collect();
        assert_eq!(numbers, vec![2, 3, 1, 5, 4]);
        assert_eq!(loader.requests[0].1, "./assets/textures/sprites/snowflake2.png");
    }

    #[test]
    fn seeded_builds_are_deterministic() {
        let build = |seed| {
            SceneBuilder::new().build(&mut StdRng::seed_from_u64(seed), &mut RecordingLoader::default())
        };
        let (a, b) = (build(9), build(9));
        assert_eq!(a.field.positions(), b.field.positions());
        for (la, lb) in a.layers.iter().zip(&b.layers) {
            assert_eq!(la.rotation, lb.rotation);
        }
    }

    #[test]
    fn layers_start_desynchronized() {
        let scene =
            SceneBuilder::new().build(&mut StdRng::seed_from_u64(4), &mut RecordingLoader::default());
        let first = scene.layers[0].rotation;
        assert!(scene.layers[1..].iter().any(|l| l.rotation != first));
    }

    #[test]
    fn fog_factor() {
        let fog = Fog::default();
        assert_eq!(fog.factor(0.0), 0.0);
        let near = fog.factor(100.0);
        let far = fog.factor(2000.0);
        assert!(near < far);
        assert!(far < 1.0);
    }
}
