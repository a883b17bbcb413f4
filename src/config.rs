//! Runtime configuration
//!
//! Native builds read an optional JSON file and then apply CLI flags on top.
//! Browser builds read JSON from the `window.__snowfall_config` global.

use serde::Deserialize;

/// Default directory sprite paths are resolved against.
pub const DEFAULT_ASSETS_DIR: &str = "./assets";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SnowConfig {
    /// Seed for point positions and initial rotations; random when absent.
    pub seed: Option<u64>,
    pub assets_dir: String,
    /// Initial state of the texture toggle.
    pub texture: bool,
    /// Skip the GPU renderer and paint points with egui shapes.
    pub use_cpu: bool,
    pub show_stats: bool,
    pub show_controls: bool,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            seed: None,
            assets_dir: DEFAULT_ASSETS_DIR.to_string(),
            texture: true,
            use_cpu: false,
            show_stats: true,
            show_controls: true,
        }
    }
}

impl SnowConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Seeded RNG when a seed is configured, entropy otherwise.
    pub fn rng(&self) -> rand::rngs::StdRng {
        use rand::SeedableRng;

        match self.seed {
            Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
            None => rand::rngs::StdRng::from_entropy(),
        }
    }
}
