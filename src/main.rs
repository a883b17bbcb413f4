//! Native snowfall window
//!
//! Run with: cargo run --features native -- [--seed N] [--use-cpu]
//! Headless: cargo run --features native -- --headless 600

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use eframe::egui;
use tracing::{info, trace};
use tracing_subscriber::{fmt, EnvFilter};

use snowfall::app::SnowApp;
use snowfall::config::SnowConfig;
use snowfall::core::{
    Camera, FpsCounter, Immediate, RenderLoop, Renderer, Scene, SceneBuilder, Snowfall,
    SpriteStore, Viewport, WallClock,
};
use snowfall::loader_native::NativeSpriteLoader;

/// Headless frames are spaced like a 60 Hz display.
const HEADLESS_FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "snowfall", about = "Layered point-sprite snow that follows the pointer")]
struct Args {
    /// JSON config file; CLI flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for point positions and initial rotations
    #[arg(long)]
    seed: Option<u64>,

    /// Directory containing textures/sprites/snowflake{1..5}.png
    #[arg(long, env = "SNOWFALL_ASSETS")]
    assets: Option<String>,

    /// Start with sprites hidden
    #[arg(long)]
    no_texture: bool,

    /// Paint with egui meshes instead of the wgpu pipeline
    #[arg(long)]
    use_cpu: bool,

    /// Run this many frames without a window, logging progress
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,
}

impl Args {
    fn resolve_config(&self) -> Result<SnowConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => SnowConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => SnowConfig::default(),
        };
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(assets) = &self.assets {
            config.assets_dir = assets.clone();
        }
        if self.no_texture {
            config.texture = false;
        }
        config.use_cpu |= self.use_cpu;
        Ok(config)
    }
}

/// Renderer that only counts what it would draw.
#[derive(Default)]
struct LogRenderer {
    points: usize,
}

impl Renderer for LogRenderer {
    fn render(&mut self, scene: &Scene, camera: &Camera) {
        self.points = scene.layers.iter().map(|l| l.field.len()).sum();
        trace!(
            points = self.points,
            camera_x = camera.position.x,
            camera_y = camera.position.y,
            "Headless frame"
        );
    }
}

fn run_headless(config: &SnowConfig, frames: u64) {
    let sprites = SpriteStore::new();
    let mut loader = NativeSpriteLoader::new(sprites.clone());
    let builder = SceneBuilder::new().assets_dir(config.assets_dir.clone());
    let mut snowfall = Snowfall::new(&builder, Viewport::default(), &mut config.rng(), &mut loader);
    snowfall.set_texture_visible(config.texture);

    let mut renderer = LogRenderer::default();
    let mut stats = FpsCounter::new();
    let render_loop = RenderLoop::new(snowfall, WallClock, Immediate::default());

    info!(frames, "Running headless");
    for frame in render_loop.frames(&mut renderer, &mut stats).take(frames as usize) {
        if frame.index % 60 == 0 {
            info!(
                frame = frame.index,
                t = frame.time,
                camera = ?frame.camera,
                hues = ?frame.hues,
                textured = frame.textured,
                "Progress"
            );
        }
        std::thread::sleep(HEADLESS_FRAME_INTERVAL);
    }
    info!(
        fps = format!("{:.1}", stats.fps()),
        points = renderer.points,
        sprites_settled = sprites.settled_count(),
        "Headless run finished"
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,snowfall=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    let config = args.resolve_config()?;
    info!(?config, "Config resolved");

    if let Some(frames) = args.headless {
        run_headless(&config, frames);
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Snowfall")
            .with_inner_size([1280.0, 720.0]),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };
    eframe::run_native(
        "Snowfall",
        options,
        Box::new(move |cc| Ok(Box::new(SnowApp::new(cc, config)))),
    )?;
    Ok(())
}
