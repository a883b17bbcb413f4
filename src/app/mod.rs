//! Snowfall egui app
//!
//! This module contains the eframe app that runs on both native and WASM
//! platforms. Host events are translated into controller calls; every egui
//! frame is one render-loop tick.

mod controls;
mod scene_view;
mod stats;

use eframe::egui;
use tracing::{info, warn};

use crate::config::SnowConfig;
use crate::core::sprite::SPRITE_COUNT;
use crate::core::{
    FpsCounter, FrameScheduler, PointerEvent, RenderLoop, SceneBuilder, Snowfall, SpriteId,
    SpriteStore, Viewport, WallClock,
};
use crate::snow::SnowRenderer;
use crate::theme::{colors, snow_visuals};

#[cfg(target_arch = "wasm32")]
use crate::loader_wasm::WebSpriteLoader as PlatformLoader;
#[cfg(not(target_arch = "wasm32"))]
use crate::loader_native::NativeSpriteLoader as PlatformLoader;

/// Next frame is requested from egui.
pub struct RepaintScheduler {
    ctx: egui::Context,
}

impl FrameScheduler for RepaintScheduler {
    fn schedule_next_frame(&mut self) {
        self.ctx.request_repaint();
    }
}

/// Snowfall app - runs on both native and WASM
pub struct SnowApp {
    pub(crate) render_loop: RenderLoop<WallClock, RepaintScheduler>,
    /// Shared with the sprite loader; filled in as loads resolve
    pub(crate) sprites: SpriteStore,
    pub(crate) stats: FpsCounter,
    /// Paint with egui meshes instead of the wgpu pipeline
    pub(crate) use_cpu: bool,
    pub(crate) show_stats: bool,
    pub(crate) show_controls: bool,
    /// Sprite textures for the CPU path, indexed by sprite number - 1
    pub(crate) sprite_textures: [Option<egui::TextureHandle>; SPRITE_COUNT],
}

impl SnowApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: SnowConfig) -> Self {
        cc.egui_ctx.set_visuals(snow_visuals());

        let sprites = SpriteStore::new();
        let mut loader = PlatformLoader::new(sprites.clone());
        let mut rng = config.rng();
        let builder = SceneBuilder::new().assets_dir(config.assets_dir.clone());

        // Real size arrives with the first frame
        let mut snowfall = Snowfall::new(&builder, Viewport::default(), &mut rng, &mut loader);
        snowfall.set_texture_visible(config.texture);

        let use_cpu = config.use_cpu || !register_gpu_renderer(cc, &snowfall, &sprites);
        info!(use_cpu, seed = ?config.seed, assets = %config.assets_dir, "Snowfall app created");

        let scheduler = RepaintScheduler {
            ctx: cc.egui_ctx.clone(),
        };

        Self {
            render_loop: RenderLoop::new(snowfall, WallClock, scheduler),
            sprites,
            stats: FpsCounter::new(),
            use_cpu,
            show_stats: config.show_stats,
            show_controls: config.show_controls,
            sprite_textures: Default::default(),
        }
    }

    /// Feed resize and pointer events to the controller.
    fn handle_input(&mut self, ctx: &egui::Context) {
        let screen = ctx.screen_rect();
        let pixel_ratio = ctx.pixels_per_point();
        let current = self.render_loop.snowfall().viewport();
        if current.width != screen.width()
            || current.height != screen.height()
            || current.pixel_ratio != pixel_ratio
        {
            self.render_loop
                .snowfall_mut()
                .on_resize(screen.width(), screen.height(), pixel_ratio);
        }

        let events: Vec<PointerEvent> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::PointerMoved(pos) => Some(PointerEvent::primary(pos.x, pos.y)),
                    // Touches also arrive as PointerMoved for the first finger
                    egui::Event::Touch { pos, .. } => Some(PointerEvent {
                        client_x: pos.x,
                        client_y: pos.y,
                        is_primary: false,
                    }),
                    _ => None,
                })
                .collect()
        });
        let snowfall = self.render_loop.snowfall_mut();
        for event in events {
            snowfall.on_pointer_move(event);
        }
    }

    /// Turn newly resolved sprites into egui textures (CPU path only).
    fn sync_sprite_textures(&mut self, ctx: &egui::Context) {
        for id in SpriteId::ALL {
            if self.sprite_textures[id.idx()].is_some() {
                continue;
            }
            if let Some(image) = self.sprites.get(id).image() {
                let color = egui::ColorImage::from_rgba_unmultiplied(
                    [image.width as usize, image.height as usize],
                    &image.rgba,
                );
                self.sprite_textures[id.idx()] =
                    Some(ctx.load_texture(id.to_string(), color, egui::TextureOptions::LINEAR));
            }
        }
    }
}

/// Register the wgpu snow renderer. False when no wgpu backend is available.
fn register_gpu_renderer(
    cc: &eframe::CreationContext<'_>,
    snowfall: &Snowfall,
    sprites: &SpriteStore,
) -> bool {
    let Some(render_state) = cc.wgpu_render_state.as_ref() else {
        warn!("wgpu unavailable, falling back to CPU rendering");
        return false;
    };
    let renderer = SnowRenderer::new(
        &render_state.device,
        &render_state.queue,
        render_state.target_format,
        snowfall.scene().field.positions(),
        sprites.clone(),
    );
    render_state
        .renderer
        .write()
        .callback_resources
        .insert(renderer);
    true
}

impl eframe::App for SnowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);

        if self.use_cpu {
            self.sync_sprite_textures(ctx);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY))
            .show(ctx, |ui| {
                self.render_scene(ui);
            });

        if self.show_controls {
            self.render_controls(ctx);
        }
        if self.show_stats {
            self.render_stats(ctx);
        }
    }
}
