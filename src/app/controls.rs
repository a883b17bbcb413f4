//! Controls window - texture toggle and sprite status

use eframe::egui;
use crate::core::sprite::{SpriteSlot, SPRITE_COUNT};
use crate::core::SpriteId;
use crate::theme::colors;
use super::SnowApp;

impl SnowApp {
    pub(crate) fn render_controls(&mut self, ctx: &egui::Context) {
        egui::Window::new("Controls")
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-8.0, 8.0))
            .resizable(false)
            .collapsible(true)
            .default_open(true)
            .show(ctx, |ui| {
                let mut texture = self.render_loop.snowfall().texture_visible();
                if ui.checkbox(&mut texture, "texture").changed() {
                    self.render_loop.snowfall_mut().set_texture_visible(texture);
                }

                let (mut loaded, mut failed) = (0, 0);
                for id in SpriteId::ALL {
                    match self.sprites.get(id) {
                        SpriteSlot::Ready(_) => loaded += 1,
                        SpriteSlot::Failed(_) => failed += 1,
                        _ => {}
                    }
                }
                if loaded < SPRITE_COUNT {
                    let mut text = format!("sprites {loaded}/{SPRITE_COUNT}");
                    if failed > 0 {
                        text.push_str(&format!(" ({failed} failed)"));
                    }
                    ui.label(egui::RichText::new(text).color(colors::TEXT_MUTED).small());
                }
            });
    }
}
