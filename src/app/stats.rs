//! Stats overlay - click to switch between FPS and frame time

use eframe::egui;
use crate::theme::colors;
use super::SnowApp;

impl SnowApp {
    pub(crate) fn render_stats(&mut self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("stats_overlay"))
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(colors::BG_OVERLAY)
                    .inner_margin(4.0)
                    .show(ui, |ui| {
                        let label = egui::Label::new(
                            egui::RichText::new(self.stats.label())
                                .monospace()
                                .color(colors::STATS_TEXT),
                        )
                        .sense(egui::Sense::click());
                        if ui.add(label).clicked() {
                            self.stats.cycle_panel();
                        }
                    });
            });
    }
}
