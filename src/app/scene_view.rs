//! Full-window scene view - routes to GPU or CPU path.

use eframe::egui;
use nalgebra::{Matrix4, Point3};

use super::SnowApp;
use crate::core::sprite::SPRITE_COUNT;
use crate::core::{Blending, Camera, Fog, Renderer, Scene};
use crate::snow::{CameraUniforms, LayerFrame, SnowCallback};

impl SnowApp {
    /// Allocate the whole central panel and run one render-loop tick into it.
    pub(crate) fn render_scene(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, egui::Sense::hover());
        let mut target = PainterTarget {
            painter: &painter,
            rect: response.rect,
            pixels_per_point: ui.ctx().pixels_per_point(),
            cpu_sprites: self.use_cpu.then_some(&self.sprite_textures),
        };
        self.render_loop.tick(&mut target, &mut self.stats);
    }
}

/// `Renderer` that paints into an egui painter for one frame.
struct PainterTarget<'a> {
    painter: &'a egui::Painter,
    rect: egui::Rect,
    pixels_per_point: f32,
    /// Present on the CPU path
    cpu_sprites: Option<&'a [Option<egui::TextureHandle>; SPRITE_COUNT]>,
}

impl Renderer for PainterTarget<'_> {
    fn render(&mut self, scene: &Scene, camera: &Camera) {
        match self.cpu_sprites {
            Some(sprites) => paint_cpu(self.painter, self.rect, scene, camera, sprites),
            None => self.paint_gpu(scene, camera),
        }
    }
}

impl PainterTarget<'_> {
    /// GPU path: one paint callback draws every layer.
    fn paint_gpu(&self, scene: &Scene, camera: &Camera) {
        let viewport = [
            self.rect.width() * self.pixels_per_point,
            self.rect.height() * self.pixels_per_point,
        ];
        let layers: Vec<LayerFrame> = scene.layers.iter().map(LayerFrame::from).collect();
        self.painter.add(egui_wgpu::Callback::new_paint_callback(
            self.rect,
            SnowCallback {
                camera: CameraUniforms::new(camera, &scene.fog, viewport),
                layers,
            },
        ));
    }
}

/// A projected point: center and edge length in points, plus fog amount.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Splat {
    pub center: egui::Pos2,
    pub edge: f32,
    pub fog: f32,
}

/// Project one field point into `rect`. `None` when it falls outside the
/// view frustum.
pub(crate) fn project_point(
    model_view: &Matrix4<f32>,
    model_view_proj: &Matrix4<f32>,
    position: [f32; 3],
    size: f32,
    rect: egui::Rect,
    fog: &Fog,
) -> Option<Splat> {
    let p = Point3::from(position).to_homogeneous();
    let depth = -(model_view * p).z;
    let clip = model_view_proj * p;
    if depth <= 0.0 || clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.xyz() / clip.w;
    if !(0.0..=1.0).contains(&ndc.z) {
        return None;
    }

    let center = egui::pos2(
        rect.min.x + (ndc.x + 1.0) * 0.5 * rect.width(),
        rect.min.y + (1.0 - ndc.y) * 0.5 * rect.height(),
    );
    Some(Splat {
        center,
        edge: size * (rect.height() * 0.5) / depth,
        fog: fog.factor(depth),
    })
}

/// Vertex color for `blending`. Additive is premultiplied with zero alpha,
/// so egui's blend adds it to what is already drawn.
fn vertex_color(rgb: [f32; 3], blending: Blending) -> egui::Color32 {
    let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    match blending {
        Blending::Additive => egui::Color32::from_rgba_premultiplied(r, g, b, 0),
        Blending::Normal => egui::Color32::from_rgb(r, g, b),
    }
}

/// CPU path: one textured mesh per layer.
fn paint_cpu(
    painter: &egui::Painter,
    rect: egui::Rect,
    scene: &Scene,
    camera: &Camera,
    sprites: &[Option<egui::TextureHandle>; SPRITE_COUNT],
) {
    let view = camera.view();
    let view_proj = camera.view_projection();
    let sprite_uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    // Untextured quads sample the white texel of the font atlas
    let white_uv = egui::Rect::from_min_max(egui::epaint::WHITE_UV, egui::epaint::WHITE_UV);
    let fog = &scene.fog;

    for layer in &scene.layers {
        let material = &layer.material;
        let (texture, uv) = match material.map {
            Some(id) => match &sprites[id.idx()] {
                Some(handle) => (handle.id(), sprite_uv),
                // Still loading or failed: nothing to draw
                None => continue,
            },
            None => (egui::TextureId::default(), white_uv),
        };

        let model = layer.rotation.matrix();
        let model_view = view * model;
        let model_view_proj = view_proj * model;
        let base = material.color.to_rgb();

        let mut mesh = egui::Mesh::with_texture(texture);
        for &position in layer.field.positions() {
            let Some(splat) =
                project_point(&model_view, &model_view_proj, position, material.size, rect, fog)
            else {
                continue;
            };
            let quad = egui::Rect::from_center_size(splat.center, egui::Vec2::splat(splat.edge));
            if !rect.intersects(quad) {
                continue;
            }
            let rgb = [0, 1, 2].map(|i| base[i] + (fog.color[i] - base[i]) * splat.fog);
            mesh.add_rect_with_uv(quad, uv, vertex_color(rgb, material.blending));
        }
        painter.add(egui::Shape::mesh(mesh));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Matrix4<f32>, Matrix4<f32>, egui::Rect) {
        let camera = Camera::new(800.0 / 600.0);
        let rect = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0));
        (camera.view(), camera.view_projection(), rect)
    }

    #[test]
    fn origin_projects_to_center() {
        let (view, view_proj, rect) = setup();
        let splat = project_point(&view, &view_proj, [0.0; 3], 20.0, rect, &Fog::default()).unwrap();
        assert!((splat.center.x - 400.0).abs() < 1e-3);
        assert!((splat.center.y - 300.0).abs() < 1e-3);
        // 20 * 300 / 1000
        assert!((splat.edge - 6.0).abs() < 1e-3);
    }

    #[test]
    fn nearer_points_are_larger_and_less_fogged() {
        let (view, view_proj, rect) = setup();
        let fog = Fog::default();
        let near = project_point(&view, &view_proj, [0.0, 0.0, 500.0], 10.0, rect, &fog).unwrap();
        let far = project_point(&view, &view_proj, [0.0, 0.0, -500.0], 10.0, rect, &fog).unwrap();
        assert!(near.edge > far.edge);
        assert!(near.fog < far.fog);
    }

    #[test]
    fn points_behind_camera_or_past_far_plane_are_dropped() {
        let (view, view_proj, rect) = setup();
        let fog = Fog::default();
        assert!(project_point(&view, &view_proj, [0.0, 0.0, 1500.0], 10.0, rect, &fog).is_none());
        assert!(project_point(&view, &view_proj, [0.0, 0.0, -1500.0], 10.0, rect, &fog).is_none());
    }

    #[test]
    fn up_is_up_on_screen() {
        let (view, view_proj, rect) = setup();
        let splat =
            project_point(&view, &view_proj, [0.0, 100.0, 0.0], 10.0, rect, &Fog::default()).unwrap();
        assert!(splat.center.y < 300.0);
    }

    #[test]
    fn additive_color_has_zero_alpha() {
        let c = vertex_color([1.0, 0.5, 0.0], Blending::Additive);
        assert_eq!(c.a(), 0);
        assert_eq!(c.r(), 255);
        assert_eq!(c.g(), 128);
        assert_eq!(vertex_color([1.0, 0.5, 0.0], Blending::Normal).a(), 255);
    }

    /// Run `paint_cpu` for one frame and return the vertices of every mesh
    /// it produced.
    fn painted_meshes(scene: &Scene) -> Vec<Vec<egui::epaint::Vertex>> {
        let ctx = egui::Context::default();
        let rect = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0));
        let sprites: [Option<egui::TextureHandle>; SPRITE_COUNT] = Default::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::background());
            paint_cpu(&painter, rect, scene, &Camera::new(800.0 / 600.0), &sprites);
        });
        output
            .shapes
            .into_iter()
            .filter_map(|clipped| match clipped.shape {
                egui::Shape::Mesh(mesh) => Some(mesh.vertices.clone()),
                _ => None,
            })
            .collect()
    }

    fn test_scene() -> Scene {
        use crate::core::scene::tests::RecordingLoader;
        use crate::core::SceneBuilder;
        use rand::SeedableRng;

        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        SceneBuilder::new().build(&mut rng, &mut RecordingLoader::default())
    }

    #[test]
    fn untextured_layers_draw_plain_quads() {
        let mut scene = test_scene();
        for layer in &mut scene.layers {
            layer.set_texture_visible(false);
        }
        let meshes = painted_meshes(&scene);
        let vertices: Vec<&egui::epaint::Vertex> = meshes.iter().flatten().collect();
        assert!(!vertices.is_empty());
        assert!(vertices.iter().all(|v| v.uv == egui::epaint::WHITE_UV));
    }

    #[test]
    fn layers_wait_for_their_sprite() {
        let meshes = painted_meshes(&test_scene());
        assert!(meshes.iter().all(|m| m.is_empty()));
    }
}
