//! Snowfall controller: all mutable animation state in one place
//!
//! Owns the scene, camera, pointer and viewport. Event handlers and the
//! per-frame update are methods on it; nothing lives in globals.

use nalgebra::Point3;
use rand::Rng;
use tracing::{debug, info, trace};

use super::camera::Camera;
use super::input::{PointerEvent, PointerState, Viewport};
use super::scene::{Scene, SceneBuilder};
use super::sprite::SpriteLoader;

/// Wall-clock milliseconds to animation time.
pub const TIME_SCALE: f64 = 0.00005;

/// Elapsed-time scalar for a wall-clock reading in milliseconds.
pub fn elapsed_scalar(wall_clock_millis: f64) -> f64 {
    wall_clock_millis * TIME_SCALE
}

pub struct Snowfall {
    scene: Scene,
    camera: Camera,
    pointer: PointerState,
    viewport: Viewport,
    texture_visible: bool,
    /// Elapsed-time scalar of the last update.
    time: f64,
}

impl Snowfall {
    /// Build the scene and place the camera for `viewport`.
    pub fn new<R, L>(builder: &SceneBuilder<'_>, viewport: Viewport, rng: &mut R, loader: &mut L) -> Self
    where
        R: Rng + ?Sized,
        L: SpriteLoader + ?Sized,
    {
        let scene = builder.build(rng, loader);
        Self::from_scene(scene, viewport)
    }

    pub fn from_scene(scene: Scene, viewport: Viewport) -> Self {
        Self {
            scene,
            camera: Camera::new(viewport.aspect()),
            pointer: PointerState::default(),
            viewport,
            texture_visible: true,
            time: 0.0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn texture_visible(&self) -> bool {
        self.texture_visible
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Store the pointer offset from the viewport center. Non-primary
    /// pointers are ignored.
    pub fn on_pointer_move(&mut self, event: PointerEvent) {
        if !event.is_primary {
            return;
        }
        self.pointer = self.viewport.center_offset(event.client_x, event.client_y);
    }

    /// New viewport size: half extents, camera aspect and output surface
    /// all follow immediately.
    pub fn on_resize(&mut self, width: f32, height: f32, pixel_ratio: f32) {
        self.viewport = Viewport::new(width, height, pixel_ratio);
        self.camera.set_aspect(self.viewport.aspect());
        info!(
            width,
            height,
            pixel_ratio,
            surface = ?self.viewport.surface_size(),
            "Viewport resized"
        );
    }

    /// Show or hide sprites on every layer, effective from the next frame.
    pub fn set_texture_visible(&mut self, visible: bool) {
        if visible == self.texture_visible {
            return;
        }
        self.texture_visible = visible;
        for layer in &mut self.scene.layers {
            layer.set_texture_visible(visible);
        }
        debug!(visible, "Texture visibility changed");
    }

    /// Advance one frame: chase the pointer, look at the origin, spin and
    /// recolor every layer.
    pub fn update(&mut self, wall_clock_millis: f64) {
        let t = elapsed_scalar(wall_clock_millis);

        self.camera.smooth_toward(self.pointer.offset());
        self.camera.look_at(Point3::origin());

        for (i, layer) in self.scene.layers.iter_mut().enumerate() {
            layer.animate(i, t);
        }

        self.time = t;
        trace!(
            t,
            camera_x = self.camera.position.x,
            camera_y = self.camera.position.y,
            "Frame updated"
        );
    }

    /// Clear per-material change flags once the renderer has consumed them.
    pub fn mark_materials_clean(&mut self) {
        for layer in &mut self.scene.layers {
            layer.material.needs_update = false;
        }
    }
}
