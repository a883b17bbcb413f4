//! Pointer and viewport state fed by host events

use nalgebra::Vector2;

/// A pointer-move event in client (window) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub client_x: f32,
    pub client_y: f32,
    /// Only the primary pointer steers the camera.
    pub is_primary: bool,
}

impl PointerEvent {
    pub fn primary(client_x: f32, client_y: f32) -> Self {
        Self {
            client_x,
            client_y,
            is_primary: true,
        }
    }
}

/// Last observed pointer offset from the viewport center. Last write wins.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    pub fn offset(&self) -> Vector2<f32> {
        Vector2::new(self.x, self.y)
    }
}

/// Host viewport size in logical pixels plus its device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
    half_x: f32,
    half_y: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
            half_x: width / 2.0,
            half_y: height / 2.0,
        }
    }

    pub fn half_extents(&self) -> (f32, f32) {
        (self.half_x, self.half_y)
    }

    /// Width over height; 1.0 for a degenerate viewport.
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Output surface size in physical pixels.
    pub fn surface_size(&self) -> [u32; 2] {
        [
            (self.width * self.pixel_ratio).round().max(1.0) as u32,
            (self.height * self.pixel_ratio).round().max(1.0) as u32,
        ]
    }

    /// Offset of a client position from the viewport center.
    pub fn center_offset(&self, client_x: f32, client_y: f32) -> PointerState {
        PointerState {
            x: client_x - self.half_x,
            y: client_y - self.half_y,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0, 1.0)
    }
}
