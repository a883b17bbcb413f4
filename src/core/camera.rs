//! Perspective camera that chases the pointer

use nalgebra::{Matrix4, Perspective3, Point3, Vector2, Vector3};

/// Vertical field of view in degrees.
pub const FOV_DEGREES: f32 = 75.0;
pub const NEAR_PLANE: f32 = 1.0;
pub const FAR_PLANE: f32 = 2000.0;
/// Starting distance from the origin along +Z.
pub const START_DISTANCE: f32 = 1000.0;
/// Fraction of the remaining distance covered each frame.
pub const SMOOTHING: f32 = 0.05;

/// Maps OpenGL clip-space depth [-1, 1] to wgpu's [0, 1].
#[rustfmt::skip]
const OPENGL_TO_WGPU: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, START_DISTANCE),
            target: Point3::origin(),
            fov_y: FOV_DEGREES.to_radians(),
            aspect,
            near: NEAR_PLANE,
            far: FAR_PLANE,
        }
    }

    /// Move X and Y a fixed fraction toward `goal`. Never overshoots.
    pub fn smooth_toward(&mut self, goal: Vector2<f32>) {
        self.position.x += (goal.x - self.position.x) * SMOOTHING;
        self.position.y += (goal.y - self.position.y) * SMOOTHING;
    }

    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &Vector3::y())
    }

    /// Projection with wgpu depth range.
    pub fn projection(&self) -> Matrix4<f32> {
        let aspect = if self.aspect.is_finite() && self.aspect > 0.0 {
            self.aspect
        } else {
            1.0
        };
        OPENGL_TO_WGPU * Perspective3::new(aspect, self.fov_y, self.near, self.far).to_homogeneous()
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection() * self.view()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;

    fn xy(c: &Camera) -> Vector2<f32> {
        Vector2::new(c.position.x, c.position.y)
    }

    #[test]
    fn starts_on_z_axis() {
        let c = Camera::new(16.0 / 9.0);
        assert_eq!(c.position, Point3::new(0.0, 0.0, 1000.0));
        assert!((c.fov_y - 75f32.to_radians()).abs() < 1e-6);
        assert_eq!((c.near, c.far), (1.0, 2000.0));
    }

    #[test]
    fn smoothing_covers_five_percent() {
        let mut c = Camera::new(1.0);
        c.smooth_toward(Vector2::new(100.0, -200.0));
        assert!((c.position.x - 5.0).abs() < 1e-4);
        assert!((c.position.y + 10.0).abs() < 1e-4);
        assert_eq!(c.position.z, 1000.0);
    }

    #[test]
    fn smoothing_never_overshoots() {
        let mut c = Camera::new(1.0);
        let targets = [
            Vector2::new(640.0, 360.0),
            Vector2::new(-640.0, 12.0),
            Vector2::new(0.0, 0.0),
            Vector2::new(3.5, -999.0),
        ];
        for target in targets.iter().cycle().take(400) {
            let old = xy(&c);
            c.smooth_toward(*target);
            let new = xy(&c);
            assert!((new - old).norm() <= (target - old).norm() + 1e-4);
        }
    }

    #[test]
    fn smoothing_converges() {
        let mut c = Camera::new(1.0);
        let goal = Vector2::new(300.0, -150.0);
        for _ in 0..500 {
            c.smooth_toward(goal);
        }
        assert!((xy(&c) - goal).norm() < 1e-2);
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let mut c = Camera::new(1.5);
        c.position = Point3::new(120.0, -40.0, 1000.0);
        c.look_at(Point3::origin());
        let clip = c.view_projection() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.w > 0.0);
        assert!((clip.x / clip.w).abs() < 1e-4);
        assert!((clip.y / clip.w).abs() < 1e-4);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn aspect_changes_projection() {
        let mut c = Camera::new(1.0);
        let before = c.projection();
        c.set_aspect(2.0);
        assert_eq!(c.aspect, 2.0);
        assert_ne!(before, c.projection());
    }
}
