//! Frame loop with injectable clock and scheduler
//!
//! Each `tick` is one frame: schedule the next one, update the controller,
//! render, update the stats widget. `frames()` exposes the same thing as an
//! infinite iterator for headless use and tests.

use tracing::trace;

use super::animation::Snowfall;
use super::camera::Camera;
use super::scene::Scene;

/// Monotonic wall-clock source in milliseconds.
pub trait Clock {
    fn now_millis(&self) -> f64;
}

/// Host wall clock (`Date.now()` in the browser, system time natively).
#[derive(Clone, Copy, Debug, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now_millis(&self) -> f64 {
        crate::time::wall_clock_millis()
    }
}

/// Asks the host to run another frame.
pub trait FrameScheduler {
    fn schedule_next_frame(&mut self);
}

/// Scheduler for loops that are driven externally, one frame per call.
#[derive(Clone, Copy, Debug, Default)]
pub struct Immediate {
    pub requested: u64,
}

impl FrameScheduler for Immediate {
    fn schedule_next_frame(&mut self) {
        self.requested += 1;
    }
}

/// Draws the scene from the camera.
pub trait Renderer {
    fn render(&mut self, scene: &Scene, camera: &Camera);
}

/// Per-frame debug overlay.
pub trait DebugStats {
    fn update(&mut self);
}

/// What a frame produced, detached from the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameInfo {
    pub index: u64,
    pub time: f64,
    pub camera: [f32; 3],
    pub spins: Vec<f64>,
    pub hues: Vec<f32>,
    pub textured: bool,
}

impl FrameInfo {
    fn capture(index: u64, snowfall: &Snowfall) -> Self {
        let layers = &snowfall.scene().layers;
        let p = snowfall.camera().position;
        Self {
            index,
            time: snowfall.time(),
            camera: [p.x, p.y, p.z],
            spins: layers.iter().map(|l| l.rotation.y).collect(),
            hues: layers.iter().map(|l| l.material.color.h).collect(),
            textured: snowfall.texture_visible(),
        }
    }
}

pub struct RenderLoop<C, S> {
    snowfall: Snowfall,
    clock: C,
    scheduler: S,
    frame: u64,
}

impl<C: Clock, S: FrameScheduler> RenderLoop<C, S> {
    pub fn new(snowfall: Snowfall, clock: C, scheduler: S) -> Self {
        Self {
            snowfall,
            clock,
            scheduler,
            frame: 0,
        }
    }

    pub fn snowfall(&self) -> &Snowfall {
        &self.snowfall
    }

    /// Event handlers reach the controller through here between frames.
    pub fn snowfall_mut(&mut self) -> &mut Snowfall {
        &mut self.snowfall
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Run one frame.
    pub fn tick<R, D>(&mut self, renderer: &mut R, stats: &mut D) -> FrameInfo
    where
        R: Renderer + ?Sized,
        D: DebugStats + ?Sized,
    {
        self.scheduler.schedule_next_frame();

        self.snowfall.update(self.clock.now_millis());
        renderer.render(self.snowfall.scene(), self.snowfall.camera());
        self.snowfall.mark_materials_clean();
        stats.update();

        let info = FrameInfo::capture(self.frame, &self.snowfall);
        trace!(frame = self.frame, "Frame rendered");
        self.frame += 1;
        info
    }

    /// Consume the loop as an endless sequence of frames.
    pub fn frames<'a, R, D>(self, renderer: &'a mut R, stats: &'a mut D) -> Frames<'a, C, S, R, D>
    where
        R: Renderer + ?Sized,
        D: DebugStats + ?Sized,
    {
        Frames {
            inner: self,
            renderer,
            stats,
        }
    }
}

/// Infinite iterator over rendered frames. Never returns `None`.
pub struct Frames<'a, C, S, R: ?Sized, D: ?Sized> {
    inner: RenderLoop<C, S>,
    renderer: &'a mut R,
    stats: &'a mut D,
}

impl<C, S, R, D> Iterator for Frames<'_, C, S, R, D>
where
    C: Clock,
    S: FrameScheduler,
    R: Renderer + ?Sized,
    D: DebugStats + ?Sized,
{
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        Some(self.inner.tick(&mut *self.renderer, &mut *self.stats))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{PointerEvent, Viewport};
    use crate::core::layer::{Rotation, LAYER_COUNT};
    use crate::core::scene::tests::RecordingLoader;
    use crate::core::scene::SceneBuilder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;

    /// Advances by a fixed step on every read.
    struct SteppingClock {
        now: Cell<f64>,
        step: f64,
    }

    impl Clock for SteppingClock {
        fn now_millis(&self) -> f64 {
            let now = self.now.get();
            self.now.set(now + self.step);
            now
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        frames: usize,
        maps: Vec<Vec<bool>>,
        layer_counts: Vec<usize>,
    }

    impl Renderer for CountingRenderer {
        fn render(&mut self, scene: &Scene, _camera: &Camera) {
            self.frames += 1;
            self.layer_counts.push(scene.layers.len());
            self.maps
                .push(scene.layers.iter().map(|l| l.material.map.is_some()).collect());
        }
    }

    #[derive(Default)]
    struct CountingStats(usize);

    impl DebugStats for CountingStats {
        fn update(&mut self) {
            self.0 += 1;
        }
    }

    fn render_loop(start: f64) -> RenderLoop<SteppingClock, Immediate> {
        let snowfall = Snowfall::new(
            &SceneBuilder::new(),
            Viewport::new(800.0, 600.0, 1.0),
            &mut StdRng::seed_from_u64(2),
            &mut RecordingLoader::default(),
        );
        let clock = SteppingClock {
            now: Cell::new(start),
            step: 16.0,
        };
        RenderLoop::new(snowfall, clock, Immediate::default())
    }

    #[test]
    fn each_tick_renders_once_and_schedules_next() {
        let mut lp = render_loop(0.0);
        let mut renderer = CountingRenderer::default();
        let mut stats = CountingStats::default();
        for _ in 0..10 {
            lp.tick(&mut renderer, &mut stats);
        }
        assert_eq!(renderer.frames, 10);
        assert_eq!(stats.0, 10);
        assert_eq!(lp.scheduler().requested, 10);
        assert_eq!(lp.frame_count(), 10);
        assert!(renderer.layer_counts.iter().all(|&n| n == LAYER_COUNT));
    }

    #[test]
    fn frames_iterator_is_endless_and_monotonic() {
        let lp = render_loop(1_000.0);
        let mut renderer = CountingRenderer::default();
        let mut stats = CountingStats::default();
        let frames: Vec<FrameInfo> = lp.frames(&mut renderer, &mut stats).take(50).collect();
        assert_eq!(frames.len(), 50);
        for pair in frames.windows(2) {
            assert_eq!(pair[1].index, pair[0].index + 1);
            assert!(pair[1].time > pair[0].time);
            for i in 0..LAYER_COUNT {
                assert!(pair[1].spins[i].abs() >= pair[0].spins[i].abs());
            }
        }
        assert_eq!(renderer.frames, 50);
    }

    #[test]
    fn texture_toggle_visible_on_next_frame_only() {
        let mut lp = render_loop(0.0);
        let mut renderer = CountingRenderer::default();
        let mut stats = CountingStats::default();

        lp.tick(&mut renderer, &mut stats);
        lp.snowfall_mut().set_texture_visible(false);
        lp.tick(&mut renderer, &mut stats);

        assert!(renderer.maps[0].iter().all(|&m| m));
        assert!(renderer.maps[1].iter().all(|&m| !m));
        // Flags cleared after the frame consumed them
        assert!(lp.snowfall().scene().layers.iter().all(|l| !l.material.needs_update));
    }

    #[test]
    fn pointer_between_frames_steers_camera() {
        let mut lp = render_loop(0.0);
        let mut renderer = CountingRenderer::default();
        let mut stats = CountingStats::default();
        lp.snowfall_mut().on_pointer_move(PointerEvent::primary(800.0, 600.0));
        let first = lp.tick(&mut renderer, &mut stats);
        let second = lp.tick(&mut renderer, &mut stats);
        assert!(first.camera[0] > 0.0 && second.camera[0] > first.camera[0]);
        assert!(second.camera[0] < 400.0);
        assert_eq!(first.camera[2], 1000.0);
    }

    #[test]
    fn initial_rotations_survive_frames() {
        let mut lp = render_loop(0.0);
        let initial: Vec<Rotation> = lp.snowfall().scene().layers.iter().map(|l| l.rotation).collect();
        lp.tick(&mut CountingRenderer::default(), &mut CountingStats::default());
        for (layer, before) in lp.snowfall().scene().layers.iter().zip(initial) {
            assert_eq!(layer.rotation.x, before.x);
            assert_eq!(layer.rotation.z, before.z);
        }
    }
}
