//! Frame statistics for the debug overlay

use std::collections::VecDeque;

use crate::time::now_seconds;

use super::render_loop::DebugStats;

const WINDOW: usize = 60;

/// Which number the overlay shows. Clicking the overlay cycles through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatsPanel {
    #[default]
    Fps,
    FrameTime,
}

impl StatsPanel {
    pub fn next(self) -> Self {
        match self {
            StatsPanel::Fps => StatsPanel::FrameTime,
            StatsPanel::FrameTime => StatsPanel::Fps,
        }
    }
}

/// Rolling FPS and frame-time counter over the last 60 frames.
pub struct FpsCounter {
    frames: VecDeque<f64>,
    panel: StatsPanel,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: VecDeque::with_capacity(WINDOW + 1),
            panel: StatsPanel::default(),
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(now_seconds() * 1000.0);
    }

    /// Record a frame at `now_ms`.
    pub fn tick_at(&mut self, now_ms: f64) {
        self.frames.push_back(now_ms);
        if self.frames.len() > WINDOW {
            self.frames.pop_front();
        }
    }

    fn span_ms(&self) -> Option<f64> {
        let (first, last) = (self.frames.front()?, self.frames.back()?);
        let elapsed = last - first;
        (self.frames.len() >= 2 && elapsed > 0.0).then_some(elapsed)
    }

    pub fn fps(&self) -> f64 {
        match self.span_ms() {
            Some(elapsed) => (self.frames.len() as f64 - 1.0) / (elapsed / 1000.0),
            None => 0.0,
        }
    }

    /// Mean milliseconds between frames.
    pub fn frame_time_ms(&self) -> f64 {
        match self.span_ms() {
            Some(elapsed) => elapsed / (self.frames.len() as f64 - 1.0),
            None => 0.0,
        }
    }

    pub fn panel(&self) -> StatsPanel {
        self.panel
    }

    pub fn cycle_panel(&mut self) {
        self.panel = self.panel.next();
    }

    /// Text for the active panel.
    pub fn label(&self) -> String {
        match self.panel {
            StatsPanel::Fps => format!("{:.0} FPS", self.fps()),
            StatsPanel::FrameTime => format!("{:.1} MS", self.frame_time_ms()),
        }
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugStats for FpsCounter {
    fn update(&mut self) {
        self.tick();
    }
}
