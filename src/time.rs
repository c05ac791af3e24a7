//! Animation clock for the particle field.
//!
//! The field's jitter and idle-orbit phases are referenced to an animation
//! clock, not to wall time directly. [`Clock`] turns frames into clock
//! advances, either by a fixed increment per frame or by scaled wall-clock
//! delta, and keeps frame and FPS bookkeeping for the window title. The
//! accumulated time itself lives in the field ([`ParticleField::time`]).
//!
//! Deltas are `f64` so that the accumulated clock keeps resolving a 0.01
//! step for as long as a viewer stays open.
//!
//! [`ParticleField::time`]: crate::field::ParticleField::time
//!
//! # Example
//!
//! ```ignore
//! use glyphfield::time::{Clock, ClockMode};
//!
//! let mut clock = Clock::new(ClockMode::Fixed { step: 0.01 });
//!
//! // In the frame callback:
//! let dt = clock.tick();
//! field.step(dt);
//! ```

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// How the animation clock advances each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMode {
    /// Advance by a constant amount every frame, independent of frame rate.
    Fixed { step: f64 },
    /// Advance by wall-clock seconds multiplied by `scale`.
    RealTime { scale: f64 },
}

impl Default for ClockMode {
    fn default() -> Self {
        ClockMode::Fixed { step: 0.01 }
    }
}

impl ClockMode {
    /// Delta per frame assuming a steady 60 Hz display.
    ///
    /// Used where there is no wall clock to follow, such as headless runs.
    pub fn nominal_step(&self) -> f64 {
        match *self {
            ClockMode::Fixed { step } => step,
            ClockMode::RealTime { scale } => scale / 60.0,
        }
    }
}

/// Frame clock driving the simulation.
#[derive(Debug)]
pub struct Clock {
    mode: ClockMode,
    /// When the last frame occurred.
    last_frame: Instant,
    /// Total frames since start.
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
}

impl Clock {
    /// Create a new clock starting from now.
    pub fn new(mode: ClockMode) -> Self {
        let now = Instant::now();
        Self {
            mode,
            last_frame: now,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
        }
    }

    /// Advance one frame. Call once per frame.
    ///
    /// Returns the animation delta to feed into the simulation; 0 while paused.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let raw_delta = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            log::trace!("{:.1} fps", self.fps);
        }

        if self.paused {
            return 0.0;
        }

        match self.mode {
            ClockMode::Fixed { step } => step,
            ClockMode::RealTime { scale } => raw_delta * scale,
        }
    }

    /// Total frames ticked since start, including paused ones.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Toggle pause state. While paused, `tick()` returns 0.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(ClockMode::default())
    }
}
