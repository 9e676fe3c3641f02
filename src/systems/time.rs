//! Time update system.
//!
//! Updates the engine's [`WorldTime`] once per frame, applying `time_scale`
//! to the provided delta. [`FrameClock`] measures real frame deltas from a
//! monotonic clock for the free-running loop.
use std::time::{Duration, Instant};

use crate::resources::worldtime::WorldTime;

/// Update elapsed and delta seconds on `WorldTime`.
///
/// `dt` is expected to be the unscaled frame delta in seconds. The system
/// applies the current `time_scale` and writes both `elapsed` and `delta`.
pub fn update_world_time(wt: &mut WorldTime, dt: f32) {
    let scaled_dt = dt.max(0.0) * wt.time_scale;
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
    wt.frame_count += 1;
}

/// Monotonic frame timer.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Seconds since the previous call (or since creation).
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last);
        self.last = now;
        delta.as_secs_f32()
    }

    /// Time left in the current frame for a loop capped at `target_fps`.
    pub fn remaining(&self, target_fps: u32) -> Option<Duration> {
        if target_fps == 0 {
            return None;
        }
        let budget = Duration::from_secs_f64(1.0 / f64::from(target_fps));
        budget.checked_sub(self.last.elapsed())
    }
}
