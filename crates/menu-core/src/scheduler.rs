//! Frame pacing decoupled from the platform's refresh callback.

use crate::constants::MAX_FRAME_DT_SEC;
use instant::Instant;

/// Anything that can be stepped forward by a frame's elapsed time.
pub trait FrameDriver {
    fn advance(&mut self, dt_sec: f32);
}

/// Measures time between refresh callbacks.
#[derive(Clone, Debug)]
pub struct FrameTimer {
    last: Option<Instant>,
    max_dt: f32,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT_SEC)
    }
}

impl FrameTimer {
    pub fn new(max_dt: f32) -> Self {
        Self { last: None, max_dt }
    }

    /// Seconds since the previous tick; zero on the first.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = match self.last {
            Some(prev) if now > prev => (now - prev).as_secs_f32(),
            _ => 0.0,
        };
        self.last = Some(now);
        clamp_dt(dt, self.max_dt)
    }
}

/// Non-finite or negative deltas become zero; long stalls are capped.
#[inline]
pub fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(max_dt)
}

/// Step `driver` `frames` times with a fixed delta.
pub fn run_fixed<D: FrameDriver + ?Sized>(driver: &mut D, frames: usize, dt_sec: f32) {
    for _ in 0..frames {
        driver.advance(dt_sec);
    }
}

// =============================================================================
// Tests
// =============================================================================
