//! Real-time tick scheduling.
//!
//! Frames arrive at whatever rate the renderer runs; ticks fire once the
//! accumulated frame time passes a fixed interval, or immediately on a
//! single-step request. The integration step itself stays fixed, so the
//! trajectory does not depend on frame rate.

use tracing::warn;

/// Default accumulated time between ticks (seconds)
pub const DEFAULT_TICK_INTERVAL: f64 = 0.1;

/// Accumulates frame time and decides when the next tick is due.
#[derive(Debug, Clone, PartialEq)]
pub struct TickClock {
    interval: f64,
    accumulated: f64,
    running: bool,
    step_requested: bool,
}

impl TickClock {
    pub fn new(interval: f64, running: bool) -> Self {
        Self {
            interval,
            accumulated: 0.0,
            running,
            step_requested: false,
        }
    }

    /// Adds a frame's wall-clock delta. Returns `true` when a tick is due.
    ///
    /// Time keeps accumulating while paused. Negative or non-finite deltas
    /// count as zero.
    pub fn advance(&mut self, frame_dt: f64) -> bool {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulated += frame_dt;
        } else if frame_dt != 0.0 {
            warn!("Ignoring invalid frame delta {}", frame_dt);
        }

        let due = self.running && self.accumulated > self.interval;
        if due || self.step_requested {
            self.accumulated = 0.0;
            self.step_requested = false;
            return true;
        }
        false
    }

    /// Forces a tick on the next [`TickClock::advance`], running or not.
    pub fn request_step(&mut self) {
        self.step_requested = true;
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Flips play/pause and returns the new state.
    pub fn toggle_running(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Time accumulated since the last tick.
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL, true)
    }
}
