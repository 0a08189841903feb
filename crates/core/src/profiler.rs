//! Timing helpers for tick profiling.
//!
//! Provides an RAII profiling scope and a rolling frame timer.

use std::time::Instant;
use tracing::trace;

/// A profiling scope that measures elapsed time using RAII.
///
/// Logs the elapsed time at `trace` level when dropped.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    /// Creates a new profiling scope.
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Gets elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfilerScope {
    fn drop(&mut self) {
        trace!("{} took {:.3}ms", self.name, self.elapsed_ms());
    }
}

/// Tick timer keeping the last and smoothed tick durations.
pub struct FrameTimer {
    last_ms: f64,
    average_ms: f64,
    samples: u64,
}

impl FrameTimer {
    /// Weight of the newest sample in the running average.
    const SMOOTHING: f64 = 0.1;

    /// Creates a new frame timer.
    pub fn new() -> Self {
        Self {
            last_ms: 0.0,
            average_ms: 0.0,
            samples: 0,
        }
    }

    /// Records a tick duration in milliseconds.
    pub fn record(&mut self, time_ms: f64) {
        self.last_ms = time_ms;
        self.average_ms = if self.samples == 0 {
            time_ms
        } else {
            self.average_ms + Self::SMOOTHING * (time_ms - self.average_ms)
        };
        self.samples += 1;
    }

    /// Gets the last recorded duration.
    pub fn last_ms(&self) -> f64 {
        self.last_ms
    }

    /// Exponentially smoothed duration.
    pub fn average_ms(&self) -> f64 {
        self.average_ms
    }

    /// Number of recorded samples.
    pub fn samples(&self) -> u64 {
        self.samples
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
