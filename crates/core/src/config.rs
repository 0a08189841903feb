//! Tracer configuration.

use serde::{Deserialize, Serialize};

use crate::error::TracerError;
use crate::field::flow::FlowConfiguration;
use crate::tracer::clock::DEFAULT_TICK_INTERVAL;
use crate::tracer::grid::TraceLayout;
use crate::tracer::integrator::{TrailMode, DEFAULT_DT};
use crate::tracer::parallel::Backend;

/// Upper bound on line-list vertices (`2 × i × j × k × trail_len`)
pub const MAX_VERTICES: usize = 1 << 26;

/// Upper bound on worker pool threads
pub const MAX_WORKERS: usize = 256;

/// Everything needed to build a tracer or an interactive simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracerConfig {
    /// Particles along x; also the number of slabs handed to workers
    pub i_count: usize,
    /// Particles along z
    pub j_count: usize,
    /// Particles along y
    pub k_count: usize,
    /// Samples kept per trail
    pub trail_len: usize,

    /// Horizontal extent of the seeding box
    pub tracing_width: f64,
    /// Vertical extent of the seeding box
    pub tracing_height: f64,

    /// Euler step per tick (seconds of flow time)
    pub dt: f64,
    /// Wall-clock time accumulated before a tick fires (seconds)
    pub tick_interval: f64,

    /// How slabs are distributed
    pub backend: Backend,
    /// Worker pool size; defaults to one worker per slab
    pub workers: Option<usize>,
    /// How trails evolve each tick
    pub trail_mode: TrailMode,

    /// Whether the interactive clock starts paused
    pub start_paused: bool,

    /// Initial flow parameters
    pub flow: FlowConfiguration,
}

impl Default for TracerConfig {
    fn default() -> Self {
        let layout = TraceLayout::default();
        Self {
            i_count: layout.i_count,
            j_count: layout.j_count,
            k_count: layout.k_count,
            trail_len: layout.trail_len,
            tracing_width: layout.tracing_width,
            tracing_height: layout.tracing_height,
            dt: DEFAULT_DT,
            tick_interval: DEFAULT_TICK_INTERVAL,
            backend: Backend::default(),
            workers: None,
            trail_mode: TrailMode::default(),
            start_paused: true,
            flow: FlowConfiguration::default(),
        }
    }
}

impl TracerConfig {
    /// Checks every field for a usable value.
    ///
    /// # Errors
    ///
    /// Returns [`TracerError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), TracerError> {
        for (field, count) in [
            ("i_count", self.i_count),
            ("j_count", self.j_count),
            ("k_count", self.k_count),
            ("trail_len", self.trail_len),
        ] {
            if count == 0 {
                return Err(TracerError::invalid_config(field, "must be at least 1, got 0"));
            }
        }

        let vertices = [self.i_count, self.j_count, self.k_count, self.trail_len]
            .into_iter()
            .try_fold(2usize, usize::checked_mul)
            .filter(|&n| n <= MAX_VERTICES);
        if vertices.is_none() {
            return Err(TracerError::invalid_config(
                "trail_len",
                format!(
                    "lattice {}x{}x{} with {} samples exceeds {MAX_VERTICES} vertices",
                    self.i_count, self.j_count, self.k_count, self.trail_len
                ),
            ));
        }

        for (field, value) in [
            ("tracing_width", self.tracing_width),
            ("tracing_height", self.tracing_height),
            ("dt", self.dt),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TracerError::invalid_config(
                    field,
                    format!("must be finite and positive, got {value}"),
                ));
            }
        }

        if !self.tick_interval.is_finite() || self.tick_interval < 0.0 {
            return Err(TracerError::invalid_config(
                "tick_interval",
                format!("must be finite and non-negative, got {}", self.tick_interval),
            ));
        }

        match self.workers {
            Some(0) => {
                return Err(TracerError::invalid_config("workers", "must be at least 1, got 0"));
            }
            Some(n) if n > MAX_WORKERS => {
                return Err(TracerError::invalid_config(
                    "workers",
                    format!("must be at most {MAX_WORKERS}, got {n}"),
                ));
            }
            _ => {}
        }

        Ok(())
    }

    /// Grid layout described by this config.
    pub fn layout(&self) -> TraceLayout {
        TraceLayout {
            i_count: self.i_count,
            j_count: self.j_count,
            k_count: self.k_count,
            trail_len: self.trail_len,
            tracing_width: self.tracing_width,
            tracing_height: self.tracing_height,
        }
    }

    /// Worker pool size: one per slab up to [`MAX_WORKERS`] unless overridden.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or(self.i_count.min(MAX_WORKERS))
    }
}
