//! Parallel tick driver.
//!
//! A tick snapshots the control radius, builds one frozen [`FlowField`],
//! advances every slab on the selected backend and only then rebuilds the
//! vertex buffer. Slabs are disjoint, so the backends differ only in where
//! the per-slab loop runs and produce bit-identical grids.
//!
//! [`FlowField`]: crate::field::flow::FlowField

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::grid::TraceGrid;
use super::integrator::{StreamlineIntegrator, TrailMode};
use super::pool::WorkerPool;
use crate::config::TracerConfig;
use crate::core_types::vertex::{write_trail_segments, LineVertex};
use crate::error::TracerError;
use crate::field::flow::clamp_control_radius;
use crate::profiler::{FrameTimer, ProfilerScope};

/// Where slab updates run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backend {
    /// On the calling thread
    Serial,
    /// On the rayon global pool
    Rayon,
    /// On a persistent pool of named threads
    #[default]
    WorkerPool,
}

/// Summary of one completed tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Ticks completed since construction, including this one
    pub tick: u64,
    /// Clamped control radius the tick ran with
    pub control_radius: f64,
    /// Wall-clock duration in milliseconds
    pub elapsed_ms: f64,
}

/// Owns the particle grid and advances it one tick at a time.
pub struct ParallelTracer {
    grid: TraceGrid,
    dt: f64,
    mode: TrailMode,
    backend: Backend,
    pool: Option<WorkerPool>,
    vertices: Vec<LineVertex>,
    tick_count: u64,
    timer: FrameTimer,
}

impl ParallelTracer {
    /// Builds a tracer with its grid seeded on the lattice.
    ///
    /// # Errors
    ///
    /// Returns [`TracerError::InvalidConfig`] for an invalid config, or
    /// [`TracerError::WorkerSpawn`] if the worker pool cannot start.
    pub fn new(config: &TracerConfig) -> Result<Self, TracerError> {
        config.validate()?;

        let layout = config.layout();
        let pool = match config.backend {
            Backend::WorkerPool => Some(WorkerPool::new(config.worker_count())?),
            Backend::Serial | Backend::Rayon => None,
        };

        info!(
            "Tracer initialized: {}x{}x{} particles, trail_len={}, backend={:?}, mode={:?}",
            layout.i_count, layout.j_count, layout.k_count, layout.trail_len, config.backend, config.trail_mode
        );

        let mut tracer = Self {
            grid: TraceGrid::new(layout),
            dt: config.dt,
            mode: config.trail_mode,
            backend: config.backend,
            pool,
            vertices: vec![LineVertex::default(); 2 * layout.particle_count() * layout.trail_len],
            tick_count: 0,
            timer: FrameTimer::new(),
        };
        tracer.rebuild_vertices();
        Ok(tracer)
    }

    /// Advances every particle by one step.
    ///
    /// `control_radius` is clamped and used for the whole tick.
    ///
    /// # Errors
    ///
    /// Returns [`TracerError::WorkerPanicked`] or
    /// [`TracerError::PoolDisconnected`] if a pool worker failed. The grid is
    /// reseeded on the lattice before returning.
    pub fn tick(&mut self, control_radius: f64) -> Result<TickReport, TracerError> {
        let scope = ProfilerScope::new("tracer_tick");
        let control_radius = clamp_control_radius(control_radius);
        let layout = *self.grid.layout();
        let integrator = Arc::new(StreamlineIntegrator::for_control_radius(
            control_radius,
            self.dt,
            self.mode,
        ));

        match self.backend {
            Backend::Serial => {
                for slab in self.grid.slabs_mut() {
                    integrator.advance_slab(slab, &layout);
                }
            }
            Backend::Rayon => {
                self.grid
                    .slabs_mut()
                    .par_iter_mut()
                    .for_each(|slab| integrator.advance_slab(slab, &layout));
            }
            Backend::WorkerPool => {
                let pool = self.pool.as_ref().ok_or(TracerError::PoolDisconnected)?;
                match pool.run(self.grid.take_slabs(), &integrator, &layout) {
                    Ok(slabs) => self.grid.restore_slabs(slabs),
                    Err(err) => {
                        error!(
                            "Tick {} failed: {}; reseeding particles",
                            self.tick_count + 1,
                            err
                        );
                        self.grid = TraceGrid::new(layout);
                        self.rebuild_vertices();
                        return Err(err);
                    }
                }
            }
        }

        self.tick_count += 1;
        self.rebuild_vertices();

        let elapsed_ms = scope.elapsed_ms();
        self.timer.record(elapsed_ms);

        debug!(
            "Tick {}: control_radius={:.3}, {:.2}ms (avg {:.2}ms)",
            self.tick_count,
            control_radius,
            elapsed_ms,
            self.timer.average_ms()
        );

        Ok(TickReport {
            tick: self.tick_count,
            control_radius,
            elapsed_ms,
        })
    }

    /// Reseeds every particle on the lattice.
    pub fn reset(&mut self) {
        info!("Resetting {} particles", self.grid.layout().particle_count());
        self.grid.reset();
        self.rebuild_vertices();
    }

    /// Collapses the grid towards the `z = 0` plane.
    pub fn flatten_depth(&mut self) {
        debug!("Flattening trail depth");
        self.grid.flatten_depth();
        self.rebuild_vertices();
    }

    fn rebuild_vertices(&mut self) {
        let layout = *self.grid.layout();
        let trail_len = layout.trail_len;
        self.vertices
            .par_chunks_mut(2 * layout.slab_len())
            .zip(self.grid.slabs().par_iter())
            .for_each(|(out, slab)| {
                for (trail, segments) in slab
                    .trails(trail_len)
                    .zip(out.chunks_exact_mut(2 * trail_len))
                {
                    write_trail_segments(trail, segments);
                }
            });
    }

    pub fn grid(&self) -> &TraceGrid {
        &self.grid
    }

    /// Line list of the last completed tick, ordered by `(i, j, k, l)`.
    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn trail_mode(&self) -> TrailMode {
        self.mode
    }

    /// Worker threads in use, zero for the serial and rayon backends.
    pub fn worker_count(&self) -> usize {
        self.pool.as_ref().map_or(0, WorkerPool::size)
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }
}
