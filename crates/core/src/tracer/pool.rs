//! Persistent worker pool for slab updates.
//!
//! Workers are spawned once and live until the pool is dropped. Each tick the
//! driver moves every slab into the task channel and blocks until all of them
//! come back on the result channel; that receive loop is the tick barrier.
//! A slab is owned by exactly one worker while in flight, so the grid needs no
//! locking.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, warn};

use super::grid::{TraceLayout, TraceSlab};
use super::integrator::StreamlineIntegrator;
use crate::error::TracerError;

/// One slab to advance.
struct SlabTask {
    slab: TraceSlab,
    integrator: Arc<StreamlineIntegrator>,
    layout: TraceLayout,
}

/// Advanced slab, or the index of a slab whose worker panicked.
type SlabResult = Result<TraceSlab, usize>;

/// Fixed set of named worker threads fed through channels.
pub struct WorkerPool {
    task_tx: Option<Sender<SlabTask>>,
    result_rx: Receiver<SlabResult>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` workers (at least one).
    ///
    /// # Errors
    ///
    /// Returns [`TracerError::WorkerSpawn`] if the OS refuses a thread.
    pub fn new(size: usize) -> Result<Self, TracerError> {
        let size = size.max(1);
        let (task_tx, task_rx) = crossbeam_channel::unbounded::<SlabTask>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<SlabResult>();

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("rotor-flow-worker-{id}"))
                .spawn(move || worker_loop(&task_rx, &result_tx))?;
            workers.push(handle);
        }

        info!("Worker pool started with {} threads", size);

        Ok(Self {
            task_tx: Some(task_tx),
            result_rx,
            workers,
        })
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Advances every slab on the pool and waits for all of them.
    ///
    /// Returned slabs are ordered by outer index.
    ///
    /// # Errors
    ///
    /// Returns [`TracerError::WorkerPanicked`] if any slab's update panicked
    /// (the remaining slabs are still drained), or
    /// [`TracerError::PoolDisconnected`] if the channels closed.
    pub fn run(
        &self,
        slabs: Vec<TraceSlab>,
        integrator: &Arc<StreamlineIntegrator>,
        layout: &TraceLayout,
    ) -> Result<Vec<TraceSlab>, TracerError> {
        let task_tx = self.task_tx.as_ref().ok_or(TracerError::PoolDisconnected)?;

        let expected = slabs.len();
        let mut dispatched = 0;
        for slab in slabs {
            let task = SlabTask {
                slab,
                integrator: Arc::clone(integrator),
                layout: *layout,
            };
            if task_tx.send(task).is_err() {
                break;
            }
            dispatched += 1;
        }

        let mut done = Vec::with_capacity(expected);
        let mut failure = None;
        for _ in 0..dispatched {
            match self.result_rx.recv() {
                Ok(Ok(slab)) => done.push(slab),
                Ok(Err(slab)) => {
                    if failure.is_none() {
                        failure = Some(TracerError::WorkerPanicked { slab });
                    }
                }
                Err(_) => return Err(TracerError::PoolDisconnected),
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }
        if dispatched < expected {
            return Err(TracerError::PoolDisconnected);
        }

        done.sort_unstable_by_key(TraceSlab::index);
        Ok(done)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the task channel ends every worker loop.
        drop(self.task_tx.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("Worker thread exited with a panic");
            }
        }
        debug!("Worker pool shut down");
    }
}

fn worker_loop(task_rx: &Receiver<SlabTask>, result_tx: &Sender<SlabResult>) {
    while let Ok(task) = task_rx.recv() {
        let SlabTask {
            mut slab,
            integrator,
            layout,
        } = task;
        let index = slab.index();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            integrator.advance_slab(&mut slab, &layout);
        }));
        let result = match outcome {
            Ok(()) => Ok(slab),
            Err(_) => Err(index),
        };

        if result_tx.send(result).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracer::grid::TraceGrid;
    use crate::tracer::integrator::{TrailMode, DEFAULT_DT};

    fn layout() -> TraceLayout {
        TraceLayout {
            i_count: 5,
            j_count: 3,
            k_count: 2,
            trail_len: 4,
            ..TraceLayout::default()
        }
    }

    #[test]
    fn test_pool_matches_serial() {
        let layout = layout();
        let integrator = Arc::new(StreamlineIntegrator::for_control_radius(
            5.95,
            DEFAULT_DT,
            TrailMode::Advect,
        ));

        let mut serial = TraceGrid::new(layout);
        for slab in serial.slabs_mut() {
            integrator.advance_slab(slab, &layout);
        }

        let pool = WorkerPool::new(2).expect("pool should start");
        let mut pooled = TraceGrid::new(layout);
        let slabs = pool
            .run(pooled.take_slabs(), &integrator, &layout)
            .expect("tick should succeed");
        pooled.restore_slabs(slabs);

        assert_eq!(pooled, serial);
    }

    #[test]
    fn test_pool_size_floor() {
        let pool = WorkerPool::new(0).expect("pool should start");
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn test_panicking_slab_reported_and_pool_survives() {
        let good = layout();
        let broken = TraceLayout {
            trail_len: 0,
            ..good
        };
        let integrator = Arc::new(StreamlineIntegrator::for_control_radius(
            5.95,
            DEFAULT_DT,
            TrailMode::Advect,
        ));
        let pool = WorkerPool::new(3).expect("pool should start");

        let mut grid = TraceGrid::new(good);
        let result = pool.run(grid.take_slabs(), &integrator, &broken);
        assert!(matches!(result, Err(TracerError::WorkerPanicked { .. })));

        // Workers caught the panic and keep serving.
        let mut grid = TraceGrid::new(good);
        let slabs = pool
            .run(grid.take_slabs(), &integrator, &good)
            .expect("pool should recover");
        assert_eq!(slabs.len(), 5);
    }
}
