//! Interactive flow simulation driver.
//!
//! Ties the tracer to a [`TickClock`] and a [`ControlHandle`]. The host calls
//! [`FlowSimulation::update`] once per rendered frame; the UI writes the control
//! radius through a cloned handle from any thread.

use tracing::info;

use crate::config::TracerConfig;
use crate::core_types::vertex::LineVertex;
use crate::error::TracerError;
use crate::field::flow::ControlHandle;
use crate::tracer::clock::TickClock;
use crate::tracer::parallel::{ParallelTracer, TickReport};

/// Frame-driven wrapper around a [`ParallelTracer`]
pub struct FlowSimulation {
    tracer: ParallelTracer,
    clock: TickClock,
    control: ControlHandle,
    last_report: Option<TickReport>,
}

impl FlowSimulation {
    /// Creates a simulation from a config.
    ///
    /// # Errors
    ///
    /// Propagates [`ParallelTracer::new`] failures.
    pub fn new(config: &TracerConfig) -> Result<Self, TracerError> {
        let tracer = ParallelTracer::new(config)?;
        let clock = TickClock::new(config.tick_interval, !config.start_paused);
        let control = ControlHandle::new(config.flow.control_radius);

        info!(
            "Flow simulation created: control_radius={:.3}, running={}",
            control.get(),
            clock.is_running()
        );

        Ok(Self {
            tracer,
            clock,
            control,
            last_report: None,
        })
    }

    /// Feeds one frame's wall-clock delta; ticks if due.
    ///
    /// Returns the tick report when a tick ran. The control radius is read
    /// once, before the tick starts.
    ///
    /// # Errors
    ///
    /// Propagates [`ParallelTracer::tick`] failures.
    pub fn update(&mut self, frame_dt: f64) -> Result<Option<TickReport>, TracerError> {
        if !self.clock.advance(frame_dt) {
            return Ok(None);
        }

        let control_radius = self.control.get();
        let report = self.tracer.tick(control_radius)?;
        self.last_report = Some(report);
        Ok(Some(report))
    }

    /// Runs exactly one tick on the next [`FlowSimulation::update`].
    pub fn request_step(&mut self) {
        self.clock.request_step();
    }

    /// Reseeds all particles.
    pub fn reset(&mut self) {
        self.tracer.reset();
    }

    /// Collapses trails towards the `z = 0` plane.
    pub fn flatten_depth(&mut self) {
        self.tracer.flatten_depth();
    }

    pub fn set_running(&mut self, running: bool) {
        info!("Simulation {}", if running { "resumed" } else { "paused" });
        self.clock.set_running(running);
    }

    /// Flips play/pause and returns the new state.
    pub fn toggle_running(&mut self) -> bool {
        let running = !self.clock.is_running();
        self.set_running(running);
        running
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Handle for the UI thread to write the control radius.
    pub fn control_handle(&self) -> ControlHandle {
        self.control.clone()
    }

    pub fn set_control_radius(&self, control_radius: f64) {
        self.control.set(control_radius);
    }

    pub fn control_radius(&self) -> f64 {
        self.control.get()
    }

    /// Line list of the last completed tick.
    pub fn vertices(&self) -> &[LineVertex] {
        self.tracer.vertices()
    }

    pub fn tracer(&self) -> &ParallelTracer {
        &self.tracer
    }

    pub fn tick_count(&self) -> u64 {
        self.tracer.tick_count()
    }

    pub fn last_report(&self) -> Option<&TickReport> {
        self.last_report.as_ref()
    }
}
