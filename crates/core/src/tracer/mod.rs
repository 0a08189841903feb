//! Particle tracing: grid storage, integration, and parallel tick dispatch

pub mod clock;
pub mod grid;
pub mod integrator;
pub mod parallel;
pub mod pool;

pub use clock::{TickClock, DEFAULT_TICK_INTERVAL};
pub use grid::{TraceGrid, TraceLayout, TraceSlab};
pub use integrator::{step, StreamlineIntegrator, TrailMode, DEFAULT_DT};
pub use parallel::{Backend, ParallelTracer, TickReport};
pub use pool::WorkerPool;
