//! Rotor Downwash Flow Tracer Core Library
//!
//! Visualizes the airflow under a hovering rotor by tracing particles through a
//! procedurally built, divergence-free velocity field.
//!
//! ## Pipeline
//!
//! - `field`: analytic vector-potential primitives (point vortex, vortex ring,
//!   ellipsoid occluder) composed into the rotor field, and the discrete curl
//!   turning that potential into velocity
//! - `tracer`: a lattice of particles with fixed-length trails, advanced by
//!   explicit Euler steps, one disjoint slab per worker
//! - `simulation`: frame-driven ticking with play/pause, single-step and a
//!   UI-shared control radius
//!
//! The output is a line list of [`LineVertex`] values ready for upload to a
//! renderer.

pub mod config;
pub mod core_types;
pub mod error;
pub mod field;
pub mod profiler;
pub mod simulation;
pub mod tracer;

pub use config::TracerConfig;
pub use core_types::{LineVertex, Vec3};
pub use error::TracerError;
pub use field::{compute_velocity, evaluate_field, ControlHandle, FlowConfiguration, FlowField};
pub use simulation::FlowSimulation;
pub use tracer::{Backend, ParallelTracer, TickReport, TrailMode};
