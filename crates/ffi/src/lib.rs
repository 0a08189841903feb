//! C ABI for the rotor flow tracer.
//!
//! Hosts create an opaque [`RotorFlowInstance`] with `rotor_flow_new`, feed
//! frame deltas through `rotor_flow_update`, and read the line list with
//! `rotor_flow_get_vertices`. Every fallible call returns a
//! [`RotorFlowErrorCode`]; details are available per thread through
//! `rotor_flow_get_last_error`. The header is generated into
//! `RotorFlowFFI.h` at the workspace root.

mod error;
mod helpers;
mod instance;
mod queries;
mod simulation;

pub use error::{rotor_flow_get_last_error, rotor_flow_get_last_error_code, RotorFlowErrorCode};
pub use instance::{
    rotor_flow_default_settings, rotor_flow_destroy, rotor_flow_new, RotorFlowInstance,
    TracerSettings, ROTOR_FLOW_BACKEND_RAYON, ROTOR_FLOW_BACKEND_SERIAL,
    ROTOR_FLOW_BACKEND_WORKER_POOL, ROTOR_FLOW_TRAIL_ADVECT, ROTOR_FLOW_TRAIL_RETRACE,
};
pub use queries::{rotor_flow_get_tick_count, rotor_flow_get_vertices, TraceVertex};
pub use simulation::{
    rotor_flow_flatten_depth, rotor_flow_get_control_radius, rotor_flow_reset,
    rotor_flow_set_control_radius, rotor_flow_set_running, rotor_flow_step, rotor_flow_update,
};
