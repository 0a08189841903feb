//! Procedural flow field: analytic potentials and their discrete curl

pub mod curl;
pub mod flow;
pub mod potential;

pub use curl::{compute_velocity, curl, CURL_EPSILON};
pub use flow::{
    clamp_control_radius, evaluate_field, radius_function, secondary_ring_active, ControlHandle,
    FlowConfiguration, FlowField,
};
pub use potential::{
    occluder, point_vortex, smoothstep, vortex_ring, PotentialSource, OCCLUDER_BLEND_OUTER,
};
