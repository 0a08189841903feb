//! Discrete curl of a vector potential.
//!
//! One-sided differences with a fixed step:
//!
//! ```text
//! ∂ψ/∂eᵢ ≈ (ψ(x) − ψ(x + ε eᵢ)) / ε
//! v = (∂ψz/∂y − ∂ψy/∂z,  ∂ψx/∂z − ∂ψz/∂x,  ∂ψy/∂x − ∂ψx/∂y)
//! ```
//!
//! The base-minus-perturbed ordering flips the sign of every partial, and so of
//! the velocity, relative to the textbook curl. The rotor field's orientation
//! is tuned against this ordering; keep it.

use super::flow::FlowField;
use crate::core_types::vec3::Vec3;

/// Finite-difference step for the curl
pub const CURL_EPSILON: f64 = 1e-4;

/// Discrete curl of `potential` at `x`, using four potential evaluations.
#[inline]
pub fn curl<F>(potential: F, x: &Vec3, eps: f64) -> Vec3
where
    F: Fn(&Vec3) -> Vec3,
{
    let base = potential(x);
    let d_dx = (base - potential(&(x + Vec3::new(eps, 0.0, 0.0)))) / eps;
    let d_dy = (base - potential(&(x + Vec3::new(0.0, eps, 0.0)))) / eps;
    let d_dz = (base - potential(&(x + Vec3::new(0.0, 0.0, eps)))) / eps;

    Vec3::new(d_dy.z - d_dz.y, d_dz.x - d_dx.z, d_dx.y - d_dy.x)
}

/// Rotor field velocity at `x` for a control radius.
pub fn compute_velocity(x: &Vec3, control_radius: f64) -> Vec3 {
    FlowField::from_control_radius(control_radius).velocity(x)
}
