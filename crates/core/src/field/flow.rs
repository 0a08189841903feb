//! Rotor Downwash Flow Field
//!
//! Composes the potential primitives into the hovering-rotor field:
//!
//! 1. A point vortex at the hub producing the downwash column.
//! 2. The main vortex ring at the rotor tip radius. Its tube radius follows
//!    the control radius, peaking at the base radius.
//! 3. Above the base radius, a counter-rotating inner ring whose size grows
//!    with the excess.
//! 4. The fuselage, an ellipsoid occluder that replaces the accumulated
//!    potential.
//!
//! ```text
//! radius_fn = R₀ − |control − R₀|,   R₀ = 5.95
//! ```
//!
//! The control radius is the only externally adjustable input. It is shared
//! with the UI through a [`ControlHandle`] and snapshotted once per tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::curl::{curl, CURL_EPSILON};
use super::potential::PotentialSource;
use crate::core_types::vec3::Vec3;

/// Fixed rotor and fuselage geometry
pub mod constants {
    /// Rotor tip radius and default control radius
    pub const BASE_RADIUS: f64 = 5.95;

    /// Upper bound of the control radius
    pub const MAX_CONTROL_RADIUS: f64 = 2.0 * BASE_RADIUS;

    /// Spin of the hub vortex driving the downwash column
    pub const DOWNWASH_ANGULAR_VELOCITY: [f64; 3] = [0.0, -0.5, 0.0];

    /// Fuselage ellipsoid center
    pub const FUSELAGE_CENTER: [f64; 3] = [0.0, -1.6, 0.0];

    /// Fuselage ellipsoid semi-axes
    pub const FUSELAGE_RADII: [f64; 3] = [1.0, 1.6, 4.5];
}

/// Clamps a control radius to `[0, MAX_CONTROL_RADIUS]`.
///
/// NaN maps to the base radius.
#[inline]
pub fn clamp_control_radius(control_radius: f64) -> f64 {
    if control_radius.is_nan() {
        return constants::BASE_RADIUS;
    }
    control_radius.clamp(0.0, constants::MAX_CONTROL_RADIUS)
}

/// Main ring tube radius for a (clamped) control radius.
#[inline]
pub fn radius_function(control_radius: f64) -> f64 {
    constants::BASE_RADIUS - (control_radius - constants::BASE_RADIUS).abs()
}

/// Whether the counter-rotating inner ring is present.
#[inline]
pub fn secondary_ring_active(control_radius: f64) -> bool {
    control_radius > constants::BASE_RADIUS
}

/// User-adjustable flow parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowConfiguration {
    /// Rotor control radius, clamped to `[0, 2 × BASE_RADIUS]` on use
    pub control_radius: f64,
}

impl Default for FlowConfiguration {
    fn default() -> Self {
        Self {
            control_radius: constants::BASE_RADIUS,
        }
    }
}

impl FlowConfiguration {
    /// Control radius after clamping.
    pub fn clamped_radius(&self) -> f64 {
        clamp_control_radius(self.control_radius)
    }

    /// Builds the composed field for this configuration.
    pub fn field(&self) -> FlowField {
        FlowField::from_control_radius(self.control_radius)
    }
}

/// An ordered composition of potential sources.
///
/// Pure and `Sync`: one instance is shared by every worker for a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowField {
    sources: Vec<PotentialSource>,
}

impl FlowField {
    /// Composes a field from explicit sources, applied in order.
    pub fn new(sources: Vec<PotentialSource>) -> Self {
        Self { sources }
    }

    /// The rotor downwash field for a control radius.
    pub fn from_control_radius(control_radius: f64) -> Self {
        let control_radius = clamp_control_radius(control_radius);
        let radius_fn = radius_function(control_radius);
        let base = constants::BASE_RADIUS;

        let mut sources = Vec::with_capacity(4);
        sources.push(PotentialSource::PointVortex {
            radius: base,
            center: Vec3::zeros(),
            angular_velocity: Vec3::from(constants::DOWNWASH_ANGULAR_VELOCITY),
        });
        sources.push(PotentialSource::VortexRing {
            ring_radius: base,
            influence_radius: radius_fn,
            center: Vec3::zeros(),
            normal: Vec3::new(0.0, 1.0, 0.0),
        });
        if secondary_ring_active(control_radius) {
            let inner = base - radius_fn;
            sources.push(PotentialSource::VortexRing {
                ring_radius: inner,
                influence_radius: inner,
                center: Vec3::zeros(),
                normal: Vec3::new(0.0, -1.0, 0.0),
            });
        }
        sources.push(PotentialSource::EllipsoidOccluder {
            center: Vec3::from(constants::FUSELAGE_CENTER),
            radii: Vec3::from(constants::FUSELAGE_RADII),
        });

        Self { sources }
    }

    pub fn sources(&self) -> &[PotentialSource] {
        &self.sources
    }

    /// Vector potential at `x`.
    #[inline]
    pub fn potential(&self, x: &Vec3) -> Vec3 {
        self.sources
            .iter()
            .fold(Vec3::zeros(), |phi, source| source.apply(&phi, x))
    }

    /// Velocity at `x`, the discrete curl of the potential.
    #[inline]
    pub fn velocity(&self, x: &Vec3) -> Vec3 {
        curl(|p| self.potential(p), x, CURL_EPSILON)
    }
}

impl Default for FlowField {
    fn default() -> Self {
        FlowConfiguration::default().field()
    }
}

/// Vector potential of the rotor field at `x`.
pub fn evaluate_field(x: &Vec3, control_radius: f64) -> Vec3 {
    FlowField::from_control_radius(control_radius).potential(x)
}

/// Lock-free control radius shared between the UI and the tracer.
///
/// Stores the `f64` bit pattern in an atomic; writers clamp before storing.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    bits: Arc<AtomicU64>,
}

impl ControlHandle {
    pub fn new(control_radius: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(
                clamp_control_radius(control_radius).to_bits(),
            )),
        }
    }

    /// Stores a new control radius, clamped to its domain.
    pub fn set(&self, control_radius: f64) {
        self.bits.store(
            clamp_control_radius(control_radius).to_bits(),
            Ordering::Relaxed,
        );
    }

    /// Current control radius.
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl Default for ControlHandle {
    fn default() -> Self {
        Self::new(constants::BASE_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_radius_clamping() {
        assert_eq!(clamp_control_radius(-3.0), 0.0);
        assert_eq!(clamp_control_radius(50.0), 11.9);
        assert_eq!(clamp_control_radius(f64::NAN), constants::BASE_RADIUS);
        assert_eq!(clamp_control_radius(f64::INFINITY), 11.9);
        assert_eq!(clamp_control_radius(7.5), 7.5);
    }

    #[test]
    fn test_radius_function_peaks_at_base() {
        assert_eq!(radius_function(constants::BASE_RADIUS), constants::BASE_RADIUS);
        assert!((radius_function(3.0) - 3.0).abs() < 1e-12);
        assert!((radius_function(8.0) - 3.9).abs() < 1e-12);
        assert!(radius_function(0.0).abs() < 1e-12);
        assert!(radius_function(11.9).abs() < 1e-12);
    }

    #[test]
    fn test_secondary_ring_boundary() {
        assert!(!secondary_ring_active(constants::BASE_RADIUS));
        assert!(!secondary_ring_active(3.0));
        assert!(secondary_ring_active(constants::BASE_RADIUS + 1e-9));

        assert_eq!(FlowField::from_control_radius(5.95).sources().len(), 3);
        assert_eq!(FlowField::from_control_radius(8.0).sources().len(), 4);
    }

    #[test]
    fn test_occluder_is_last() {
        let field = FlowField::from_control_radius(9.0);
        let last = field.sources().last().map(PotentialSource::kind);
        assert_eq!(last, Some("ellipsoid_occluder"));
    }

    #[test]
    fn test_evaluate_field_matches_composed_field() {
        let x = Vec3::new(3.0, 2.0, 1.0);
        let field = FlowField::from_control_radius(7.0);
        assert_eq!(evaluate_field(&x, 7.0), field.potential(&x));
    }

    #[test]
    fn test_reference_potential_sample() {
        let phi = evaluate_field(&Vec3::new(3.0, 2.0, 1.0), 5.95);
        assert!((phi.x - 3.163766263291716).abs() < 1e-12);
        assert!((phi.y + 1.9858845705701984).abs() < 1e-12);
        assert!((phi.z + 9.491298789875147).abs() < 1e-12);
    }

    #[test]
    fn test_control_handle_shares_value() {
        let handle = ControlHandle::default();
        let ui_side = handle.clone();
        assert_eq!(handle.get(), constants::BASE_RADIUS);

        ui_side.set(8.25);
        assert_eq!(handle.get(), 8.25);

        ui_side.set(f64::NAN);
        assert_eq!(handle.get(), constants::BASE_RADIUS);

        ui_side.set(-1.0);
        assert_eq!(handle.get(), 0.0);
    }

    #[test]
    fn test_configuration_default() {
        let config = FlowConfiguration::default();
        assert_eq!(config.control_radius, 5.95);
        assert_eq!(config.field(), FlowField::default());
    }
}
