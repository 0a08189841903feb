//! Analytic Vector-Potential Primitives
//!
//! Building blocks for the rotor downwash potential. Each primitive maps a
//! world position to a contribution to the vector potential `ψ`; the velocity
//! is recovered later as `v = ∇ × ψ`, which is divergence-free for any smooth
//! `ψ`.
//!
//! # Point vortex
//!
//! A compactly supported bump oriented along the spin axis `ω`:
//!
//! ```text
//! ψ(x) = ω · clamp(1 − r/R, 0, 1) · (R² − r²) / 2,   r = |x − c|
//! ```
//!
//! The contribution and its first derivative vanish at `r = R`, so a vortex
//! blends into its surroundings without a velocity jump.
//!
//! # Vortex ring
//!
//! A ring of radius `r` around `c` in the plane normal to `n` is modeled as the
//! point vortex located at the ring point nearest `x`, spinning about the ring
//! tangent:
//!
//! ```text
//! dir = normalize((x − c) − n (n · (x − c)))
//! x_c = c + r · dir
//! ω_c = 2 · (n × dir)
//! ```
//!
//! # Ellipsoid occluder
//!
//! Solid bodies are carved out of the flow by projecting the potential onto
//! the body normal near its surface (Bridson et al., "Curl-Noise for
//! Procedural Fluid Flow", 2007):
//!
//! ```text
//! α = smoothstep(1, 1.5, d)
//! ψ' = (1 − α) · n (n · ψ) + α · ψ
//! ```
//!
//! where `d` is the ellipsoid-normalized distance and `n` the normalized local
//! offset. Inside the body (`d < 1`) the potential is zero.

use crate::core_types::vec3::{normalize_or_zero, Vec3};
use serde::{Deserialize, Serialize};

/// Normalized distance at which an occluder stops affecting the potential.
pub const OCCLUDER_BLEND_OUTER: f64 = 1.5;

/// Hermite interpolation between `edge0` and `edge1`.
#[inline]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Potential of a point vortex with influence radius `radius`.
///
/// Exactly zero outside the influence sphere and for non-positive radii.
#[inline]
pub fn point_vortex(radius: f64, center: &Vec3, angular_velocity: &Vec3, x: &Vec3) -> Vec3 {
    if radius <= 0.0 {
        return Vec3::zeros();
    }

    let offset = x - center;
    let dist_sq = offset.dot(&offset);
    let dist = dist_sq.sqrt();
    if dist >= radius {
        return Vec3::zeros();
    }

    let falloff = (1.0 - dist / radius).clamp(0.0, 1.0);
    let strength = falloff * (radius * radius - dist_sq) / 2.0;
    angular_velocity * strength
}

/// Potential of a vortex ring.
///
/// `ring_radius` places the ring around `center`; `influence_radius` is the
/// radius of the vortex tube around the ring. On the ring axis the in-plane
/// direction is undefined and the ring collapses onto its center. A
/// non-positive ring radius describes no ring and contributes nothing.
#[inline]
pub fn vortex_ring(
    ring_radius: f64,
    influence_radius: f64,
    center: &Vec3,
    normal: &Vec3,
    x: &Vec3,
) -> Vec3 {
    if ring_radius <= 0.0 {
        return Vec3::zeros();
    }

    let offset = x - center;
    let in_plane = offset - normal * offset.dot(normal);
    let dir = normalize_or_zero(&in_plane);

    let nearest = center + dir * ring_radius;
    let spin = normal.cross(&dir) * 2.0;
    point_vortex(influence_radius, &nearest, &spin, x)
}

/// Applies an ellipsoidal occluder to an accumulated potential.
///
/// Replaces `phi` rather than adding to it. Non-positive or non-finite radii
/// describe no body and leave `phi` unchanged.
#[inline]
pub fn occluder(center: &Vec3, radii: &Vec3, phi: &Vec3, x: &Vec3) -> Vec3 {
    if radii.iter().any(|r| !r.is_finite() || *r <= 0.0) {
        return *phi;
    }

    let local = (x - center).component_div(radii);
    let dist = local.norm();
    if dist < 1.0 {
        return Vec3::zeros();
    }

    let n = normalize_or_zero(&local);
    let alpha = smoothstep(1.0, OCCLUDER_BLEND_OUTER, dist);
    n * ((1.0 - alpha) * n.dot(phi)) + phi * alpha
}

/// A single contribution to a composed potential field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PotentialSource {
    PointVortex {
        radius: f64,
        center: Vec3,
        angular_velocity: Vec3,
    },
    VortexRing {
        ring_radius: f64,
        influence_radius: f64,
        center: Vec3,
        normal: Vec3,
    },
    /// Solid body; replaces the potential accumulated so far.
    EllipsoidOccluder { center: Vec3, radii: Vec3 },
}

impl PotentialSource {
    /// Folds this source into the potential `phi` accumulated at `x`.
    #[inline]
    pub fn apply(&self, phi: &Vec3, x: &Vec3) -> Vec3 {
        match self {
            Self::PointVortex {
                radius,
                center,
                angular_velocity,
            } => phi + point_vortex(*radius, center, angular_velocity, x),
            Self::VortexRing {
                ring_radius,
                influence_radius,
                center,
                normal,
            } => phi + vortex_ring(*ring_radius, *influence_radius, center, normal, x),
            Self::EllipsoidOccluder { center, radii } => occluder(center, radii, phi, x),
        }
    }

    /// Short name for log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PointVortex { .. } => "point_vortex",
            Self::VortexRing { .. } => "vortex_ring",
            Self::EllipsoidOccluder { .. } => "ellipsoid_occluder",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(1.0, 1.5, 0.5), 0.0);
        assert_eq!(smoothstep(1.0, 1.5, 1.0), 0.0);
        assert_eq!(smoothstep(1.0, 1.5, 1.5), 1.0);
        assert_eq!(smoothstep(1.0, 1.5, 3.0), 1.0);
        assert_relative_eq!(smoothstep(1.0, 1.5, 1.25), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_smoothstep_flat_at_edges() {
        let h = 1e-6;
        let lower_slope = (smoothstep(1.0, 1.5, 1.0 + h) - smoothstep(1.0, 1.5, 1.0)) / h;
        let upper_slope = (smoothstep(1.0, 1.5, 1.5) - smoothstep(1.0, 1.5, 1.5 - h)) / h;
        assert!(lower_slope.abs() < 1e-4, "Slope at edge0 was {lower_slope}");
        assert!(upper_slope.abs() < 1e-4, "Slope at edge1 was {upper_slope}");
    }

    #[test]
    fn test_point_vortex_zero_outside_radius() {
        let center = Vec3::new(1.0, -2.0, 0.5);
        let omega = Vec3::new(0.0, -0.5, 0.0);
        for dist in [2.0, 2.0 + 1e-9, 3.0, 100.0] {
            let x = center + Vec3::new(dist, 0.0, 0.0);
            assert_eq!(point_vortex(2.0, &center, &omega, &x), Vec3::zeros());
        }
    }

    #[test]
    fn test_point_vortex_continuous_at_boundary() {
        let omega = Vec3::new(0.0, 1.0, 0.0);
        let inside = point_vortex(2.0, &Vec3::zeros(), &omega, &Vec3::new(2.0 - 1e-6, 0.0, 0.0));
        assert!(inside.norm() < 1e-9, "Contribution near the boundary was {inside:?}");
    }

    #[test]
    fn test_point_vortex_peak_at_center() {
        let omega = Vec3::new(0.0, -0.5, 0.0);
        let phi = point_vortex(5.95, &Vec3::zeros(), &omega, &Vec3::zeros());
        assert_relative_eq!(phi.y, -0.5 * 5.95 * 5.95 / 2.0, epsilon = 1e-12);
        assert_eq!(phi.x, 0.0);
        assert_eq!(phi.z, 0.0);
    }

    #[test]
    fn test_degenerate_radii_contribute_nothing() {
        let x = Vec3::new(0.1, 0.2, 0.3);
        let omega = Vec3::new(1.0, 1.0, 1.0);
        assert_eq!(point_vortex(0.0, &Vec3::zeros(), &omega, &x), Vec3::zeros());
        assert_eq!(point_vortex(-1.0, &Vec3::zeros(), &omega, &x), Vec3::zeros());
        let up = Vec3::y();
        assert_eq!(vortex_ring(5.0, 0.0, &Vec3::zeros(), &up, &x), Vec3::zeros());
        assert_eq!(vortex_ring(5.0, -2.0, &Vec3::zeros(), &up, &x), Vec3::zeros());

        let near_center = Vec3::new(1.0, 0.5, 0.0);
        assert_eq!(vortex_ring(0.0, 5.0, &Vec3::zeros(), &up, &near_center), Vec3::zeros());
        assert_eq!(vortex_ring(-2.0, 5.0, &Vec3::zeros(), &up, &near_center), Vec3::zeros());
    }

    #[test]
    fn test_vortex_ring_on_axis_is_finite() {
        let up = Vec3::y();
        let phi = vortex_ring(5.95, 5.95, &Vec3::zeros(), &up, &Vec3::new(0.0, 3.0, 0.0));
        assert!(phi.iter().all(|c| c.is_finite()));
        // Ring collapses onto the center where the spin axis is zero.
        assert_eq!(phi, Vec3::zeros());
    }

    #[test]
    fn test_vortex_ring_spins_about_tangent() {
        let up = Vec3::y();
        let x = Vec3::new(5.0, 0.5, 0.0);
        let phi = vortex_ring(5.95, 2.0, &Vec3::zeros(), &up, &x);
        // Nearest ring point is (5.95, 0, 0); n × dir = y × x = -z.
        assert!(phi.z < 0.0);
        assert_relative_eq!(phi.x, 0.0, epsilon = 1e-15);
        assert_relative_eq!(phi.y, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_occluder_zero_inside_body() {
        let center = Vec3::new(0.0, -1.6, 0.0);
        let radii = Vec3::new(1.0, 1.6, 4.5);
        let phi = Vec3::new(3.0, -2.0, 7.0);
        for x in [
            center,
            Vec3::new(0.5, -1.6, 0.0),
            Vec3::new(0.0, -0.1, 0.0),
            Vec3::new(0.0, -1.6, 4.4),
        ] {
            assert_eq!(occluder(&center, &radii, &phi, &x), Vec3::zeros());
        }
    }

    #[test]
    fn test_occluder_identity_far_away() {
        let center = Vec3::new(0.0, -1.6, 0.0);
        let radii = Vec3::new(1.0, 1.6, 4.5);
        let phi = Vec3::new(3.0, -2.0, 7.0);
        let x = Vec3::new(10.0, 5.0, 3.0);
        assert_eq!(occluder(&center, &radii, &phi, &x), phi);
    }

    #[test]
    fn test_occluder_keeps_normal_component_at_surface() {
        let phi = Vec3::new(3.0, -2.0, 7.0);
        let x = Vec3::new(1.0, 0.0, 0.0);
        let projected = occluder(&Vec3::zeros(), &Vec3::new(1.0, 1.0, 1.0), &phi, &x);
        assert_relative_eq!(projected.x, 3.0, epsilon = 1e-15);
        assert_eq!(projected.y, 0.0);
        assert_eq!(projected.z, 0.0);
    }

    #[test]
    fn test_occluder_degenerate_radii_pass_through() {
        let phi = Vec3::new(1.0, 2.0, 3.0);
        let radii = Vec3::new(1.0, 0.0, 1.0);
        assert_eq!(occluder(&Vec3::zeros(), &radii, &phi, &Vec3::zeros()), phi);
    }

    #[test]
    fn test_source_apply_matches_free_functions() {
        let x = Vec3::new(2.0, 1.0, -1.0);
        let phi = Vec3::new(0.5, 0.5, 0.5);
        let ring = PotentialSource::VortexRing {
            ring_radius: 5.95,
            influence_radius: 4.0,
            center: Vec3::zeros(),
            normal: Vec3::y(),
        };
        let expected = phi + vortex_ring(5.95, 4.0, &Vec3::zeros(), &Vec3::y(), &x);
        assert_eq!(ring.apply(&phi, &x), expected);
        assert_eq!(ring.kind(), "vortex_ring");
    }
}
