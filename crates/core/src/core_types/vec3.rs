//! Vector type alias for 3D positions, potentials and velocities.

use nalgebra::Vector3;

/// Norms at or below this are treated as zero when normalizing.
pub const NORMALIZE_EPSILON: f64 = 1e-12;

/// 3D vector type for positions, vector potentials, and velocities.
///
/// This is an alias for `nalgebra::Vector3<f64>`. Double precision is used
/// throughout the field code: the curl divides potential differences by a
/// `1e-4` step, which single precision cannot resolve.
pub type Vec3 = Vector3<f64>;

/// Normalizes `v`, returning the zero vector when `v` is (nearly) zero.
#[inline]
pub fn normalize_or_zero(v: &Vec3) -> Vec3 {
    v.try_normalize(NORMALIZE_EPSILON).unwrap_or_else(Vec3::zeros)
}
