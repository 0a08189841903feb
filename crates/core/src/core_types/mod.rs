//! Core types and utilities

pub mod vec3;
pub mod vertex;

pub use vec3::{normalize_or_zero, Vec3};
pub use vertex::{trail_color, write_trail_segments, LineVertex};
