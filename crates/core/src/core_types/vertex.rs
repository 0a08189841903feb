//! Render-facing vertex layout for the particle trail line list.

use bytemuck::{Pod, Zeroable};

use super::vec3::Vec3;

/// One endpoint of a trail line segment.
///
/// Layout matches a `vec3 position; vec4 color;` vertex attribute pair so the
/// buffer can be uploaded with `bytemuck::cast_slice` without conversion.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    /// Creates a vertex, narrowing the position to `f32`.
    #[inline]
    pub fn new(position: &Vec3, color: [f32; 4]) -> Self {
        Self {
            position: [position.x as f32, position.y as f32, position.z as f32],
            color,
        }
    }
}

/// Color of sample `index` in a trail of `len` samples.
///
/// Linear gradient from blue at the tail (index 0) to red at the head.
/// A single-sample trail is all head.
#[inline]
pub fn trail_color(index: usize, len: usize) -> [f32; 4] {
    let t = if len <= 1 {
        1.0
    } else {
        index as f32 / (len - 1) as f32
    };
    [t, 0.0, 1.0 - t, 1.0]
}

/// Writes the line-list segments of one trail (tail first) into `out`.
///
/// Sample `m` emits the segment from sample `m − 1` to sample `m`, both ends
/// in sample `m`'s color. The tail emits a zero-length segment. `out` must
/// hold exactly `2 × trail.len()` vertices.
pub fn write_trail_segments(trail: &[Vec3], out: &mut [LineVertex]) {
    debug_assert_eq!(out.len(), 2 * trail.len());
    let len = trail.len();
    for (m, pair) in out.chunks_exact_mut(2).enumerate() {
        let color = trail_color(m, len);
        let start = if m == 0 { &trail[0] } else { &trail[m - 1] };
        pair[0] = LineVertex::new(start, color);
        pair[1] = LineVertex::new(&trail[m], color);
    }
}
