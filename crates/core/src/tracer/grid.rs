//! Particle grid storage.
//!
//! Particles sit on an `i × j × k` lattice; each owns a trail of `trail_len`
//! samples. Storage is split into one [`TraceSlab`] per outer index `i`, so a
//! slab is the unit of parallel work and no two workers ever share memory.
//!
//! Within a slab, sample `l` of particle `(j, k)` lives at
//! `((j × k_count) + k) × trail_len + l`. Sample 0 is the tail, the last
//! sample the head.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core_types::vec3::Vec3;

/// Spacing and offset constants of the seeding lattice
pub mod constants {
    /// Offset added to every lattice coordinate so no particle starts on an axis
    pub const LATTICE_OFFSET: f64 = 0.1;

    /// Vertical spacing between consecutive samples of a seeded trail
    pub const TRAIL_SEED_SPACING: f64 = 0.1;
}

/// Lattice dimensions and extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceLayout {
    /// Particles along x (outer index, one slab each)
    pub i_count: usize,
    /// Particles along z
    pub j_count: usize,
    /// Particles along y
    pub k_count: usize,
    /// Samples per trail
    pub trail_len: usize,
    /// Horizontal extent of the seeding box
    pub tracing_width: f64,
    /// Vertical extent of the seeding box
    pub tracing_height: f64,
}

impl Default for TraceLayout {
    fn default() -> Self {
        Self {
            i_count: 15,
            j_count: 15,
            k_count: 15,
            trail_len: 20,
            tracing_width: 15.0,
            tracing_height: 8.0,
        }
    }
}

impl TraceLayout {
    /// Number of particles in the grid.
    pub fn particle_count(&self) -> usize {
        self.i_count * self.j_count * self.k_count
    }

    /// Number of samples in one slab.
    pub fn slab_len(&self) -> usize {
        self.j_count * self.k_count * self.trail_len
    }

    /// Offset of sample `l` of particle `(j, k)` within a slab.
    #[inline]
    pub fn slab_index(&self, j: usize, k: usize, l: usize) -> usize {
        debug_assert!(j < self.j_count && k < self.k_count && l < self.trail_len);
        (j * self.k_count + k) * self.trail_len + l
    }

    /// Seed position of sample `l` of particle `(i, j, k)`.
    ///
    /// Each trail starts as a short vertical column, tail on top.
    pub fn lattice_position(&self, i: usize, j: usize, k: usize, l: usize) -> Vec3 {
        let w = self.tracing_width;
        let h = self.tracing_height;
        let x = w / 2.0 - i as f64 * (w / self.i_count as f64);
        let y = h / 2.0 - k as f64 * (h / self.k_count as f64)
            - constants::TRAIL_SEED_SPACING * l as f64;
        let z = w / 2.0 - j as f64 * (w / self.j_count as f64);
        Vec3::new(x, y, z).add_scalar(constants::LATTICE_OFFSET)
    }
}

/// All trails for one outer index `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSlab {
    index: usize,
    samples: Vec<Vec3>,
}

impl TraceSlab {
    fn seeded(layout: &TraceLayout, i: usize) -> Self {
        let mut slab = Self {
            index: i,
            samples: vec![Vec3::zeros(); layout.slab_len()],
        };
        slab.reseed(layout);
        slab
    }

    fn reseed(&mut self, layout: &TraceLayout) {
        let i = self.index;
        for j in 0..layout.j_count {
            for k in 0..layout.k_count {
                for l in 0..layout.trail_len {
                    self.samples[layout.slab_index(j, k, l)] = layout.lattice_position(i, j, k, l);
                }
            }
        }
    }

    /// Outer grid index of this slab.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn samples(&self) -> &[Vec3] {
        &self.samples
    }

    /// Trails of this slab, in `(j, k)` order.
    ///
    /// `trail_len` must be the validated, non-zero length the slab was seeded with.
    pub(crate) fn trails_mut(
        &mut self,
        trail_len: usize,
    ) -> std::slice::ChunksExactMut<'_, Vec3> {
        self.samples.chunks_exact_mut(trail_len)
    }

    /// Trails of this slab, in `(j, k)` order.
    pub(crate) fn trails(&self, trail_len: usize) -> std::slice::ChunksExact<'_, Vec3> {
        self.samples.chunks_exact(trail_len)
    }
}

/// The full particle grid
#[derive(Debug, Clone, PartialEq)]
pub struct TraceGrid {
    layout: TraceLayout,
    slabs: Vec<TraceSlab>,
}

impl TraceGrid {
    /// Creates a grid seeded on the lattice.
    pub fn new(layout: TraceLayout) -> Self {
        let slabs = (0..layout.i_count)
            .into_par_iter()
            .map(|i| TraceSlab::seeded(&layout, i))
            .collect();
        Self { layout, slabs }
    }

    pub fn layout(&self) -> &TraceLayout {
        &self.layout
    }

    /// Reseeds every particle on the lattice, discarding trail history.
    pub fn reset(&mut self) {
        let layout = self.layout;
        self.slabs
            .par_iter_mut()
            .for_each(|slab| slab.reseed(&layout));
    }

    /// Sample `l` of particle `(i, j, k)`.
    pub fn get(&self, i: usize, j: usize, k: usize, l: usize) -> Vec3 {
        self.slabs[i].samples[self.layout.slab_index(j, k, l)]
    }

    /// Trail of particle `(i, j, k)`, tail first.
    pub fn trail(&self, i: usize, j: usize, k: usize) -> &[Vec3] {
        let start = self.layout.slab_index(j, k, 0);
        &self.slabs[i].samples[start..start + self.layout.trail_len]
    }

    /// Head (newest sample) of particle `(i, j, k)`.
    pub fn head(&self, i: usize, j: usize, k: usize) -> Vec3 {
        self.get(i, j, k, self.layout.trail_len - 1)
    }

    pub fn slabs(&self) -> &[TraceSlab] {
        &self.slabs
    }

    pub fn slabs_mut(&mut self) -> &mut [TraceSlab] {
        &mut self.slabs
    }

    /// Moves the slabs out for processing on worker threads.
    pub(crate) fn take_slabs(&mut self) -> Vec<TraceSlab> {
        std::mem::take(&mut self.slabs)
    }

    /// Restores slabs returned by workers, ordered by outer index.
    pub(crate) fn restore_slabs(&mut self, mut slabs: Vec<TraceSlab>) {
        slabs.sort_unstable_by_key(TraceSlab::index);
        debug_assert_eq!(slabs.len(), self.layout.i_count);
        self.slabs = slabs;
    }

    /// Squashes every sample towards the `z = 0` plane for a side view.
    ///
    /// Divides `z` by the tracing width. Undone by [`TraceGrid::reset`].
    pub fn flatten_depth(&mut self) {
        let width = self.layout.tracing_width;
        self.slabs.par_iter_mut().for_each(|slab| {
            for sample in &mut slab.samples {
                sample.z /= width;
            }
        });
    }

    /// Iterates over all samples in `(i, j, k, l)` order.
    pub fn iter_samples(&self) -> impl Iterator<Item = &Vec3> {
        self.slabs.iter().flat_map(|slab| slab.samples.iter())
    }
}
