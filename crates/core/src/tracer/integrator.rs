//! Explicit-Euler streamline integration.
//!
//! ```text
//! x' = x + dt · v(x)
//! ```
//!
//! A fixed `dt` is used per tick, independent of the wall-clock frame delta.

use serde::{Deserialize, Serialize};

use super::grid::{TraceLayout, TraceSlab};
use crate::core_types::vec3::Vec3;
use crate::field::curl::compute_velocity;
use crate::field::flow::FlowField;

/// Integration step per tick
pub const DEFAULT_DT: f64 = 0.005;

/// How a trail is updated each tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrailMode {
    /// Advance the head one step; the oldest sample drops off the tail.
    #[default]
    Advect,
    /// Start a fresh streamline from the previous head, integrating the whole
    /// trail each tick.
    Retrace,
}

/// Advances `position` one Euler step through the rotor field.
pub fn step(position: &Vec3, control_radius: f64, dt: f64) -> Vec3 {
    euler(position, &compute_velocity(position, control_radius), dt)
}

/// Non-finite results leave the particle in place.
#[inline]
fn euler(position: &Vec3, velocity: &Vec3, dt: f64) -> Vec3 {
    let next = position + velocity * dt;
    if next.iter().all(|c| c.is_finite()) {
        next
    } else {
        *position
    }
}

/// Per-tick integrator over a frozen flow field.
#[derive(Debug, Clone)]
pub struct StreamlineIntegrator {
    field: FlowField,
    dt: f64,
    mode: TrailMode,
}

impl StreamlineIntegrator {
    pub fn new(field: FlowField, dt: f64, mode: TrailMode) -> Self {
        Self { field, dt, mode }
    }

    /// Integrator over the rotor field for one control radius snapshot.
    pub fn for_control_radius(control_radius: f64, dt: f64, mode: TrailMode) -> Self {
        Self::new(FlowField::from_control_radius(control_radius), dt, mode)
    }

    pub fn field(&self) -> &FlowField {
        &self.field
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn mode(&self) -> TrailMode {
        self.mode
    }

    /// One Euler step through the frozen field.
    #[inline]
    pub fn step(&self, position: &Vec3) -> Vec3 {
        euler(position, &self.field.velocity(position), self.dt)
    }

    /// Updates one trail (tail first) for a tick.
    pub fn advance_trail(&self, trail: &mut [Vec3]) {
        let Some(&head) = trail.last() else {
            return;
        };

        match self.mode {
            TrailMode::Advect => {
                let next = self.step(&head);
                trail.copy_within(1.., 0);
                let last = trail.len() - 1;
                trail[last] = next;
            }
            TrailMode::Retrace => {
                trail[0] = head;
                for l in 1..trail.len() {
                    trail[l] = self.step(&trail[l - 1]);
                }
            }
        }
    }

    /// Updates every trail in a slab.
    pub(crate) fn advance_slab(&self, slab: &mut TraceSlab, layout: &TraceLayout) {
        for trail in slab.trails_mut(layout.trail_len) {
            self.advance_trail(trail);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracer::grid::TraceGrid;

    #[test]
    fn test_free_step_matches_integrator() {
        let x = Vec3::new(2.0, 4.0, 1.0);
        let integrator = StreamlineIntegrator::for_control_radius(7.0, DEFAULT_DT, TrailMode::Advect);
        assert_eq!(step(&x, 7.0, DEFAULT_DT), integrator.step(&x));
    }

    #[test]
    fn test_step_moves_downwards_under_rotor() {
        let x = Vec3::new(3.0, 2.0, 1.0);
        let next = step(&x, 5.95, DEFAULT_DT);
        assert!(next.y < x.y, "Downwash should push the particle down");
    }

    #[test]
    fn test_advect_shifts_trail() {
        let integrator = StreamlineIntegrator::for_control_radius(5.95, DEFAULT_DT, TrailMode::Advect);
        let mut trail: Vec<Vec3> = (0..5u32).map(|l| Vec3::new(3.0, 2.0 - 0.1 * f64::from(l), 1.0)).collect();
        let original = trail.clone();

        integrator.advance_trail(&mut trail);

        assert_eq!(trail.len(), 5);
        assert_eq!(&trail[..4], &original[1..], "Samples should shift towards the tail");
        assert_eq!(trail[4], integrator.step(&original[4]));
    }

    #[test]
    fn test_retrace_starts_from_old_head() {
        let integrator = StreamlineIntegrator::for_control_radius(5.95, DEFAULT_DT, TrailMode::Retrace);
        let mut trail = vec![Vec3::new(2.0, 4.0, 1.0); 4];
        trail[3] = Vec3::new(3.0, 2.0, 1.0);

        integrator.advance_trail(&mut trail);

        assert_eq!(trail[0], Vec3::new(3.0, 2.0, 1.0));
        for l in 1..4 {
            assert_eq!(trail[l], integrator.step(&trail[l - 1]));
        }
    }

    #[test]
    fn test_empty_and_single_sample_trails() {
        let integrator = StreamlineIntegrator::for_control_radius(5.95, DEFAULT_DT, TrailMode::Retrace);
        let mut empty: Vec<Vec3> = Vec::new();
        integrator.advance_trail(&mut empty);
        assert!(empty.is_empty());

        let mut single = vec![Vec3::new(3.0, 2.0, 1.0)];
        integrator.advance_trail(&mut single);
        assert_eq!(single[0], Vec3::new(3.0, 2.0, 1.0), "Retrace of one sample keeps the head");

        let advect = StreamlineIntegrator::for_control_radius(5.95, DEFAULT_DT, TrailMode::Advect);
        advect.advance_trail(&mut single);
        assert_eq!(single[0], advect.step(&Vec3::new(3.0, 2.0, 1.0)));
    }

    #[test]
    fn test_stationary_inside_fuselage() {
        let integrator = StreamlineIntegrator::for_control_radius(5.95, DEFAULT_DT, TrailMode::Advect);
        let inside = Vec3::new(0.0, -1.6, 0.0);
        assert_eq!(integrator.step(&inside), inside);
    }

    #[test]
    fn test_advance_slab_touches_every_trail() {
        let layout = TraceLayout {
            i_count: 2,
            j_count: 2,
            k_count: 3,
            trail_len: 4,
            ..TraceLayout::default()
        };
        let mut grid = TraceGrid::new(layout);
        let before = grid.clone();
        let integrator = StreamlineIntegrator::for_control_radius(5.95, DEFAULT_DT, TrailMode::Advect);

        integrator.advance_slab(&mut grid.slabs_mut()[1], &layout);

        assert_eq!(grid.slabs()[0], before.slabs()[0], "Other slabs must be untouched");
        for j in 0..2 {
            for k in 0..3 {
                assert_eq!(grid.get(1, j, k, 0), before.get(1, j, k, 1));
            }
        }
    }
}
