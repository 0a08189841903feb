//! End-to-end particle trajectories against precomputed double-precision
//! references (50 ticks, dt = 0.005, control radius 5.95 unless noted).
//!
//! Run tests with: cargo test --test `end_to_end_trajectory`

use approx::assert_abs_diff_eq;
use rotor_flow_core::tracer::{step, StreamlineIntegrator, TraceGrid, DEFAULT_DT};
use rotor_flow_core::{Backend, FlowSimulation, TracerConfig, TrailMode, Vec3};

const TICKS: usize = 50;

fn trace(start: Vec3, control_radius: f64) -> Vec3 {
    (0..TICKS).fold(start, |p, _| step(&p, control_radius, DEFAULT_DT))
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_axis_particle_stays_on_axis() {
    let start = Vec3::new(0.0, 4.0, 0.0);
    let end = trace(start, 5.95);

    // The rotor axis is a stagnation line: only finite-difference noise moves it.
    let lateral = (end.x * end.x + end.z * end.z).sqrt();
    assert!(lateral < 1e-3, "Lateral excursion {lateral}");
    assert!(end.y <= start.y + 1e-9, "Particle moved upward to {}", end.y);
}

#[test]
fn test_off_axis_reference_trajectories() {
    let cases = [
        (
            [2.0, 4.0, 1.0],
            [1.7590911229003925, 3.597772578113181, 0.7214193694716244],
        ),
        (
            [3.0, 4.0, 0.0],
            [2.325505162044561, 3.204211189008012, -0.15391467913339452],
        ),
        (
            [2.0, 2.0, 2.0],
            [2.0061364504665207, -0.47131455822535706, 1.4038376481389596],
        ),
    ];

    for (start, expected) in cases {
        let end = trace(Vec3::from(start), 5.95);
        assert!(end.y < start[1], "Downwash should carry {start:?} down");
        assert_abs_diff_eq!(end.x, expected[0], epsilon = 1e-6);
        assert_abs_diff_eq!(end.y, expected[1], epsilon = 1e-6);
        assert_abs_diff_eq!(end.z, expected[2], epsilon = 1e-6);
    }
}

#[test]
fn test_reference_trajectory_with_inner_ring() {
    let end = trace(Vec3::new(2.0, 2.0, 2.0), 8.0);
    assert_abs_diff_eq!(end.x, 2.1785799660090563, epsilon = 1e-6);
    assert_abs_diff_eq!(end.y, 1.822815562262345, epsilon = 1e-6);
    assert_abs_diff_eq!(end.z, 1.6796820641945795, epsilon = 1e-6);
}

#[test]
fn test_advected_trail_head_follows_free_particle() {
    let integrator = StreamlineIntegrator::for_control_radius(5.95, DEFAULT_DT, TrailMode::Advect);
    let start = Vec3::new(2.0, 4.0, 1.0);
    let mut trail = vec![start; 20];
    for _ in 0..TICKS {
        integrator.advance_trail(&mut trail);
    }

    let expected = trace(start, 5.95);
    assert_eq!(trail[19], expected);
    // The oldest 20 heads remain, ending with the newest.
    assert_eq!(trail[18], (0..TICKS - 1).fold(start, |p, _| step(&p, 5.95, DEFAULT_DT)));
}

#[test]
fn test_simulation_reset_restores_lattice() {
    init_logging();
    let config = TracerConfig {
        i_count: 4,
        j_count: 4,
        k_count: 3,
        trail_len: 10,
        backend: Backend::WorkerPool,
        ..TracerConfig::default()
    };
    let lattice = TraceGrid::new(config.layout());

    let mut sim = FlowSimulation::new(&config).expect("simulation should build");
    assert_eq!(sim.tracer().grid(), &lattice);

    for _ in 0..5 {
        sim.request_step();
        sim.update(0.016).expect("update should succeed");
    }
    sim.flatten_depth();
    assert_eq!(sim.tick_count(), 5);
    assert_ne!(sim.tracer().grid(), &lattice);

    sim.reset();
    let layout = config.layout();
    for i in 0..layout.i_count {
        for j in 0..layout.j_count {
            for k in 0..layout.k_count {
                for l in 0..layout.trail_len {
                    assert_eq!(
                        sim.tracer().grid().get(i, j, k, l),
                        layout.lattice_position(i, j, k, l)
                    );
                }
            }
        }
    }
}

#[test]
fn test_simulation_head_matches_free_particle() {
    let config = TracerConfig {
        i_count: 2,
        j_count: 2,
        k_count: 2,
        trail_len: 4,
        backend: Backend::Rayon,
        ..TracerConfig::default()
    };
    let layout = config.layout();
    let mut sim = FlowSimulation::new(&config).expect("simulation should build");
    sim.set_control_radius(6.5);

    let mut expected = layout.lattice_position(1, 0, 1, layout.trail_len - 1);
    for _ in 0..10 {
        sim.request_step();
        let report = sim
            .update(0.0)
            .expect("update should succeed")
            .expect("step should tick");
        assert_eq!(report.control_radius, 6.5);
        expected = step(&expected, 6.5, DEFAULT_DT);
    }

    assert_eq!(sim.tracer().grid().head(1, 0, 1), expected);
}
