use clap::{Parser, ValueEnum};
use rotor_flow_core::{Backend, ParallelTracer, TracerConfig, TracerError, TrailMode, Vec3};
use std::process::ExitCode;
use tracing::{error, info};

/// Rotor downwash particle tracer, run without a renderer
#[derive(Parser, Debug)]
#[command(name = "rotor-flow-demo")]
#[command(about = "Trace particles through a hovering rotor's downwash", long_about = None)]
struct Args {
    /// Number of ticks to run
    #[arg(short, long, default_value_t = 200)]
    ticks: u64,

    /// Rotor control radius (clamped to 0..=11.9)
    #[arg(short, long, default_value_t = 5.95)]
    control_radius: f64,

    /// Particles along x (one slab per x index)
    #[arg(long, default_value_t = 15)]
    i_count: usize,

    /// Particles along z
    #[arg(long, default_value_t = 15)]
    j_count: usize,

    /// Particles along y
    #[arg(long, default_value_t = 15)]
    k_count: usize,

    /// Samples kept per trail
    #[arg(long, default_value_t = 20)]
    trail_len: usize,

    /// Horizontal extent of the seeding box
    #[arg(long, default_value_t = 15.0)]
    width: f64,

    /// Vertical extent of the seeding box
    #[arg(long, default_value_t = 8.0)]
    height: f64,

    /// Where slab updates run
    #[arg(short, long, value_enum, default_value_t = BackendArg::Pool)]
    backend: BackendArg,

    /// How trails evolve each tick
    #[arg(short, long, value_enum, default_value_t = ModeArg::Advect)]
    mode: ModeArg,

    /// Worker pool size (defaults to one per slab)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Print statistics every N ticks
    #[arg(short, long, default_value_t = 20)]
    report_interval: u64,

    /// Also run the serial backend and check both grids match bit for bit
    #[arg(short = 'v', long)]
    compare_backends: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
    Serial,
    Rayon,
    Pool,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Serial => Backend::Serial,
            BackendArg::Rayon => Backend::Rayon,
            BackendArg::Pool => Backend::WorkerPool,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Advect,
    Retrace,
}

impl From<ModeArg> for TrailMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Advect => TrailMode::Advect,
            ModeArg::Retrace => TrailMode::Retrace,
        }
    }
}

/// Snapshot of where the trail heads are
struct HeadStats {
    mean_height: f64,
    min_height: f64,
    mean_axis_distance: f64,
    below_rotor: usize,
    total: usize,
}

impl HeadStats {
    fn collect(tracer: &ParallelTracer) -> Self {
        let layout = tracer.grid().layout();
        let mut heads: Vec<Vec3> = Vec::with_capacity(layout.particle_count());
        for i in 0..layout.i_count {
            for j in 0..layout.j_count {
                for k in 0..layout.k_count {
                    heads.push(tracer.grid().head(i, j, k));
                }
            }
        }

        let total = heads.len();
        let n = total.max(1) as f64;
        Self {
            mean_height: heads.iter().map(|p| p.y).sum::<f64>() / n,
            min_height: heads.iter().map(|p| p.y).fold(f64::INFINITY, f64::min),
            mean_axis_distance: heads.iter().map(|p| p.x.hypot(p.z)).sum::<f64>() / n,
            below_rotor: heads.iter().filter(|p| p.y < 0.0).count(),
            total,
        }
    }
}

fn build_config(args: &Args, backend: Backend) -> TracerConfig {
    let mut config = TracerConfig {
        i_count: args.i_count,
        j_count: args.j_count,
        k_count: args.k_count,
        trail_len: args.trail_len,
        tracing_width: args.width,
        tracing_height: args.height,
        backend,
        workers: args.workers,
        trail_mode: args.mode.into(),
        ..TracerConfig::default()
    };
    config.flow.control_radius = args.control_radius;
    config
}

fn run(args: &Args) -> Result<bool, TracerError> {
    let config = build_config(args, args.backend.into());
    let mut tracer = ParallelTracer::new(&config)?;

    println!("=== Rotor Downwash Tracer ===\n");
    println!(
        "Lattice: {}x{}x{} particles, {} samples per trail ({} vertices)",
        args.i_count,
        args.j_count,
        args.k_count,
        args.trail_len,
        tracer.vertices().len()
    );
    println!(
        "Backend: {:?} ({} workers), mode: {:?}, control radius: {:.2}\n",
        tracer.backend(),
        tracer.worker_count(),
        tracer.trail_mode(),
        args.control_radius
    );

    println!("  Tick | Mean y | Min y   | Axis dist | Below rotor | Tick ms");
    println!("-------|--------|---------|-----------|-------------|--------");

    let report_interval = args.report_interval.max(1);
    for _ in 0..args.ticks {
        let report = tracer.tick(args.control_radius)?;
        if report.tick % report_interval == 0 || report.tick == args.ticks {
            let stats = HeadStats::collect(&tracer);
            println!(
                "{:6} | {:6.2} | {:7.2} | {:9.3} | {:5}/{:<5} | {:6.2}",
                report.tick,
                stats.mean_height,
                stats.min_height,
                stats.mean_axis_distance,
                stats.below_rotor,
                stats.total,
                report.elapsed_ms
            );
        }
    }

    let timer = tracer.timer();
    println!("\n=== Run Complete ===");
    println!("Ticks: {}", tracer.tick_count());
    println!(
        "Tick time: last {:.2} ms, smoothed {:.2} ms over {} samples",
        timer.last_ms(),
        timer.average_ms(),
        timer.samples()
    );

    if !args.compare_backends {
        return Ok(true);
    }

    println!("\n=== Backend Comparison ===");
    let mut serial = ParallelTracer::new(&build_config(args, Backend::Serial))?;
    for _ in 0..args.ticks {
        serial.tick(args.control_radius)?;
    }

    let mismatches = serial
        .grid()
        .iter_samples()
        .zip(tracer.grid().iter_samples())
        .filter(|(a, b)| {
            a.x.to_bits() != b.x.to_bits()
                || a.y.to_bits() != b.y.to_bits()
                || a.z.to_bits() != b.z.to_bits()
        })
        .count();

    if mismatches == 0 {
        println!("  PASS: {:?} matches Serial bit for bit", tracer.backend());
        Ok(true)
    } else {
        println!(
            "  FAIL: {} samples differ between {:?} and Serial",
            mismatches,
            tracer.backend()
        );
        Ok(false)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    info!("Starting headless run: {:?}", args);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Run failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
