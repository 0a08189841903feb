use rotor_flow_core::field::FlowConfiguration;
use rotor_flow_core::{Backend, ControlHandle, FlowSimulation, TracerConfig, TrailMode};
use std::ptr;
use std::sync::{Mutex, RwLock};

use crate::error::{DefaultRotorFlowError, RotorFlowErrorCode};
use crate::helpers::{track_error, track_result};
use crate::queries::TraceVertex;

/// `backend` value: run slabs on the calling thread.
pub const ROTOR_FLOW_BACKEND_SERIAL: u8 = 0;
/// `backend` value: run slabs on the rayon global pool.
pub const ROTOR_FLOW_BACKEND_RAYON: u8 = 1;
/// `backend` value: run slabs on a persistent worker pool.
pub const ROTOR_FLOW_BACKEND_WORKER_POOL: u8 = 2;

/// `trail_mode` value: shift trails and append the advected head.
pub const ROTOR_FLOW_TRAIL_ADVECT: u8 = 0;
/// `trail_mode` value: rebuild trails from the previous head.
pub const ROTOR_FLOW_TRAIL_RETRACE: u8 = 1;

/// C-compatible tracer settings.
///
/// Start from `rotor_flow_default_settings()` and override the fields you need.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracerSettings {
    /// Particles along x; also the number of slabs.
    pub i_count: usize,
    /// Particles along z.
    pub j_count: usize,
    /// Particles along y.
    pub k_count: usize,
    /// Samples kept per trail.
    pub trail_len: usize,
    /// Horizontal extent of the seeding box.
    pub tracing_width: f64,
    /// Vertical extent of the seeding box.
    pub tracing_height: f64,
    /// Euler step per tick.
    pub dt: f64,
    /// Frame time accumulated before a tick fires (seconds).
    pub tick_interval: f64,
    /// Initial control radius, clamped to `[0, 11.9]`.
    pub control_radius: f64,
    /// One of the `ROTOR_FLOW_BACKEND_*` values.
    pub backend: u8,
    /// One of the `ROTOR_FLOW_TRAIL_*` values.
    pub trail_mode: u8,
    /// Worker pool size; 0 means one worker per slab.
    pub workers: usize,
    /// Whether the clock starts paused.
    pub start_paused: bool,
}

impl From<&TracerConfig> for TracerSettings {
    fn from(config: &TracerConfig) -> Self {
        Self {
            i_count: config.i_count,
            j_count: config.j_count,
            k_count: config.k_count,
            trail_len: config.trail_len,
            tracing_width: config.tracing_width,
            tracing_height: config.tracing_height,
            dt: config.dt,
            tick_interval: config.tick_interval,
            control_radius: config.flow.control_radius,
            backend: match config.backend {
                Backend::Serial => ROTOR_FLOW_BACKEND_SERIAL,
                Backend::Rayon => ROTOR_FLOW_BACKEND_RAYON,
                Backend::WorkerPool => ROTOR_FLOW_BACKEND_WORKER_POOL,
            },
            trail_mode: match config.trail_mode {
                TrailMode::Advect => ROTOR_FLOW_TRAIL_ADVECT,
                TrailMode::Retrace => ROTOR_FLOW_TRAIL_RETRACE,
            },
            workers: config.workers.unwrap_or(0),
            start_paused: config.start_paused,
        }
    }
}

/// Converts C settings into a core config.
///
/// Only the backend and trail mode codes are checked here; the remaining
/// fields are validated when the simulation is built.
pub(crate) fn config_from_settings(
    settings: &TracerSettings,
) -> Result<TracerConfig, DefaultRotorFlowError> {
    let backend = match settings.backend {
        ROTOR_FLOW_BACKEND_SERIAL => Backend::Serial,
        ROTOR_FLOW_BACKEND_RAYON => Backend::Rayon,
        ROTOR_FLOW_BACKEND_WORKER_POOL => Backend::WorkerPool,
        other => {
            return Err(DefaultRotorFlowError::invalid_parameter(format!(
                "Unknown backend {other}"
            )))
        }
    };
    let trail_mode = match settings.trail_mode {
        ROTOR_FLOW_TRAIL_ADVECT => TrailMode::Advect,
        ROTOR_FLOW_TRAIL_RETRACE => TrailMode::Retrace,
        other => {
            return Err(DefaultRotorFlowError::invalid_parameter(format!(
                "Unknown trail mode {other}"
            )))
        }
    };

    Ok(TracerConfig {
        i_count: settings.i_count,
        j_count: settings.j_count,
        k_count: settings.k_count,
        trail_len: settings.trail_len,
        tracing_width: settings.tracing_width,
        tracing_height: settings.tracing_height,
        dt: settings.dt,
        tick_interval: settings.tick_interval,
        backend,
        workers: (settings.workers > 0).then_some(settings.workers),
        trail_mode,
        start_paused: settings.start_paused,
        flow: FlowConfiguration {
            control_radius: settings.control_radius,
        },
    })
}

/// Default settings: a 15 × 15 × 15 lattice with 20-sample trails on the worker pool.
#[no_mangle]
pub extern "C" fn rotor_flow_default_settings() -> TracerSettings {
    TracerSettings::from(&TracerConfig::default())
}

/// The rotor flow tracer context.
///
/// # Thread Safety
/// The simulation sits behind an `RwLock`: `rotor_flow_update` and the other
/// mutating calls take the write lock; queries take the read lock. The control
/// radius is an atomic shared with the simulation, so setting or reading it
/// never waits on a running tick. Vertex reads copy into a `Mutex`-protected
/// snapshot so the returned pointer stays valid while the next tick runs.
///
/// Typical host loop (C++):
/// ```cpp
/// RotorFlowInstance* flow = nullptr;
/// if (rotor_flow_new(rotor_flow_default_settings(), &flow) != RotorFlowErrorCode::Ok) {
///     return;
/// }
///
/// void Tick(double DeltaTime) {
///     bool ticked = false;
///     rotor_flow_set_control_radius(flow, SliderValue);
///     rotor_flow_update(flow, DeltaTime, &ticked);
///     if (ticked) {
///         uintptr_t len = 0;
///         const TraceVertex* vertices = nullptr;
///         rotor_flow_get_vertices(flow, &len, &vertices);
///         UploadLineList(vertices, len);
///     }
/// }
///
/// rotor_flow_destroy(flow);
/// ```
pub struct RotorFlowInstance {
    pub(crate) sim: RwLock<FlowSimulation>,
    /// Shares the simulation's control radius outside the lock.
    pub(crate) control: ControlHandle,
    /// Reused across calls to `rotor_flow_get_vertices`.
    pub(crate) vertex_snapshot: Mutex<Vec<TraceVertex>>,
}

impl RotorFlowInstance {
    /// Creates a new instance from C settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an unknown backend or trail mode,
    /// `InvalidSettings` when validation rejects a field and `WorkerFailure`
    /// when the worker pool cannot be spawned.
    pub(crate) fn new(settings: &TracerSettings) -> Result<Box<Self>, DefaultRotorFlowError> {
        let config = config_from_settings(settings)?;
        let sim = FlowSimulation::new(&config)?;
        let capacity = sim.vertices().len();

        Ok(Box::new(Self {
            control: sim.control_handle(),
            sim: RwLock::new(sim),
            vertex_snapshot: Mutex::new(Vec::with_capacity(capacity)),
        }))
    }
}

/// Create a new tracer instance and return it via out-parameter.
///
/// Returns
/// - `RotorFlowErrorCode::Ok` (0): success, `out_instance` contains a valid pointer
/// - `RotorFlowErrorCode::NullPointer`: `out_instance` is null
/// - `RotorFlowErrorCode::InvalidParameter`: unknown backend or trail mode
/// - `RotorFlowErrorCode::InvalidSettings`: a count is zero, the lattice or
///   worker count is too large, or box size, `dt`
///   or tick interval is unusable
/// - `RotorFlowErrorCode::WorkerFailure`: the worker pool could not be spawned
///
/// On failure `out_instance` is set to null; call `rotor_flow_get_last_error()`
/// for a description.
///
/// # Safety
///
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller owns the returned instance and MUST call `rotor_flow_destroy`
///   exactly once.
#[no_mangle]
pub unsafe extern "C" fn rotor_flow_new(
    settings: TracerSettings,
    out_instance: *mut *mut RotorFlowInstance,
) -> RotorFlowErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultRotorFlowError::null_pointer("out_instance"));
    }

    match track_result(RotorFlowInstance::new(&settings)) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            RotorFlowErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Destroys an instance previously created by `rotor_flow_new`.
///
/// Joins the worker threads before returning. A null `ptr` is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `rotor_flow_new` and not freed already.
/// - The caller must not use the pointer again afterwards.
#[no_mangle]
pub unsafe extern "C" fn rotor_flow_destroy(ptr: *mut RotorFlowInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: created by `Box::into_raw` in `rotor_flow_new` and not yet freed.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}
