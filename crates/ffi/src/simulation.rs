use rotor_flow_core::FlowSimulation;

use crate::error::{DefaultRotorFlowError, RotorFlowErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, track_error, with_sim_mut};
use crate::instance::RotorFlowInstance;

/// Feed one frame's wall-clock delta; runs a tick when one is due.
///
/// A tick is due once accumulated frame time passes the tick interval while
/// running, or after `rotor_flow_step`. The integration step itself is fixed,
/// so trajectories do not depend on frame rate.
///
/// Returns
/// - `RotorFlowErrorCode::Ok` (0) on success; `out_ticked` (optional) receives
///   whether a tick ran
/// - `RotorFlowErrorCode::NullPointer` if `ptr` is null
/// - `RotorFlowErrorCode::InvalidParameter` if `frame_dt` is negative or non-finite
/// - `RotorFlowErrorCode::LockPoisoned` if the simulation lock is poisoned
/// - `RotorFlowErrorCode::WorkerFailure` if a worker panicked; the particle
///   grid has been reseeded and the next update continues normally
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `rotor_flow_new` or null.
/// - `out_ticked` must be null or a valid pointer to a writable `bool`.
#[no_mangle]
pub unsafe extern "C" fn rotor_flow_update(
    ptr: *const RotorFlowInstance,
    frame_dt: f64,
    out_ticked: *mut bool,
) -> RotorFlowErrorCode {
    if !out_ticked.is_null() {
        unsafe {
            *out_ticked = false;
        }
    }

    if !frame_dt.is_finite() || frame_dt < 0.0 {
        return track_error(&DefaultRotorFlowError::invalid_parameter(format!(
            "frame_dt must be finite and non-negative, got {frame_dt}"
        )));
    }

    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let report = with_sim_mut(instance, |sim| sim.update(frame_dt))??;

        if !out_ticked.is_null() {
            unsafe {
                *out_ticked = report.is_some();
            }
        }
        Ok(())
    })
}

/// Request exactly one tick on the next `rotor_flow_update`, paused or not.
#[no_mangle]
pub extern "C" fn rotor_flow_step(ptr: *const RotorFlowInstance) -> RotorFlowErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        with_sim_mut(instance, FlowSimulation::request_step)
    })
}

/// Reseed every particle on the initial lattice.
#[no_mangle]
pub extern "C" fn rotor_flow_reset(ptr: *const RotorFlowInstance) -> RotorFlowErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        with_sim_mut(instance, FlowSimulation::reset)
    })
}

/// Play or pause accumulated-time ticking. Single steps still run while paused.
#[no_mangle]
pub extern "C" fn rotor_flow_set_running(
    ptr: *const RotorFlowInstance,
    running: bool,
) -> RotorFlowErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        with_sim_mut(instance, |sim| sim.set_running(running))
    })
}

/// Collapse every trail sample towards the `z = 0` plane.
#[no_mangle]
pub extern "C" fn rotor_flow_flatten_depth(ptr: *const RotorFlowInstance) -> RotorFlowErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        with_sim_mut(instance, FlowSimulation::flatten_depth)
    })
}

/// Set the control radius read at the start of the next tick.
///
/// Values are clamped to `[0, 11.9]`; NaN selects the base radius. The radius
/// is stored atomically outside the simulation lock, so a UI thread never
/// waits on a running tick.
#[no_mangle]
pub extern "C" fn rotor_flow_set_control_radius(
    ptr: *const RotorFlowInstance,
    control_radius: f64,
) -> RotorFlowErrorCode {
    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        instance.control.set(control_radius);
        Ok(())
    })
}

/// Read the current, clamped control radius without taking the simulation lock.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `rotor_flow_new` or null.
/// - `out_radius` must be a valid pointer to a writable `double`.
#[no_mangle]
pub unsafe extern "C" fn rotor_flow_get_control_radius(
    ptr: *const RotorFlowInstance,
    out_radius: *mut f64,
) -> RotorFlowErrorCode {
    if out_radius.is_null() {
        return track_error(&DefaultRotorFlowError::null_pointer("out_radius"));
    }

    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let radius = instance.control.get();
        unsafe {
            *out_radius = radius;
        }
        Ok(())
    })
}
