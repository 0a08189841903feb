use rotor_flow_core::FlowSimulation;
use std::ffi::CString;

use crate::error::{with_last_error_mut, DefaultRotorFlowError, RotorFlowError, RotorFlowErrorCode};
use crate::instance::RotorFlowInstance;

/// Set the thread-local error message and code.
/// Accepts any type implementing the `RotorFlowError` trait.
pub(crate) fn set_last_error(error: &impl RotorFlowError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl RotorFlowError) -> RotorFlowErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the error of a failed result and hand back its code.
pub(crate) fn track_result<T>(
    result: Result<T, DefaultRotorFlowError>,
) -> Result<T, RotorFlowErrorCode> {
    result.map_err(|e| track_error(&e))
}

/// Clear the thread-local error message and code.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = RotorFlowErrorCode::Ok;
    });
}

/// Runs an FFI body, clearing the last error on success and recording it on failure.
pub(crate) fn handle_ffi_result_error<F>(f: F) -> RotorFlowErrorCode
where
    F: FnOnce() -> Result<(), DefaultRotorFlowError>,
{
    match f() {
        Ok(()) => {
            clear_last_error();
            RotorFlowErrorCode::Ok
        }
        Err(error) => track_error(&error),
    }
}

/// Borrows the instance behind an FFI handle.
///
/// The caller guarantees `ptr` came from `rotor_flow_new` and has not been destroyed.
pub(crate) fn instance_from_ptr<'a>(
    ptr: *const RotorFlowInstance,
) -> Result<&'a RotorFlowInstance, DefaultRotorFlowError> {
    if ptr.is_null() {
        return Err(DefaultRotorFlowError::null_pointer("ptr"));
    }
    // SAFETY: non-null and, per the API contract, a live `Box::into_raw` allocation.
    Ok(unsafe { &*ptr })
}

/// Runs `f` under the simulation read lock.
pub(crate) fn with_sim<F, T>(
    instance: &RotorFlowInstance,
    f: F,
) -> Result<T, DefaultRotorFlowError>
where
    F: FnOnce(&FlowSimulation) -> T,
{
    let sim = instance
        .sim
        .read()
        .map_err(|_| DefaultRotorFlowError::lock_poisoned("sim"))?;
    Ok(f(&sim))
}

/// Runs `f` under the simulation write lock.
pub(crate) fn with_sim_mut<F, T>(
    instance: &RotorFlowInstance,
    f: F,
) -> Result<T, DefaultRotorFlowError>
where
    F: FnOnce(&mut FlowSimulation) -> T,
{
    let mut sim = instance
        .sim
        .write()
        .map_err(|_| DefaultRotorFlowError::lock_poisoned("sim"))?;
    Ok(f(&mut sim))
}
