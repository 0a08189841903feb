use rotor_flow_core::TracerError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// - `code()` - Returns the error code passed across the FFI boundary
/// - `msg()` - Returns the error message for diagnostics
pub(crate) trait RotorFlowError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> RotorFlowErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `RotorFlowError` for the failures the C API reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultRotorFlowError {
    code: RotorFlowErrorCode,
    msg: String,
}

impl DefaultRotorFlowError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: RotorFlowErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for poisoned lock.
    ///
    /// # Arguments
    /// * `lock_name` - The name of the lock that was poisoned (e.g., `"sim"`, `"vertex_snapshot"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: RotorFlowErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for settings rejected by config validation.
    pub fn invalid_settings(field: &str, reason: &str) -> Self {
        Self {
            code: RotorFlowErrorCode::InvalidSettings,
            msg: format!("Tracer setting {field}: {reason}"),
        }
    }

    /// Create error for a worker thread that failed to spawn or panicked.
    pub fn worker_failure(message: String) -> Self {
        Self {
            code: RotorFlowErrorCode::WorkerFailure,
            msg: message,
        }
    }

    /// Create error for invalid parameter.
    ///
    /// # Arguments
    /// * `message` - Description of the error
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: RotorFlowErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<TracerError> for DefaultRotorFlowError {
    fn from(error: TracerError) -> Self {
        match error {
            TracerError::InvalidConfig { field, reason } => Self::invalid_settings(field, &reason),
            other => Self::worker_failure(other.to_string()),
        }
    }
}

impl RotorFlowError for DefaultRotorFlowError {
    fn code(&self) -> RotorFlowErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by rotor flow functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotorFlowErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// Tracer settings failed validation (zero counts, non-positive box or time step).
    InvalidSettings = 3,

    /// A tracer worker could not be spawned, panicked, or the pool disconnected.
    /// The particle grid has been reseeded.
    WorkerFailure = 4,

    /// Invalid parameter passed to function.
    InvalidParameter = 5,
}

impl From<DefaultRotorFlowError> for RotorFlowErrorCode {
    fn from(error: DefaultRotorFlowError) -> Self {
        error.code
    }
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    /// The `CString` is owned here so the pointer handed to C stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, RotorFlowErrorCode)> = const { RefCell::new((None, RotorFlowErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, RotorFlowErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, RotorFlowErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if no error has occurred or the message cannot be converted to a C string.
///
/// # Thread Safety
/// Error messages are stored per-thread, so each thread sees only its own failures.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread that
/// sets or clears the error, or until the thread terminates.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// RotorFlowInstance* flow = nullptr;
/// RotorFlowErrorCode err = rotor_flow_new(rotor_flow_default_settings(), &flow);
/// if (err != RotorFlowErrorCode::Ok) {
///     const char* error = rotor_flow_get_last_error();
///     if (error) {
///         printf("Tracer creation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn rotor_flow_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `RotorFlowErrorCode::Ok` (0) if the last call on this thread succeeded.
#[no_mangle]
pub extern "C" fn rotor_flow_get_last_error_code() -> RotorFlowErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
