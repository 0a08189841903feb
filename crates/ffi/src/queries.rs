use rotor_flow_core::{FlowSimulation, LineVertex};
use std::ptr;

use crate::error::{DefaultRotorFlowError, RotorFlowErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, track_error, with_sim};
use crate::instance::RotorFlowInstance;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
/// One endpoint of a trail segment. Keep this layout stable for C/C++/C# consumers.
pub struct TraceVertex {
    /// World-space position.
    pub position: [f32; 3],

    /// RGBA; red at the newest trail sample, blue at the oldest.
    pub color: [f32; 4],
}

impl From<&LineVertex> for TraceVertex {
    fn from(vertex: &LineVertex) -> Self {
        Self {
            position: vertex.position,
            color: vertex.color,
        }
    }
}

#[no_mangle]
/// Return a borrowed pointer to the line list of the last completed tick.
///
/// Vertices come in pairs, one pair per trail segment, ordered by particle
/// then by trail sample. Draw them as a line list.
///
/// - Returns a borrowed pointer via `out_array`. **DO NOT FREE THIS POINTER**.
/// - The pointer is invalidated by the next call to `rotor_flow_get_vertices`
///   or `rotor_flow_destroy`. Ticks do not invalidate it.
///
/// Returns
/// - `RotorFlowErrorCode::Ok` (0) with the array in `out_array` and count in `out_len`
/// - `RotorFlowErrorCode::NullPointer` if `ptr`, `out_len`, or `out_array` is null
/// - `RotorFlowErrorCode::LockPoisoned` if an internal lock is poisoned
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by `rotor_flow_new` or null.
/// - `out_len` must be a valid, non-null pointer to a writable `usize`.
/// - `out_array` must be a valid, non-null pointer to a writable `*const TraceVertex`.
///
/// # Example Usage (C++)
/// ```cpp
/// uintptr_t len = 0;
/// const TraceVertex* vertices = nullptr;
/// if (rotor_flow_get_vertices(flow, &len, &vertices) == RotorFlowErrorCode::Ok) {
///     UploadLineList(vertices, len);
/// }
/// ```
pub unsafe extern "C" fn rotor_flow_get_vertices(
    ptr: *const RotorFlowInstance,
    out_len: *mut usize,
    out_array: *mut *const TraceVertex,
) -> RotorFlowErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultRotorFlowError::null_pointer("out_len"));
    }

    if out_array.is_null() {
        unsafe {
            *out_len = 0;
        }
        return track_error(&DefaultRotorFlowError::null_pointer("out_array"));
    }

    let result = handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let mut snapshot = instance
            .vertex_snapshot
            .lock()
            .map_err(|_| DefaultRotorFlowError::lock_poisoned("vertex_snapshot"))?;
        snapshot.clear();

        with_sim(instance, |sim| {
            snapshot.extend(sim.vertices().iter().map(TraceVertex::from));
        })?;

        unsafe {
            *out_len = snapshot.len();
            *out_array = snapshot.as_ptr();
        }

        Ok(())
    });

    if result != RotorFlowErrorCode::Ok {
        unsafe {
            *out_array = ptr::null();
            *out_len = 0;
        }
    }

    result
}

#[no_mangle]
/// Number of ticks completed since creation. Reset does not clear it.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `rotor_flow_new` or null.
/// - `out_count` must be a valid, non-null pointer to a writable `uint64_t`.
pub unsafe extern "C" fn rotor_flow_get_tick_count(
    ptr: *const RotorFlowInstance,
    out_count: *mut u64,
) -> RotorFlowErrorCode {
    if out_count.is_null() {
        return track_error(&DefaultRotorFlowError::null_pointer("out_count"));
    }

    handle_ffi_result_error(|| {
        let instance = instance_from_ptr(ptr)?;
        let count = with_sim(instance, FlowSimulation::tick_count)?;
        unsafe {
            *out_count = count;
        }
        Ok(())
    })
}
