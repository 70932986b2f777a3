//! Host-supplied physics kernel
//!
//! The host passes a C function pointer and an opaque `user_data` pointer.
//! Each active column is marshalled into a [`SnowColumnRecord`], handed to the
//! callback with a [`SnowKernelStep`], and read back when the callback returns
//! zero.

use crate::records::{
    records_from_schedule, SnowColumnRecord, SnowForcingSample, SnowPrecipSample, SnowSiteParams,
    SnowTimestepRecord,
};
use snowgrid_core::{ColumnState, KernelError, KernelStep, PhysicsKernel};
use std::ffi::c_void;
use std::ptr;

/// Per-call inputs handed to a kernel callback.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SnowKernelStep {
    /// Column index within the host arrays
    pub index: usize,
    pub input1: SnowForcingSample,
    pub input2: SnowForcingSample,
    pub precip: SnowPrecipSample,
    /// Non-zero when `precip.precip_mass > 0`
    pub precip_now: i32,
    /// Site air pressure (Pa)
    pub air_pressure: f64,
    pub params: SnowSiteParams,
    pub tstep_info: [SnowTimestepRecord; 4],
}

/// Single-column kernel callback.
///
/// Must advance `column` through one data interval and return 0, or return a
/// non-zero status on failure. Called concurrently from several worker
/// threads with distinct `column` pointers and the same `user_data`.
pub type SnowKernelFn = Option<
    unsafe extern "C" fn(
        column: *mut SnowColumnRecord,
        step: *const SnowKernelStep,
        user_data: *mut c_void,
    ) -> i32,
>;

type RawKernelFn =
    unsafe extern "C" fn(*mut SnowColumnRecord, *const SnowKernelStep, *mut c_void) -> i32;

/// [`PhysicsKernel`] backed by a C callback
pub(crate) struct FfiKernel {
    func: RawKernelFn,
    user_data: *mut c_void,
}

// SAFETY: `snowgrid_run_step` requires the callback to be reentrant and
// `user_data` to be safe to share across the worker threads for the whole
// call. The pointer itself is never dereferenced on the Rust side.
unsafe impl Send for FfiKernel {}
unsafe impl Sync for FfiKernel {}

impl FfiKernel {
    pub(crate) fn new(func: RawKernelFn, user_data: *mut c_void) -> Self {
        Self { func, user_data }
    }
}

impl PhysicsKernel for FfiKernel {
    fn advance(&self, column: &mut ColumnState, step: &KernelStep<'_>) -> Result<(), KernelError> {
        let mut record = SnowColumnRecord::from_state(column);
        let ffi_step = SnowKernelStep {
            index: step.index,
            input1: SnowForcingSample::from(&step.forcing.start),
            input2: SnowForcingSample::from(&step.forcing.end),
            precip: SnowPrecipSample::from(&step.precip),
            precip_now: i32::from(step.precip_now),
            air_pressure: step.air_pressure,
            params: SnowSiteParams::from(step.params),
            tstep_info: records_from_schedule(step.schedule),
        };

        let status = unsafe {
            (self.func)(
                ptr::from_mut(&mut record),
                ptr::from_ref(&ffi_step),
                self.user_data,
            )
        };
        if status != 0 {
            return Err(KernelError::Code(status));
        }

        *column = record.to_state();
        Ok(())
    }
}
