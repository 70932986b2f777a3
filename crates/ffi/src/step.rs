use crate::error::{DefaultSnowGridError, SnowGridErrorCode};
use crate::helpers::{handle_ffi_result_error, ref_from_ptr, slice_from_mut_ptr, slice_from_ptr};
use crate::kernel::{FfiKernel, SnowKernelFn};
use crate::records::{
    gather_forcing, gather_precip, schedule_from_records, SnowColumnRecord, SnowForcingArrays,
    SnowPrecipArrays, SnowSiteParams, SnowTimestepRecord,
};
use snowgrid_core::{ColumnState, GridDriver, SiteParameters};
use std::ffi::c_void;
use tracing::debug;

/// Advance every active column by one data interval.
///
/// Columns whose `active` flag is zero are neither read nor written. Every
/// other column is handed to `kernel` on one of `nthreads` workers; columns
/// that fail are left exactly as they were and every other active column
/// gets the kernel's output with `current_time` advanced by the data step.
///
/// # Parameters
/// - `n`: number of columns and length of every per-column array
/// - `nthreads`: worker count; 0 or 1 runs on the calling thread
/// - `tstep_info`: four timestep records, data level first
/// - `columns`: `n` column records, updated in place
/// - `input1`, `input2`: forcing at the start and end of the interval
/// - `precip`: precipitation for the interval
/// - `params`: site parameters
/// - `kernel`, `user_data`: single-column callback and its context
/// - `out_failed`: optional, receives `n` bytes, 1 for each failed column
/// - `out_failed_count`: optional, receives the number of failed columns
///
/// # Returns
/// - `Ok` when every active column succeeded
/// - `ColumnFailures` when the pass ran but some columns failed
/// - Any other code when the pass was rejected before touching a column
///
/// # Safety
/// - Every non-optional pointer must be non-null and valid for `n` elements
///   (four for `tstep_info`); `out_failed` when non-null must hold `n` bytes.
/// - `kernel` must be safe to call concurrently from several threads with
///   distinct column records and the same `user_data`.
/// - No other thread may access `columns` during the call.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn snowgrid_run_step(
    n: usize,
    nthreads: usize,
    tstep_info: *const SnowTimestepRecord,
    columns: *mut SnowColumnRecord,
    input1: *const SnowForcingArrays,
    input2: *const SnowForcingArrays,
    precip: *const SnowPrecipArrays,
    params: *const SnowSiteParams,
    kernel: SnowKernelFn,
    user_data: *mut c_void,
    out_failed: *mut u8,
    out_failed_count: *mut usize,
) -> SnowGridErrorCode {
    handle_ffi_result_error(|| {
        let Some(func) = kernel else {
            return Err(DefaultSnowGridError::null_pointer("kernel"));
        };
        let tstep_info = unsafe { slice_from_ptr(tstep_info, 4, "tstep_info") }?;
        let records = unsafe { slice_from_mut_ptr(columns, n, "columns") }?;
        let input1 = unsafe { ref_from_ptr(input1, "input1") }?;
        let input2 = unsafe { ref_from_ptr(input2, "input2") }?;
        let precip = unsafe { ref_from_ptr(precip, "precip") }?;
        let params = SiteParameters::from(unsafe { ref_from_ptr(params, "params") }?);

        let schedule = schedule_from_records(tstep_info)?;
        let forcing_start = unsafe { gather_forcing(input1, n, "input1") }?;
        let forcing_end = unsafe { gather_forcing(input2, n, "input2") }?;
        let precip = unsafe { gather_precip(precip, n) }?;

        // Inactive records are never read past their flag
        let mut states: Vec<ColumnState> = records
            .iter()
            .map(|record| {
                if record.is_active() {
                    record.to_state()
                } else {
                    ColumnState {
                        mask: snowgrid_core::ColumnMask::Inactive,
                        ..Default::default()
                    }
                }
            })
            .collect();

        let driver = GridDriver::new(FfiKernel::new(func, user_data), nthreads)?;
        let result = driver.run_step(
            &mut states,
            &forcing_start,
            &forcing_end,
            &precip,
            &params,
            &schedule,
        )?;

        for outcome in result.outcomes().iter().filter(|o| o.is_success()) {
            records[outcome.index] = SnowColumnRecord::from_state(&states[outcome.index]);
        }

        if !out_failed.is_null() {
            let flags = unsafe { std::slice::from_raw_parts_mut(out_failed, n) };
            flags.fill(0);
            for (index, _) in result.failures() {
                flags[index] = 1;
            }
        }
        if let Some(count) = unsafe { out_failed_count.as_mut() } {
            *count = result.failure_count();
        }

        debug!(
            "snowgrid_run_step: {} columns, {} active, {} failed",
            n,
            result.active_count(),
            result.failure_count()
        );

        let first = result.failures().next();
        match first {
            None => Ok(()),
            Some((index, error)) => Err(DefaultSnowGridError::column_failures(
                result.failure_count(),
                result.active_count(),
                &format!("column {index}: {error}"),
            )),
        }
    })
}
