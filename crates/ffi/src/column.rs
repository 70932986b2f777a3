//! Column setup helpers for hosts
use crate::error::{DefaultSnowGridError, SnowGridErrorCode};
use crate::helpers::{
    handle_ffi_result_error, mut_from_ptr, ref_from_ptr, slice_from_mut_ptr, slice_from_ptr,
};
use crate::records::{
    records_from_schedule, schedule_from_records, SnowColumnRecord, SnowSiteParams,
    SnowTimestepRecord,
};
use snowgrid_core::{
    initialize_layers, site_pressure, OutputMode, SiteParameters, TimestepSchedule,
};

/// Split a column's bulk snow state into its surface and lower layers.
///
/// Reads `z_s`, `rho`, `t_s_0`, `t_s_l`, `t_s` and `h2o_sat` from `column`
/// and fills every layer field. Temperatures are kept as given and must be
/// above 0 K for the layers the snow depth produces. Run once per column on the initial conditions; an
/// active column whose layers were never derived fails the next step.
///
/// # Safety
/// `column` and `params` must be valid pointers; `tstep_info` must point to
/// four records.
#[no_mangle]
pub unsafe extern "C" fn snowgrid_initialize_layers(
    column: *mut SnowColumnRecord,
    params: *const SnowSiteParams,
    tstep_info: *const SnowTimestepRecord,
) -> SnowGridErrorCode {
    handle_ffi_result_error(|| {
        let record = unsafe { mut_from_ptr(column, "column") }?;
        let params = SiteParameters::from(unsafe { ref_from_ptr(params, "params") }?);
        let tstep_info = unsafe { slice_from_ptr(tstep_info, 4, "tstep_info") }?;
        let schedule = schedule_from_records(tstep_info)?;
        params
            .validate()
            .map_err(|e| DefaultSnowGridError::invalid_site_parameters(&e))?;

        // Layer derivation never reads the mask, so inactive columns work too
        let mut state = record.to_state();
        initialize_layers(&mut state, &params, &schedule)
            .map_err(|e| DefaultSnowGridError::invalid_parameter(format!("column: {e}")))?;
        *record = SnowColumnRecord::from_state(&state);
        Ok(())
    })
}

/// Standard-atmosphere air pressure (Pa) at `elevation_m`.
///
/// # Safety
/// `out_pressure` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn snowgrid_site_pressure(
    elevation_m: f64,
    out_pressure: *mut f64,
) -> SnowGridErrorCode {
    handle_ffi_result_error(|| {
        let out = unsafe { mut_from_ptr(out_pressure, "out_pressure") }?;
        *out = site_pressure(elevation_m).map_err(|e| DefaultSnowGridError::pressure(&e))?;
        Ok(())
    })
}

/// Fill four timestep records for a data interval of `data_minutes`.
///
/// `output_mode` is 0 (once per data interval), 1 (every normal step) or 2
/// (every step at every level).
///
/// # Safety
/// `out_tstep_info` must point to space for four records.
#[no_mangle]
pub unsafe extern "C" fn snowgrid_schedule_from_minutes(
    data_minutes: f64,
    output_mode: i32,
    out_tstep_info: *mut SnowTimestepRecord,
) -> SnowGridErrorCode {
    handle_ffi_result_error(|| {
        let out = unsafe { slice_from_mut_ptr(out_tstep_info, 4, "out_tstep_info") }?;
        let mode = match output_mode {
            0 => OutputMode::Data,
            1 => OutputMode::Normal,
            2 => OutputMode::All,
            _ => {
                return Err(DefaultSnowGridError::invalid_parameter(format!(
                    "Invalid output mode: {output_mode}. Must be 0-2"
                )));
            }
        };
        let schedule = TimestepSchedule::from_data_minutes(data_minutes, mode)
            .map_err(|e| DefaultSnowGridError::invalid_schedule(&e))?;
        out.copy_from_slice(&records_from_schedule(&schedule));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::ptr;

    fn hourly_records() -> [SnowTimestepRecord; 4] {
        let mut records = [SnowTimestepRecord::default(); 4];
        let code = unsafe { snowgrid_schedule_from_minutes(60.0, 0, records.as_mut_ptr()) };
        assert_eq!(code, SnowGridErrorCode::Ok);
        records
    }

    #[test]
    fn test_schedule_from_minutes() {
        let records = hourly_records();
        assert_eq!(records[0].time_step, 3600.0);
        assert_eq!(records[3].intervals, 15);

        let mut records = [SnowTimestepRecord::default(); 4];
        let code = unsafe { snowgrid_schedule_from_minutes(90.0, 0, records.as_mut_ptr()) };
        assert_eq!(code, SnowGridErrorCode::InvalidSchedule);
        let code = unsafe { snowgrid_schedule_from_minutes(60.0, 5, records.as_mut_ptr()) };
        assert_eq!(code, SnowGridErrorCode::InvalidParameter);
    }

    #[test]
    fn test_initialize_layers_through_records() {
        let tstep = hourly_records();
        let params = SnowSiteParams::from(&SiteParameters::default());
        let mut column = SnowColumnRecord {
            active: 1,
            elevation: 1800.0,
            z_s: 1.2,
            rho: 320.0,
            t_s_0: 267.0,
            t_s_l: 262.0,
            t_s: 266.0,
            ..Default::default()
        };

        let code = unsafe {
            snowgrid_initialize_layers(
                ptr::from_mut(&mut column),
                ptr::from_ref(&params),
                tstep.as_ptr(),
            )
        };

        assert_eq!(code, SnowGridErrorCode::Ok);
        assert_eq!(column.layer_count, 2);
        assert_eq!(column.z_s_0, 0.25);
        assert_relative_eq!(column.m_s, 384.0, max_relative = 1e-12);
        assert_eq!(column.t_s_l, 262.0);
        assert_eq!(column.t_s, 266.0);
    }

    #[test]
    fn test_initialize_layers_rejects_missing_lower_temperature() {
        let tstep = hourly_records();
        let params = SnowSiteParams::from(&SiteParameters::default());
        let mut column = SnowColumnRecord {
            active: 1,
            z_s: 1.2,
            rho: 320.0,
            t_s_0: 267.0,
            t_s: 266.0,
            ..Default::default()
        };
        let before = column;

        let code = unsafe {
            snowgrid_initialize_layers(
                ptr::from_mut(&mut column),
                ptr::from_ref(&params),
                tstep.as_ptr(),
            )
        };

        assert_eq!(code, SnowGridErrorCode::InvalidParameter);
        assert_eq!(column, before);
    }

    #[test]
    fn test_site_pressure() {
        let mut pressure = 0.0;
        let code = unsafe { snowgrid_site_pressure(0.0, ptr::from_mut(&mut pressure)) };
        assert_eq!(code, SnowGridErrorCode::Ok);
        assert_relative_eq!(pressure, snowgrid_core::physics::SEA_LEVEL);

        let code = unsafe { snowgrid_site_pressure(-5.0, ptr::from_mut(&mut pressure)) };
        assert_eq!(code, SnowGridErrorCode::InvalidParameter);
        assert!(!crate::error::snowgrid_get_last_error().is_null());

        let code = unsafe { snowgrid_site_pressure(100.0, ptr::null_mut()) };
        assert_eq!(code, SnowGridErrorCode::NullPointer);
    }
}
