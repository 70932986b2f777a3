//! C layouts of the per-column records and run configuration
//!
//! Forcing and precipitation arrive as structure-of-arrays, one pointer per
//! variable, the way a gridded host stores them. Columns arrive as an array of
//! [`SnowColumnRecord`] that is read and written in place.

use crate::error::DefaultSnowGridError;
use crate::helpers::slice_from_ptr;
use snowgrid_core::{
    ColumnMask, ColumnState, ForcingSample, OutputFlags, PrecipitationInput, SiteParameters,
    TimestepLevel, TimestepLevelId, TimestepSchedule,
};

/// One level of the timestep schedule.
///
/// `level` is 0 (data), 1 (normal), 2 (medium) or 3 (small) and must match
/// the record's position. `output` is a bit set: 0x1 whole, 0x2 divided.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnowTimestepRecord {
    pub level: i32,
    /// Step length (s)
    pub time_step: f64,
    pub intervals: i32,
    /// Layer mass threshold (kg/m²)
    pub threshold: f64,
    pub output: i32,
}

/// Site parameters shared by every column.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnowSiteParams {
    pub z_u: f64,
    pub z_t: f64,
    pub z_g: f64,
    /// Non-zero when heights are measured from the snow surface
    pub relative_heights: i32,
    pub max_z_s_0: f64,
    pub max_h2o_vol: f64,
}

/// Full state of one column. Units as in the core library.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnowColumnRecord {
    /// Non-zero to process this column
    pub active: i32,
    pub elevation: f64,
    pub z_0: f64,
    pub z_s_0: f64,
    pub z_s_l: f64,
    pub z_s: f64,
    pub rho: f64,
    pub t_s_0: f64,
    pub t_s_l: f64,
    pub t_s: f64,
    pub h2o_sat: f64,
    pub h2o: f64,
    pub h2o_max: f64,
    pub layer_count: i32,
    pub cc_s_0: f64,
    pub cc_s_l: f64,
    pub cc_s: f64,
    pub m_s_0: f64,
    pub m_s_l: f64,
    pub m_s: f64,
    pub current_time: f64,
    pub time_since_out: f64,
}

/// Forcing at one edge of a data interval, one array of `n` values per field.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SnowForcingArrays {
    pub incoming_longwave: *const f64,
    pub air_temp: *const f64,
    pub vapor_pressure: *const f64,
    pub wind_speed: *const f64,
    pub ground_temp: *const f64,
    pub net_solar: *const f64,
}

/// Precipitation for the interval, one array of `n` values per field.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SnowPrecipArrays {
    pub precip_mass: *const f64,
    pub percent_snow: *const f64,
    pub rho_snow: *const f64,
    pub precip_temp: *const f64,
}

/// Forcing for one column, as handed to a kernel callback.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnowForcingSample {
    pub incoming_longwave: f64,
    pub air_temp: f64,
    pub vapor_pressure: f64,
    pub wind_speed: f64,
    pub ground_temp: f64,
    pub net_solar: f64,
}

/// Precipitation for one column, as handed to a kernel callback.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnowPrecipSample {
    pub precip_mass: f64,
    pub percent_snow: f64,
    pub rho_snow: f64,
    pub precip_temp: f64,
}

impl From<&SnowSiteParams> for SiteParameters {
    fn from(p: &SnowSiteParams) -> Self {
        SiteParameters {
            z_u: p.z_u,
            z_t: p.z_t,
            z_g: p.z_g,
            relative_heights: p.relative_heights != 0,
            max_z_s_0: p.max_z_s_0,
            max_h2o_vol: p.max_h2o_vol,
        }
    }
}

impl From<&SiteParameters> for SnowSiteParams {
    fn from(p: &SiteParameters) -> Self {
        SnowSiteParams {
            z_u: p.z_u,
            z_t: p.z_t,
            z_g: p.z_g,
            relative_heights: i32::from(p.relative_heights),
            max_z_s_0: p.max_z_s_0,
            max_h2o_vol: p.max_h2o_vol,
        }
    }
}

impl From<&ForcingSample> for SnowForcingSample {
    fn from(f: &ForcingSample) -> Self {
        SnowForcingSample {
            incoming_longwave: f.incoming_longwave,
            air_temp: f.air_temp,
            vapor_pressure: f.vapor_pressure,
            wind_speed: f.wind_speed,
            ground_temp: f.ground_temp,
            net_solar: f.net_solar,
        }
    }
}

impl From<&PrecipitationInput> for SnowPrecipSample {
    fn from(p: &PrecipitationInput) -> Self {
        SnowPrecipSample {
            precip_mass: p.precip_mass,
            percent_snow: p.percent_snow,
            rho_snow: p.rho_snow,
            precip_temp: p.precip_temp,
        }
    }
}

impl SnowColumnRecord {
    pub(crate) fn is_active(&self) -> bool {
        self.active != 0
    }

    pub(crate) fn to_state(&self) -> ColumnState {
        ColumnState {
            mask: ColumnMask::from_flag(self.is_active()),
            elevation: self.elevation,
            z_0: self.z_0,
            z_s_0: self.z_s_0,
            z_s_l: self.z_s_l,
            z_s: self.z_s,
            rho: self.rho,
            t_s_0: self.t_s_0,
            t_s_l: self.t_s_l,
            t_s: self.t_s,
            h2o_sat: self.h2o_sat,
            h2o: self.h2o,
            h2o_max: self.h2o_max,
            // Negative counts fail the layer check
            layer_count: u32::try_from(self.layer_count).unwrap_or(u32::MAX),
            cc_s_0: self.cc_s_0,
            cc_s_l: self.cc_s_l,
            cc_s: self.cc_s,
            m_s_0: self.m_s_0,
            m_s_l: self.m_s_l,
            m_s: self.m_s,
            current_time: self.current_time,
            time_since_out: self.time_since_out,
        }
    }

    pub(crate) fn from_state(state: &ColumnState) -> Self {
        SnowColumnRecord {
            active: i32::from(state.is_active()),
            elevation: state.elevation,
            z_0: state.z_0,
            z_s_0: state.z_s_0,
            z_s_l: state.z_s_l,
            z_s: state.z_s,
            rho: state.rho,
            t_s_0: state.t_s_0,
            t_s_l: state.t_s_l,
            t_s: state.t_s,
            h2o_sat: state.h2o_sat,
            h2o: state.h2o,
            h2o_max: state.h2o_max,
            layer_count: i32::try_from(state.layer_count).unwrap_or(i32::MAX),
            cc_s_0: state.cc_s_0,
            cc_s_l: state.cc_s_l,
            cc_s: state.cc_s,
            m_s_0: state.m_s_0,
            m_s_l: state.m_s_l,
            m_s: state.m_s,
            current_time: state.current_time,
            time_since_out: state.time_since_out,
        }
    }
}

fn level_from_record(
    position: usize,
    record: &SnowTimestepRecord,
) -> Result<TimestepLevel, DefaultSnowGridError> {
    let level = usize::try_from(record.level)
        .ok()
        .and_then(TimestepLevelId::from_index)
        .ok_or_else(|| {
            DefaultSnowGridError::invalid_parameter(format!(
                "tstep_info[{position}].level = {} is not a timestep level",
                record.level
            ))
        })?;
    let intervals = u32::try_from(record.intervals).map_err(|_| {
        DefaultSnowGridError::invalid_parameter(format!(
            "tstep_info[{position}].intervals = {} is negative",
            record.intervals
        ))
    })?;
    let output = u8::try_from(record.output)
        .ok()
        .and_then(OutputFlags::from_bits)
        .ok_or_else(|| {
            DefaultSnowGridError::invalid_parameter(format!(
                "tstep_info[{position}].output = {} is not an output flag set",
                record.output
            ))
        })?;

    Ok(TimestepLevel {
        level,
        time_step: record.time_step,
        intervals,
        threshold: record.threshold,
        output,
    })
}

/// Build and validate a schedule from four records.
pub(crate) fn schedule_from_records(
    records: &[SnowTimestepRecord],
) -> Result<TimestepSchedule, DefaultSnowGridError> {
    let [data, normal, medium, small] = records else {
        return Err(DefaultSnowGridError::invalid_parameter(format!(
            "expected 4 timestep records, got {}",
            records.len()
        )));
    };
    let levels = [
        level_from_record(0, data)?,
        level_from_record(1, normal)?,
        level_from_record(2, medium)?,
        level_from_record(3, small)?,
    ];
    TimestepSchedule::new(levels).map_err(|e| DefaultSnowGridError::invalid_schedule(&e))
}

pub(crate) fn records_from_schedule(schedule: &TimestepSchedule) -> [SnowTimestepRecord; 4] {
    schedule.levels().map(|level| SnowTimestepRecord {
        level: level.level.index() as i32,
        time_step: level.time_step,
        intervals: i32::try_from(level.intervals).unwrap_or(i32::MAX),
        threshold: level.threshold,
        output: i32::from(level.output.bits()),
    })
}

/// Gather `n` forcing samples from structure-of-arrays input.
///
/// # Safety
/// Every pointer in `arrays` must be non-null and point to `n` values.
pub(crate) unsafe fn gather_forcing(
    arrays: &SnowForcingArrays,
    n: usize,
    name: &str,
) -> Result<Vec<ForcingSample>, DefaultSnowGridError> {
    let field = |suffix: &str| format!("{name}.{suffix}");
    let incoming_longwave =
        unsafe { slice_from_ptr(arrays.incoming_longwave, n, &field("incoming_longwave")) }?;
    let air_temp = unsafe { slice_from_ptr(arrays.air_temp, n, &field("air_temp")) }?;
    let vapor_pressure =
        unsafe { slice_from_ptr(arrays.vapor_pressure, n, &field("vapor_pressure")) }?;
    let wind_speed = unsafe { slice_from_ptr(arrays.wind_speed, n, &field("wind_speed")) }?;
    let ground_temp = unsafe { slice_from_ptr(arrays.ground_temp, n, &field("ground_temp")) }?;
    let net_solar = unsafe { slice_from_ptr(arrays.net_solar, n, &field("net_solar")) }?;

    Ok((0..n)
        .map(|i| ForcingSample {
            incoming_longwave: incoming_longwave[i],
            air_temp: air_temp[i],
            vapor_pressure: vapor_pressure[i],
            wind_speed: wind_speed[i],
            ground_temp: ground_temp[i],
            net_solar: net_solar[i],
        })
        .collect())
}

/// Gather `n` precipitation records from structure-of-arrays input.
///
/// # Safety
/// Every pointer in `arrays` must be non-null and point to `n` values.
pub(crate) unsafe fn gather_precip(
    arrays: &SnowPrecipArrays,
    n: usize,
) -> Result<Vec<PrecipitationInput>, DefaultSnowGridError> {
    let precip_mass = unsafe { slice_from_ptr(arrays.precip_mass, n, "precip.precip_mass") }?;
    let percent_snow = unsafe { slice_from_ptr(arrays.percent_snow, n, "precip.percent_snow") }?;
    let rho_snow = unsafe { slice_from_ptr(arrays.rho_snow, n, "precip.rho_snow") }?;
    let precip_temp = unsafe { slice_from_ptr(arrays.precip_temp, n, "precip.precip_temp") }?;

    Ok((0..n)
        .map(|i| PrecipitationInput {
            precip_mass: precip_mass[i],
            percent_snow: percent_snow[i],
            rho_snow: rho_snow[i],
            precip_temp: precip_temp[i],
        })
        .collect())
}
