//! Snowcover layer decomposition
//!
//! A host's initial conditions carry bulk depth, density and water saturation
//! plus the surface, lower and average snow temperatures. Kernels work on the
//! two-layer decomposition, so depths, masses and cold contents have to be
//! derived per layer before a column's first active step.

use super::{CAL_TO_J, FREEZE, MIN_SNOW_TEMP, RHO_ICE, RHO_W0};
use crate::config::{SiteParameters, TimestepLevelId, TimestepSchedule};
use crate::core_types::ColumnState;
use crate::error::LayerError;

/// Specific heat of ice (J/(kg·K)) at temperature `t` (K)
#[inline]
pub fn cp_ice(t: f64) -> f64 {
    CAL_TO_J * (0.024928 + 0.00176 * t) / 0.001
}

/// Cold content (J/m²) of a snow layer of mass `mass` (kg/m²) at `temp` (K)
///
/// Zero at or above freezing, negative below.
#[inline]
pub fn cold_content(temp: f64, mass: f64) -> f64 {
    if temp < FREEZE {
        cp_ice(temp) * mass * (temp - FREEZE)
    } else {
        0.0
    }
}

/// Density of the ice matrix once the liquid water volume `sat` is removed
#[inline]
pub fn dry_snow_density(rho: f64, sat: f64) -> f64 {
    (rho - sat * RHO_W0) / (1.0 - sat * RHO_W0 / RHO_ICE)
}

/// Liquid water (kg/m²) a layer of depth `depth` and dry density `rho_dry`
/// holds at volume ratio `sat`
#[inline]
pub fn h2o_left(depth: f64, rho_dry: f64, sat: f64) -> f64 {
    sat * depth * RHO_W0 * (RHO_ICE - rho_dry) / RHO_ICE
}

/// Derive the layer fields of `column` from its bulk snow properties.
///
/// Reads `z_s`, `rho`, `t_s_0`, `t_s_l`, `t_s` and `h2o_sat`. Columns whose
/// snow mass does not exceed the small timestep threshold are cleared to bare
/// ground. Shallower than `max_z_s_0` gives one layer; deeper gives a surface
/// layer of exactly `max_z_s_0` over a lower layer, unless the lower layer
/// would weigh less than the small threshold. Layer temperatures and `t_s`
/// are kept as given; a one-layer column gets the no-snow lower temperature.
/// Totals are stored as exact layer sums.
///
/// # Errors
///
/// Returns [`LayerError::InvalidQuantity`] when depth or density is negative
/// or not finite, and [`LayerError::InvalidTemperature`] when a temperature
/// the resulting layers use is not above 0 K. The column is left untouched
/// in both cases.
pub fn initialize_layers(
    column: &mut ColumnState,
    params: &SiteParameters,
    schedule: &TimestepSchedule,
) -> Result<(), LayerError> {
    for (field, value) in [("z_s", column.z_s), ("rho", column.rho)] {
        if !value.is_finite() || value < 0.0 {
            return Err(LayerError::InvalidQuantity { field, value });
        }
    }

    let threshold = schedule.level(TimestepLevelId::Small).threshold;
    let no_snow_temp = MIN_SNOW_TEMP + FREEZE;
    let rho = column.rho;
    let z_s = column.z_s;

    if rho * z_s <= threshold {
        column.layer_count = 0;
        column.z_s = 0.0;
        column.z_s_0 = 0.0;
        column.z_s_l = 0.0;
        column.rho = 0.0;
        column.m_s_0 = 0.0;
        column.m_s_l = 0.0;
        column.cc_s_0 = 0.0;
        column.cc_s_l = 0.0;
        column.t_s = no_snow_temp;
        column.t_s_0 = no_snow_temp;
        column.t_s_l = no_snow_temp;
        column.h2o_sat = 0.0;
        column.h2o = 0.0;
        column.h2o_max = 0.0;
        column.recompute_totals();
        return Ok(());
    }

    let (z_s_0, z_s_l) = if z_s < params.max_z_s_0 {
        (z_s, 0.0)
    } else {
        let lower = z_s - params.max_z_s_0;
        if lower * rho < threshold {
            (z_s, 0.0)
        } else {
            (params.max_z_s_0, lower)
        }
    };
    let two_layers = z_s_l > 0.0;

    for (field, value, used) in [
        ("t_s_0", column.t_s_0, true),
        ("t_s_l", column.t_s_l, two_layers),
        ("t_s", column.t_s, true),
    ] {
        if used && (!value.is_finite() || value <= 0.0) {
            return Err(LayerError::InvalidTemperature { field, value });
        }
    }

    column.z_s_0 = z_s_0;
    column.z_s_l = z_s_l;
    column.m_s_0 = rho * z_s_0;
    column.m_s_l = rho * z_s_l;

    column.cc_s_0 = cold_content(column.t_s_0, column.m_s_0);
    if two_layers {
        column.layer_count = 2;
        column.cc_s_l = cold_content(column.t_s_l, column.m_s_l);
    } else {
        column.layer_count = 1;
        column.t_s_l = no_snow_temp;
        column.cc_s_l = 0.0;
    }

    let h2o_vol = column.h2o_sat * params.max_h2o_vol;
    let rho_dry = dry_snow_density(rho, h2o_vol);
    column.h2o_max = h2o_left(z_s, rho_dry, params.max_h2o_vol);
    column.h2o = column.h2o_sat * column.h2o_max;

    column.recompute_totals();
    Ok(())
}
