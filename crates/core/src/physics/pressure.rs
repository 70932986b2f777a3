//! Hydrostatic air pressure from site elevation
//!
//! Standard-atmosphere integration of the hydrostatic equation: exponential
//! decay for an isothermal column, the barometric power law otherwise.

use super::{GRAVITY, MOL_AIR, RGAS, SEA_LEVEL, STD_AIRTMP, STD_LAPSE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pressure that cannot be computed for a site
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PressureError {
    /// Elevation is negative or not finite.
    #[error("elevation must be finite and non-negative, got {0} m")]
    InvalidElevation(f64),

    /// The temperature at the site height would be at or below absolute zero.
    #[error("temperature ratio at site height is not positive ({0})")]
    NonPositiveBase(f64),

    #[error("computed pressure is not physical ({0} Pa)")]
    NonPhysical(f64),
}

/// Air pressure at height `elevation_km` above the reference level.
///
/// `lapse_rate` is in K/km; a zero lapse rate selects the isothermal form.
///
/// # Errors
///
/// Returns [`PressureError`] when the elevation is negative or non-finite,
/// when the lapse rate drives the temperature below zero kelvin before the
/// site height, or when the result is not a finite positive pressure.
pub fn hydrostatic_pressure(
    sea_level_pressure: f64,
    standard_temperature: f64,
    lapse_rate: f64,
    elevation_km: f64,
    gravity: f64,
    molar_mass: f64,
) -> Result<f64, PressureError> {
    if !elevation_km.is_finite() || elevation_km < 0.0 {
        return Err(PressureError::InvalidElevation(elevation_km * 1.0e3));
    }

    let factor = if lapse_rate == 0.0 {
        (-gravity * molar_mass * elevation_km * 1.0e3 / (RGAS * standard_temperature)).exp()
    } else {
        let base = standard_temperature / (standard_temperature + lapse_rate * elevation_km);
        if base.is_nan() || base <= 0.0 {
            return Err(PressureError::NonPositiveBase(base));
        }
        base.powf(gravity * molar_mass / (RGAS * lapse_rate) * 1.0e3)
    };

    let pressure = sea_level_pressure * factor;
    if !pressure.is_finite() || pressure <= 0.0 {
        return Err(PressureError::NonPhysical(pressure));
    }
    Ok(pressure)
}

/// Reference atmosphere used to turn elevation into pressure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceAtmosphere {
    /// Pressure at the reference level (Pa)
    pub sea_level_pressure: f64,
    /// Temperature at the reference level (K)
    pub standard_temperature: f64,
    /// Temperature change with height (K/km)
    pub lapse_rate: f64,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Molar mass of air (kg/kmol)
    pub molar_mass: f64,
}

impl ReferenceAtmosphere {
    /// US standard atmosphere
    pub const STANDARD: ReferenceAtmosphere = ReferenceAtmosphere {
        sea_level_pressure: SEA_LEVEL,
        standard_temperature: STD_AIRTMP,
        lapse_rate: STD_LAPSE,
        gravity: GRAVITY,
        molar_mass: MOL_AIR,
    };

    /// Pressure at a site elevation given in metres.
    ///
    /// # Errors
    ///
    /// See [`hydrostatic_pressure`].
    pub fn pressure_at(&self, elevation_m: f64) -> Result<f64, PressureError> {
        if !elevation_m.is_finite() || elevation_m < 0.0 {
            return Err(PressureError::InvalidElevation(elevation_m));
        }
        hydrostatic_pressure(
            self.sea_level_pressure,
            self.standard_temperature,
            self.lapse_rate,
            elevation_m / 1000.0,
            self.gravity,
            self.molar_mass,
        )
    }
}

impl Default for ReferenceAtmosphere {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Standard-atmosphere pressure (Pa) at a site elevation in metres.
///
/// # Errors
///
/// See [`hydrostatic_pressure`].
pub fn site_pressure(elevation_m: f64) -> Result<f64, PressureError> {
    ReferenceAtmosphere::STANDARD.pressure_at(elevation_m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sea_level_is_exact() {
        assert_eq!(site_pressure(0.0).unwrap(), SEA_LEVEL);
    }

    #[test]
    fn test_known_elevations() {
        assert_relative_eq!(site_pressure(1000.0).unwrap(), 89_868.54, max_relative = 1e-6);
        assert_relative_eq!(site_pressure(5000.0).unwrap(), 54_000.90, max_relative = 1e-6);
        assert!(site_pressure(5000.0).unwrap() < site_pressure(1000.0).unwrap());
    }

    #[test]
    fn test_isothermal_branch() {
        let atmosphere = ReferenceAtmosphere {
            lapse_rate: 0.0,
            ..ReferenceAtmosphere::STANDARD
        };
        let scale_height = RGAS * STD_AIRTMP / (GRAVITY * MOL_AIR);
        let pressure = atmosphere.pressure_at(scale_height).unwrap();
        assert_relative_eq!(pressure, SEA_LEVEL / std::f64::consts::E, max_relative = 1e-9);
    }

    #[test]
    fn test_rejects_bad_elevation() {
        assert_eq!(site_pressure(-1.0), Err(PressureError::InvalidElevation(-1.0)));
        assert!(matches!(
            site_pressure(f64::NAN),
            Err(PressureError::InvalidElevation(_))
        ));
        assert!(site_pressure(f64::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_height_above_lapse_limit() {
        // 288 K / 6.5 K/km puts absolute zero at ~44.3 km
        assert!(matches!(
            site_pressure(50_000.0),
            Err(PressureError::NonPositiveBase(_))
        ));
    }
}
