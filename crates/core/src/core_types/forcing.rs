//! Meteorological forcing and precipitation for one data interval

use serde::{Deserialize, Serialize};

/// Forcing at one edge of a data interval
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForcingSample {
    /// Incoming thermal (longwave) radiation (W/m²)
    pub incoming_longwave: f64,
    /// Air temperature (K)
    pub air_temp: f64,
    /// Vapor pressure (Pa)
    pub vapor_pressure: f64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
    /// Soil temperature at depth `z_g` (K)
    pub ground_temp: f64,
    /// Net shortwave radiation (W/m²)
    pub net_solar: f64,
}

/// The two samples bracketing one data interval
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForcingPair {
    pub start: ForcingSample,
    pub end: ForcingSample,
}

impl ForcingPair {
    #[inline]
    pub const fn new(start: ForcingSample, end: ForcingSample) -> Self {
        Self { start, end }
    }
}

/// Precipitation falling during one data interval
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PrecipitationInput {
    /// Total precipitation mass (kg/m²)
    pub precip_mass: f64,
    /// Fraction of the mass that is snow (0-1)
    pub percent_snow: f64,
    /// Density of the new snow (kg/m³)
    pub rho_snow: f64,
    /// Precipitation temperature (K)
    pub precip_temp: f64,
}

impl PrecipitationInput {
    /// Whether any precipitation falls this interval
    #[inline]
    pub fn precip_now(&self) -> bool {
        self.precip_mass > 0.0
    }

    /// Mass falling as snow (kg/m²)
    #[inline]
    pub fn snow_mass(&self) -> f64 {
        self.precip_mass * self.percent_snow
    }

    /// Mass falling as rain (kg/m²)
    #[inline]
    pub fn rain_mass(&self) -> f64 {
        self.precip_mass - self.snow_mass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precip_now_requires_positive_mass() {
        let mut precip = PrecipitationInput::default();
        assert!(!precip.precip_now());

        precip.precip_mass = -0.5;
        assert!(!precip.precip_now());

        precip.precip_mass = f64::NAN;
        assert!(!precip.precip_now());

        precip.precip_mass = 1e-9;
        assert!(precip.precip_now());
    }

    #[test]
    fn test_mass_partition() {
        let precip = PrecipitationInput {
            precip_mass: 4.0,
            percent_snow: 0.75,
            rho_snow: 150.0,
            precip_temp: 272.0,
        };
        assert_eq!(precip.snow_mass(), 3.0);
        assert_eq!(precip.rain_mass(), 1.0);
    }
}
