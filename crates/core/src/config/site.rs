//! Site parameters shared by every column of a run

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum thickness of the active surface layer (m)
pub const DEFAULT_MAX_Z_S_0: f64 = 0.25;

/// Default maximum liquid water content of the snowcover (volume ratio)
pub const DEFAULT_MAX_H2O_VOL: f64 = 0.01;

/// Rejected site parameter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    /// A measurement height or depth is not a finite positive length.
    #[error("{name} must be finite and positive, got {value} m")]
    InvalidHeight { name: &'static str, value: f64 },

    /// The active-layer cap is not a finite positive depth.
    #[error("max_z_s_0 must be finite and positive, got {0} m")]
    InvalidMaxLayerDepth(f64),

    /// The liquid water cap is outside the open interval (0, 1).
    #[error("max_h2o_vol must lie strictly between 0 and 1, got {0}")]
    InvalidMaxWaterFraction(f64),
}

/// Measurement geometry and snowcover limits for one run
///
/// Set once before the first step and never mutated while a pass is running.
/// Missing fields fall back to the defaults when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteParameters {
    /// Height of the wind speed measurement (m)
    pub z_u: f64,
    /// Height of the air temperature and vapor pressure measurement (m)
    pub z_t: f64,
    /// Depth of the soil temperature measurement (m)
    pub z_g: f64,
    /// Heights are measured from the snow surface rather than the ground
    pub relative_heights: bool,
    /// Maximum thickness of the active surface layer (m)
    pub max_z_s_0: f64,
    /// Maximum liquid water content (volume ratio)
    pub max_h2o_vol: f64,
}

impl Default for SiteParameters {
    fn default() -> Self {
        Self {
            z_u: 5.0,
            z_t: 5.0,
            z_g: 0.5,
            relative_heights: true,
            max_z_s_0: DEFAULT_MAX_Z_S_0,
            max_h2o_vol: DEFAULT_MAX_H2O_VOL,
        }
    }
}

impl SiteParameters {
    /// Check that every field is physically meaningful.
    ///
    /// # Errors
    ///
    /// Returns the first offending field as a [`ParameterError`].
    pub fn validate(&self) -> Result<(), ParameterError> {
        for (name, value) in [("z_u", self.z_u), ("z_t", self.z_t), ("z_g", self.z_g)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ParameterError::InvalidHeight { name, value });
            }
        }

        if !self.max_z_s_0.is_finite() || self.max_z_s_0 <= 0.0 {
            return Err(ParameterError::InvalidMaxLayerDepth(self.max_z_s_0));
        }

        let open_unit = self.max_h2o_vol > 0.0 && self.max_h2o_vol < 1.0;
        if !open_unit {
            return Err(ParameterError::InvalidMaxWaterFraction(self.max_h2o_vol));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = SiteParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.max_z_s_0, 0.25);
        assert_eq!(params.max_h2o_vol, 0.01);
        assert!(params.relative_heights);
    }

    #[test]
    fn test_rejects_non_positive_height() {
        let params = SiteParameters {
            z_t: 0.0,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParameterError::InvalidHeight {
                name: "z_t",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_rejects_water_fraction_outside_unit_interval() {
        let params = SiteParameters {
            max_h2o_vol: 1.0,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParameterError::InvalidMaxWaterFraction(1.0))
        );

        let params = SiteParameters {
            max_h2o_vol: f64::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_layer_cap() {
        let params = SiteParameters {
            max_z_s_0: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParameterError::InvalidMaxLayerDepth(_))
        ));
    }
}
