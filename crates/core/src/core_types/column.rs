//! Snowpack state of one grid column
//!
//! The host owns an array of these across many steps. A grid pass updates
//! the active entries in place and never touches the inactive ones.

use crate::error::LayerError;
use serde::{Deserialize, Serialize};

/// Relative tolerance when comparing a stored total with its layer sum
pub const LAYER_SUM_TOLERANCE: f64 = 1e-9;

/// Whether a column takes part in the current pass
///
/// Set by the host before each step; the driver only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnMask {
    #[default]
    Active,
    Inactive,
}

impl ColumnMask {
    #[inline]
    pub const fn is_active(self) -> bool {
        matches!(self, ColumnMask::Active)
    }

    #[inline]
    pub const fn from_flag(active: bool) -> Self {
        if active {
            ColumnMask::Active
        } else {
            ColumnMask::Inactive
        }
    }
}

/// Two-layer snowpack column
///
/// Depths in m, density in kg/m³, temperatures in K, masses in kg/m²,
/// cold contents in J/m², times in s. The surface layer carries the `_0`
/// suffix and the lower layer the `_l` suffix; unsuffixed fields are the
/// whole-column totals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnState {
    pub mask: ColumnMask,

    /// Site elevation (m); fixed for the lifetime of the column
    pub elevation: f64,
    /// Surface roughness length (m)
    pub z_0: f64,

    pub z_s_0: f64,
    pub z_s_l: f64,
    pub z_s: f64,

    /// Bulk snow density
    pub rho: f64,

    pub t_s_0: f64,
    pub t_s_l: f64,
    /// Average snowcover temperature
    pub t_s: f64,

    /// Liquid water saturation as a fraction of `h2o_max`
    pub h2o_sat: f64,
    /// Liquid water content (kg/m²)
    pub h2o: f64,
    /// Liquid water holding capacity (kg/m²)
    pub h2o_max: f64,

    /// Number of snow layers present (0, 1 or 2)
    pub layer_count: u32,

    pub cc_s_0: f64,
    pub cc_s_l: f64,
    pub cc_s: f64,

    pub m_s_0: f64,
    pub m_s_l: f64,
    pub m_s: f64,

    /// Simulation time at the start of the next data interval
    pub current_time: f64,
    /// Time accumulated since the kernel last wrote output
    pub time_since_out: f64,
}

impl ColumnState {
    /// Snow-free active column at the given site
    pub fn new(elevation: f64, z_0: f64) -> Self {
        Self {
            elevation,
            z_0,
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.mask.is_active()
    }

    /// Set the bulk snow properties a host reads from its initial conditions.
    ///
    /// Layer depths, masses and cold contents are left untouched; run
    /// [`initialize_layers`](crate::physics::initialize_layers) before the
    /// column's first active step.
    pub fn with_bulk_snow(
        mut self,
        z_s: f64,
        rho: f64,
        t_s_0: f64,
        t_s_l: f64,
        t_s: f64,
        h2o_sat: f64,
    ) -> Self {
        self.z_s = z_s;
        self.rho = rho;
        self.t_s_0 = t_s_0;
        self.t_s_l = t_s_l;
        self.t_s = t_s;
        self.h2o_sat = h2o_sat;
        self
    }

    /// Overwrite the depth, mass and cold content totals with their layer sums.
    pub fn recompute_totals(&mut self) {
        self.z_s = self.z_s_0 + self.z_s_l;
        self.m_s = self.m_s_0 + self.m_s_l;
        self.cc_s = self.cc_s_0 + self.cc_s_l;
    }

    /// Check that the layer decomposition is usable by a kernel.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError`] when the layer count is out of range, a depth or
    /// mass is negative or non-finite, a cold content is non-finite or
    /// positive, a total disagrees with its layer sum, the layer count
    /// disagrees with the layer depths, or a present layer has a temperature
    /// at or below 0 K.
    pub fn check_layers(&self) -> Result<(), LayerError> {
        if self.layer_count > 2 {
            return Err(LayerError::InvalidLayerCount(self.layer_count));
        }

        for (field, value) in [
            ("z_s_0", self.z_s_0),
            ("z_s_l", self.z_s_l),
            ("z_s", self.z_s),
            ("m_s_0", self.m_s_0),
            ("m_s_l", self.m_s_l),
            ("m_s", self.m_s),
            ("rho", self.rho),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LayerError::InvalidQuantity { field, value });
            }
        }

        for (field, value) in [
            ("cc_s_0", self.cc_s_0),
            ("cc_s_l", self.cc_s_l),
            ("cc_s", self.cc_s),
        ] {
            if !value.is_finite() {
                return Err(LayerError::NonFinite { field, value });
            }
            if value > 0.0 {
                return Err(LayerError::PositiveColdContent { field, value });
            }
        }

        for (total, total_value, layer_sum) in [
            ("z_s", self.z_s, self.z_s_0 + self.z_s_l),
            ("m_s", self.m_s, self.m_s_0 + self.m_s_l),
            ("cc_s", self.cc_s, self.cc_s_0 + self.cc_s_l),
        ] {
            let tolerance = LAYER_SUM_TOLERANCE * total_value.abs().max(1.0);
            if (total_value - layer_sum).abs() > tolerance {
                return Err(LayerError::TotalMismatch {
                    total,
                    total_value,
                    layer_sum,
                });
            }
        }

        let consistent = match self.layer_count {
            0 => self.z_s_0 == 0.0 && self.z_s_l == 0.0,
            1 => self.z_s_l == 0.0,
            _ => true,
        };
        if !consistent {
            return Err(LayerError::LayerCountMismatch {
                layer_count: self.layer_count,
                z_s_0: self.z_s_0,
                z_s_l: self.z_s_l,
            });
        }

        // (field, value, layers needed before the field is meaningful)
        for (field, value, needs) in [
            ("t_s_0", self.t_s_0, 1),
            ("t_s_l", self.t_s_l, 2),
            ("t_s", self.t_s, 1),
        ] {
            if self.layer_count >= needs && (!value.is_finite() || value <= 0.0) {
                return Err(LayerError::InvalidTemperature { field, value });
            }
        }

        Ok(())
    }

    /// Copy every kernel-owned field from `output`.
    ///
    /// Mask, elevation and `current_time` belong to the driver and are kept.
    pub(crate) fn absorb(&mut self, output: &ColumnState) {
        self.z_0 = output.z_0;
        self.z_s_0 = output.z_s_0;
        self.z_s_l = output.z_s_l;
        self.z_s = output.z_s;
        self.rho = output.rho;
        self.t_s_0 = output.t_s_0;
        self.t_s_l = output.t_s_l;
        self.t_s = output.t_s;
        self.h2o_sat = output.h2o_sat;
        self.h2o = output.h2o;
        self.h2o_max = output.h2o_max;
        self.layer_count = output.layer_count;
        self.cc_s_0 = output.cc_s_0;
        self.cc_s_l = output.cc_s_l;
        self.cc_s = output.cc_s;
        self.m_s_0 = output.m_s_0;
        self.m_s_l = output.m_s_l;
        self.m_s = output.m_s;
        self.time_since_out = output.time_since_out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_layer() -> ColumnState {
        ColumnState {
            layer_count: 2,
            z_s_0: 0.25,
            z_s_l: 0.5,
            z_s: 0.75,
            rho: 300.0,
            m_s_0: 75.0,
            m_s_l: 150.0,
            m_s: 225.0,
            cc_s_0: -1.0e5,
            cc_s_l: -2.0e5,
            cc_s: -3.0e5,
            t_s_0: 265.0,
            t_s_l: 268.0,
            t_s: 267.0,
            ..ColumnState::new(1500.0, 0.005)
        }
    }

    #[test]
    fn test_snow_free_column_is_consistent() {
        assert!(ColumnState::new(0.0, 0.01).check_layers().is_ok());
    }

    #[test]
    fn test_two_layer_column_is_consistent() {
        assert!(two_layer().check_layers().is_ok());
    }

    #[test]
    fn test_bulk_snow_without_layers_is_rejected() {
        let column =
            ColumnState::new(2000.0, 0.01).with_bulk_snow(1.0, 250.0, 265.0, 268.0, 267.0, 0.0);
        assert!(matches!(
            column.check_layers(),
            Err(LayerError::TotalMismatch { total: "z_s", .. })
        ));
    }

    #[test]
    fn test_layer_count_must_match_depths() {
        let mut column = two_layer();
        column.layer_count = 1;
        assert!(matches!(
            column.check_layers(),
            Err(LayerError::LayerCountMismatch { layer_count: 1, .. })
        ));

        column.layer_count = 3;
        assert_eq!(column.check_layers(), Err(LayerError::InvalidLayerCount(3)));
    }

    #[test]
    fn test_negative_mass_rejected() {
        let mut column = two_layer();
        column.m_s_l = -1.0;
        column.m_s = 74.0;
        assert!(matches!(
            column.check_layers(),
            Err(LayerError::InvalidQuantity { field: "m_s_l", .. })
        ));
    }

    #[test]
    fn test_positive_cold_content_rejected() {
        let mut column = two_layer();
        column.cc_s_l = 4.5e7;
        column.recompute_totals();
        assert!(matches!(
            column.check_layers(),
            Err(LayerError::PositiveColdContent { field: "cc_s_l", .. })
        ));
    }

    #[test]
    fn test_present_layers_need_kelvin_temperatures() {
        let mut column = two_layer();
        column.t_s_l = -89.3;
        assert!(matches!(
            column.check_layers(),
            Err(LayerError::InvalidTemperature { field: "t_s_l", .. })
        ));

        column.t_s_l = 268.0;
        column.t_s = 0.0;
        assert!(matches!(
            column.check_layers(),
            Err(LayerError::InvalidTemperature { field: "t_s", .. })
        ));

        // Unused lower-layer temperature is not checked on a one-layer column
        let mut single = two_layer();
        single.layer_count = 1;
        single.z_s_l = 0.0;
        single.m_s_l = 0.0;
        single.cc_s_l = 0.0;
        single.t_s_l = f64::NAN;
        single.recompute_totals();
        assert!(single.check_layers().is_ok());
    }

    #[test]
    fn test_recompute_totals_makes_sums_exact() {
        let mut column = two_layer();
        column.z_s_0 = 0.1;
        column.z_s_l = 0.2;
        column.recompute_totals();
        assert_eq!(column.z_s, 0.1 + 0.2);
        assert_eq!(column.m_s, column.m_s_0 + column.m_s_l);
        assert_eq!(column.cc_s, column.cc_s_0 + column.cc_s_l);
    }

    #[test]
    fn test_absorb_keeps_driver_fields() {
        let mut stored = two_layer();
        stored.current_time = 7200.0;

        let mut output = two_layer();
        output.elevation = -1.0;
        output.mask = ColumnMask::Inactive;
        output.current_time = 0.0;
        output.t_s_0 = 270.0;
        output.time_since_out = 3600.0;

        stored.absorb(&output);

        assert_eq!(stored.elevation, 1500.0);
        assert_eq!(stored.mask, ColumnMask::Active);
        assert_eq!(stored.current_time, 7200.0);
        assert_eq!(stored.t_s_0, 270.0);
        assert_eq!(stored.time_since_out, 3600.0);
    }
}
