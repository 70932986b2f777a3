//! Physical constants and the column-independent physics the driver needs
//!
//! The energy and mass balance itself lives behind
//! [`PhysicsKernel`](crate::solver::PhysicsKernel). What remains here is the
//! site air pressure handed to every kernel call and the layer decomposition
//! a host runs once on its initial conditions.

mod pressure;
mod snowcover;

pub use pressure::{hydrostatic_pressure, site_pressure, PressureError, ReferenceAtmosphere};
pub use snowcover::{cold_content, cp_ice, dry_snow_density, h2o_left, initialize_layers};

/// Universal gas constant (J / (kmol·K))
pub const RGAS: f64 = 8.31432e3;

/// Standard sea-level air pressure (Pa)
pub const SEA_LEVEL: f64 = 1.013246e5;

/// Standard sea-level air temperature (K)
pub const STD_AIRTMP: f64 = 2.88e2;

/// Standard lapse rate (K/km)
pub const STD_LAPSE: f64 = -6.5;

/// Gravitational acceleration (m/s²)
pub const GRAVITY: f64 = 9.80665;

/// Molecular weight of dry air (kg/kmol)
pub const MOL_AIR: f64 = 28.9644;

/// Freezing point of water (K)
pub const FREEZE: f64 = 273.16;

/// Density of ice (kg/m³)
pub const RHO_ICE: f64 = 917.0;

/// Density of water at 0 °C (kg/m³)
pub const RHO_W0: f64 = 1000.0;

/// Snow temperature used when there is no snow (°C)
pub const MIN_SNOW_TEMP: f64 = -75.0;

/// Thermochemical calorie (J)
pub const CAL_TO_J: f64 = 4.186798188;
