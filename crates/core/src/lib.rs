//! Snowgrid Core Library
//!
//! Advances a grid of independent snowpack columns through one data interval.
//! Each active column is handed, together with its two bracketing forcing
//! samples and its precipitation record, to a single-column physics kernel.
//! Columns run in parallel on a fixed-size worker pool and fail independently.
//!
//! ## Layout
//!
//! - [`config`]: site parameters and the four-level timestep schedule
//! - [`core_types`]: column state, forcing samples, precipitation records
//! - [`physics`]: site pressure from elevation, snow-cover layer initialisation
//! - [`solver`]: the kernel trait, per-column task, worker pool and grid driver
//!
//! ## Example
//!
//! ```rust
//! use snowgrid_core::solver::{run_step, KernelError, KernelStep, PhysicsKernel};
//! use snowgrid_core::{ColumnState, ForcingSample, PrecipitationInput};
//! use snowgrid_core::{OutputMode, SiteParameters, TimestepSchedule};
//!
//! struct Passive;
//!
//! impl PhysicsKernel for Passive {
//!     fn advance(&self, _: &mut ColumnState, _: &KernelStep<'_>) -> Result<(), KernelError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut columns = vec![ColumnState::new(2000.0, 0.01); 4];
//! let forcing = vec![ForcingSample::default(); 4];
//! let precip = vec![PrecipitationInput::default(); 4];
//! let schedule = TimestepSchedule::from_data_minutes(60.0, OutputMode::Data).unwrap();
//!
//! let result = run_step(
//!     &mut columns,
//!     &forcing,
//!     &forcing,
//!     &precip,
//!     &SiteParameters::default(),
//!     &schedule,
//!     2,
//!     &Passive,
//! )
//! .unwrap();
//!
//! assert!(result.is_success());
//! assert_eq!(columns[0].current_time, 3600.0);
//! ```

pub mod config;
pub mod core_types;
pub mod error;
pub mod physics;
pub mod solver;

pub use config::{
    OutputFlags, OutputMode, ParameterError, ScheduleError, SiteParameters, TimestepLevel,
    TimestepLevelId, TimestepSchedule,
};
pub use core_types::{ColumnMask, ColumnState, ForcingPair, ForcingSample, PrecipitationInput};
pub use error::{ColumnError, LayerError, StepError};
pub use physics::{initialize_layers, site_pressure, PressureError, ReferenceAtmosphere};
pub use solver::{
    run_step, ColumnOutcome, ColumnStatus, GridDriver, KernelError, KernelStep, PhysicsKernel,
    StepResult,
};
