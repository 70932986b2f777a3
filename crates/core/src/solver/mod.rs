//! Grid orchestration
//!
//! The core abstraction is the [`PhysicsKernel`] trait: a reentrant
//! single-column integrator supplied by the host. [`GridDriver`] owns a kernel
//! and a worker pool and advances a whole grid one data interval at a time.
//!
//! # Example
//!
//! ```rust
//! use snowgrid_core::solver::{GridDriver, KernelError, KernelStep, PhysicsKernel};
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
//! let driver = GridDriver::new(Passive, 4).unwrap();
//! let schedule = TimestepSchedule::from_data_minutes(60.0, OutputMode::Data).unwrap();
//! let mut columns = vec![ColumnState::new(1800.0, 0.01); 16];
//! let forcing = vec![ForcingSample::default(); 16];
//! let precip = vec![PrecipitationInput::default(); 16];
//!
//! for _ in 0..3 {
//!     let result = driver
//!         .run_step(&mut columns, &forcing, &forcing, &precip, &SiteParameters::default(), &schedule)
//!         .unwrap();
//!     assert_eq!(result.success_count(), 16);
//! }
//! assert_eq!(columns[15].current_time, 3.0 * 3600.0);
//! ```

mod driver;
mod executor;
mod result;
mod task;
#[allow(clippy::module_name_repetitions)]
mod r#trait;

pub use driver::{run_step, GridDriver};
pub use executor::ParallelExecutor;
pub use r#trait::{KernelError, KernelStep, PhysicsKernel};
pub use result::{ColumnOutcome, ColumnStatus, StepResult};
