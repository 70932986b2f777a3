//! Grid pass over all columns
//!
//! One call to [`GridDriver::run_step`] advances every active column by one
//! data interval. The pass validates its inputs, hands each active column to
//! a task, fans the tasks out over the worker pool, and waits for all of them
//! before returning.

use super::executor::ParallelExecutor;
use super::result::StepResult;
use super::r#trait::PhysicsKernel;
use super::task::{ColumnUpdateTask, PassContext};
use crate::config::{SiteParameters, TimestepSchedule};
use crate::core_types::{ColumnState, ForcingPair, ForcingSample, PrecipitationInput};
use crate::error::StepError;
use crate::physics::ReferenceAtmosphere;
use tracing::{debug, warn};

/// Drives a [`PhysicsKernel`] across a grid of columns
///
/// Holds the kernel and the worker pool so repeated passes reuse the same
/// threads.
pub struct GridDriver<K> {
    kernel: K,
    executor: ParallelExecutor,
    atmosphere: ReferenceAtmosphere,
}

impl<K: PhysicsKernel> GridDriver<K> {
    /// Build a driver with `worker_count` workers (values below 2 run
    /// sequentially on the calling thread).
    ///
    /// # Errors
    ///
    /// Returns [`StepError::ThreadPool`] if the workers cannot be spawned.
    pub fn new(kernel: K, worker_count: usize) -> Result<Self, StepError> {
        Ok(Self {
            kernel,
            executor: ParallelExecutor::new(worker_count)?,
            atmosphere: ReferenceAtmosphere::STANDARD,
        })
    }

    /// Use a non-standard reference atmosphere for site pressure.
    pub fn with_atmosphere(mut self, atmosphere: ReferenceAtmosphere) -> Self {
        self.atmosphere = atmosphere;
        self
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn worker_count(&self) -> usize {
        self.executor.worker_count()
    }

    pub fn atmosphere(&self) -> &ReferenceAtmosphere {
        &self.atmosphere
    }

    /// Advance every active column by one data interval.
    ///
    /// Inactive columns are not read or written. A column that fails keeps
    /// its pre-pass state, including `current_time`, and is reported in the
    /// returned [`StepResult`]; the others still advance.
    ///
    /// # Errors
    ///
    /// Returns [`StepError`] without touching any column when an input array
    /// length differs from `columns.len()`, or when the schedule or site
    /// parameters are invalid.
    pub fn run_step(
        &self,
        columns: &mut [ColumnState],
        forcing_start: &[ForcingSample],
        forcing_end: &[ForcingSample],
        precip: &[PrecipitationInput],
        params: &SiteParameters,
        schedule: &TimestepSchedule,
    ) -> Result<StepResult, StepError> {
        let n = columns.len();
        for (input, actual) in [
            ("forcing_start", forcing_start.len()),
            ("forcing_end", forcing_end.len()),
            ("precip", precip.len()),
        ] {
            if actual != n {
                return Err(StepError::LengthMismatch {
                    input,
                    expected: n,
                    actual,
                });
            }
        }
        schedule.validate()?;
        params.validate()?;

        let tasks: Vec<ColumnUpdateTask<'_>> = columns
            .iter_mut()
            .enumerate()
            .filter(|(_, column)| column.is_active())
            .map(|(index, state)| ColumnUpdateTask {
                index,
                state,
                forcing: ForcingPair::new(forcing_start[index], forcing_end[index]),
                precip: precip[index],
            })
            .collect();

        debug!(
            "Grid pass: {} columns, {} active, {} workers, dt={}s",
            n,
            tasks.len(),
            self.executor.worker_count(),
            schedule.data_time_step()
        );

        let ctx = PassContext {
            params,
            schedule,
            atmosphere: &self.atmosphere,
        };
        let kernel = &self.kernel;
        let outcomes = self.executor.run(tasks, |task| task.run(kernel, &ctx));
        let result = StepResult::new(outcomes);

        for (index, error) in result.failures() {
            warn!(column = index, error = %error, "column update failed");
        }
        debug!(
            "Grid pass complete: {} succeeded, {} failed",
            result.success_count(),
            result.failure_count()
        );

        Ok(result)
    }
}

/// Advance a grid by one data interval without keeping a driver around.
///
/// Builds a fresh worker pool for this single pass; hosts stepping many
/// intervals should hold a [`GridDriver`] instead.
///
/// # Errors
///
/// See [`GridDriver::run_step`] and [`GridDriver::new`].
#[allow(clippy::too_many_arguments)]
pub fn run_step<K: PhysicsKernel + ?Sized>(
    columns: &mut [ColumnState],
    forcing_start: &[ForcingSample],
    forcing_end: &[ForcingSample],
    precip: &[PrecipitationInput],
    params: &SiteParameters,
    schedule: &TimestepSchedule,
    worker_count: usize,
    kernel: &K,
) -> Result<StepResult, StepError> {
    GridDriver::new(kernel, worker_count)?.run_step(
        columns,
        forcing_start,
        forcing_end,
        precip,
        params,
        schedule,
    )
}
