//! Physics kernel trait definition
//!
//! The grid driver knows nothing about energy or mass balance. It hands each
//! active column to a [`PhysicsKernel`] together with a [`KernelStep`]
//! describing the interval, and trusts the kernel to integrate the column
//! through the full data interval.

use crate::config::{SiteParameters, TimestepLevelId, TimestepSchedule};
use crate::core_types::{ColumnState, ForcingPair, PrecipitationInput};
use thiserror::Error;

/// Failure reported by a kernel for one column
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// The integration could not converge even at the finest level.
    #[error("no convergence at the {level} timestep")]
    DidNotConverge { level: TimestepLevelId },

    /// The kernel reached a state it cannot continue from.
    #[error("invalid snowcover state: {0}")]
    InvalidState(String),

    /// Non-zero status from an external kernel.
    #[error("kernel returned status {0}")]
    Code(i32),
}

/// Everything a kernel needs besides the column itself
///
/// Built fresh for each column on each pass. The references point at the
/// pass configuration, which no task can mutate.
#[derive(Debug, Clone, Copy)]
pub struct KernelStep<'a> {
    /// Position of the column in the host's arrays
    pub index: usize,
    /// Forcing at the start and end of the data interval
    pub forcing: ForcingPair,
    pub precip: PrecipitationInput,
    /// Whether precipitation falls this interval (`precip_mass > 0`)
    pub precip_now: bool,
    /// Air pressure at the column's elevation (Pa)
    pub air_pressure: f64,
    pub params: &'a SiteParameters,
    pub schedule: &'a TimestepSchedule,
}

/// Single-column snowpack integrator
///
/// Implementations are shared by every worker at once, so `advance` must be
/// reentrant: all per-column state lives in `column` and `step`.
///
/// On success the kernel must leave `column` with a consistent layer
/// decomposition. On failure whatever it wrote to `column` is discarded.
pub trait PhysicsKernel: Send + Sync {
    /// Integrate one column through one data interval.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError`] when the column cannot be advanced.
    fn advance(&self, column: &mut ColumnState, step: &KernelStep<'_>) -> Result<(), KernelError>;
}

impl<K: PhysicsKernel + ?Sized> PhysicsKernel for &K {
    fn advance(&self, column: &mut ColumnState, step: &KernelStep<'_>) -> Result<(), KernelError> {
        (**self).advance(column, step)
    }
}

impl<K: PhysicsKernel + ?Sized> PhysicsKernel for Box<K> {
    fn advance(&self, column: &mut ColumnState, step: &KernelStep<'_>) -> Result<(), KernelError> {
        (**self).advance(column, step)
    }
}
