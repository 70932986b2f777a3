//! Error types for grid passes
//!
//! A [`StepError`] rejects a whole pass before any column is touched. A
//! [`ColumnError`] is confined to one column and recorded in the pass result
//! while the other columns carry on.

use crate::config::{ParameterError, ScheduleError};
use crate::physics::PressureError;
use crate::solver::KernelError;
use thiserror::Error;

/// Failure that prevents a grid pass from starting
#[derive(Debug, Error)]
pub enum StepError {
    /// A per-column input array does not match the column count.
    #[error("{input} has {actual} entries, expected {expected}")]
    LengthMismatch {
        input: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid timestep schedule: {0}")]
    InvalidSchedule(#[from] ScheduleError),

    #[error("invalid site parameters: {0}")]
    InvalidParameters(#[from] ParameterError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Failure of a single column during a pass
///
/// The column's stored state is left exactly as it was before the pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColumnError {
    #[error("site pressure: {0}")]
    Pressure(#[from] PressureError),

    /// The layer decomposition was never derived from the bulk snow state.
    #[error("layers not initialized: {0}")]
    Uninitialized(LayerError),

    #[error("kernel: {0}")]
    Kernel(#[from] KernelError),

    /// The kernel reported success but returned inconsistent layers.
    #[error("kernel returned inconsistent layers: {0}")]
    InconsistentLayers(LayerError),
}

/// Broken layer decomposition of a column
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerError {
    #[error("layer count {0} is not 0, 1 or 2")]
    InvalidLayerCount(u32),

    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidQuantity { field: &'static str, value: f64 },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be a finite temperature above 0 K, got {value}")]
    InvalidTemperature { field: &'static str, value: f64 },

    /// Cold content is zero at or above freezing and negative below.
    #[error("{field} must not be positive, got {value}")]
    PositiveColdContent { field: &'static str, value: f64 },

    #[error("{total} = {total_value} does not match its layer sum {layer_sum}")]
    TotalMismatch {
        total: &'static str,
        total_value: f64,
        layer_sum: f64,
    },

    #[error("layer count {layer_count} disagrees with layer depths {z_s_0} m / {z_s_l} m")]
    LayerCountMismatch {
        layer_count: u32,
        z_s_0: f64,
        z_s_l: f64,
    },
}
