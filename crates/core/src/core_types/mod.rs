//! Per-column records exchanged with the host

mod column;
mod forcing;

pub use column::{ColumnMask, ColumnState};
pub use forcing::{ForcingPair, ForcingSample, PrecipitationInput};
