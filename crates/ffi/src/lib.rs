//! C ABI for the snowgrid core library
//!
//! A host (typically a gridded model driver written in C or wrapped from
//! Python) owns the column records and forcing arrays. Each call to
//! [`snowgrid_run_step`] advances the active columns by one data interval
//! using a kernel callback the host supplies.
//!
//! All functions return a [`SnowGridErrorCode`]; on failure the message is
//! available from [`snowgrid_get_last_error`] on the same thread.

mod column;
mod error;
mod helpers;
mod kernel;
mod records;
mod step;

pub use column::{
    snowgrid_initialize_layers, snowgrid_schedule_from_minutes, snowgrid_site_pressure,
};
pub use error::{snowgrid_get_last_error, snowgrid_get_last_error_code, SnowGridErrorCode};
pub use kernel::{SnowKernelFn, SnowKernelStep};
pub use records::{
    SnowColumnRecord, SnowForcingArrays, SnowForcingSample, SnowPrecipArrays, SnowPrecipSample,
    SnowSiteParams, SnowTimestepRecord,
};
pub use step::snowgrid_run_step;
