//! Run configuration
//!
//! Everything here is fixed before a grid pass starts and shared read-only by
//! every column task for the whole pass.

mod schedule;
mod site;

pub use schedule::{
    OutputFlags, OutputMode, ScheduleError, TimestepLevel, TimestepLevelId, TimestepSchedule,
    DEFAULT_MEDIUM_THRESHOLD, DEFAULT_MEDIUM_TSTEP_MIN, DEFAULT_NORMAL_THRESHOLD,
    DEFAULT_NORMAL_TSTEP_MIN, DEFAULT_SMALL_THRESHOLD, DEFAULT_SMALL_TSTEP_MIN,
    MAX_DATA_TSTEP_MIN, MIN_DATA_TSTEP_MIN,
};
pub use site::{ParameterError, SiteParameters, DEFAULT_MAX_H2O_VOL, DEFAULT_MAX_Z_S_0};
