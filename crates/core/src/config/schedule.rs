//! Four-level timestep schedule
//!
//! Level 0 is the data interval bracketed by two forcing samples. Levels 1-3
//! are the kernel's normal, medium and small integration steps. The grid
//! driver only reads the data level's time step; the rest is handed to the
//! kernel untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Shortest accepted data interval (minutes)
pub const MIN_DATA_TSTEP_MIN: f64 = 1.0;

/// Longest accepted data interval (minutes)
pub const MAX_DATA_TSTEP_MIN: f64 = 60.0 * 60.0;

/// Normal run timestep (minutes)
pub const DEFAULT_NORMAL_TSTEP_MIN: f64 = 60.0;

/// Medium run timestep (minutes)
pub const DEFAULT_MEDIUM_TSTEP_MIN: f64 = 15.0;

/// Small run timestep (minutes)
pub const DEFAULT_SMALL_TSTEP_MIN: f64 = 1.0;

/// Layer mass threshold for the normal run timestep (kg/m²)
pub const DEFAULT_NORMAL_THRESHOLD: f64 = 60.0;

/// Layer mass threshold for the medium run timestep (kg/m²)
pub const DEFAULT_MEDIUM_THRESHOLD: f64 = 10.0;

/// Layer mass threshold for the small run timestep (kg/m²)
pub const DEFAULT_SMALL_THRESHOLD: f64 = 1.0;

#[inline]
fn min2sec(minutes: f64) -> f64 {
    minutes * 60.0
}

/// Rejected timestep schedule
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// Data interval outside `[MIN_DATA_TSTEP_MIN, MAX_DATA_TSTEP_MIN]`.
    #[error("input data's timestep ({0} min) out of range: 1 to 3600 min")]
    DataStepOutOfRange(f64),

    /// Data interval above one hour that is not a whole number of hours.
    #[error("data timestep > 60 min must be a multiple of 60 min, got {0} min")]
    DataStepNotWholeHours(f64),

    /// A slot holds the wrong nesting level.
    #[error("schedule slot {position} holds the {found} level")]
    LevelOutOfOrder {
        position: usize,
        found: TimestepLevelId,
    },

    /// Output flags outside [`OutputFlags::ALL`].
    #[error("output flags {0:#04x} contain unknown bits")]
    UnknownOutputBits(u8),

    /// The data level cannot advance time.
    #[error("data timestep must be finite and positive, got {0} s")]
    NonPositiveDataStep(f64),
}

/// Nesting level of a schedule entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestepLevelId {
    Data = 0,
    Normal = 1,
    Medium = 2,
    Small = 3,
}

impl TimestepLevelId {
    /// All levels, outermost first
    pub const ALL: [TimestepLevelId; 4] = [Self::Data, Self::Normal, Self::Medium, Self::Small];

    /// Slot of this level in a schedule
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Level stored in the given slot, if any
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Data),
            1 => Some(Self::Normal),
            2 => Some(Self::Medium),
            3 => Some(Self::Small),
            _ => None,
        }
    }
}

impl fmt::Display for TimestepLevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Data => "data",
            Self::Normal => "normal",
            Self::Medium => "medium",
            Self::Small => "small",
        };
        f.write_str(name)
    }
}

/// When the kernel should emit output records for a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct OutputFlags(u8);

impl OutputFlags {
    pub const NONE: OutputFlags = OutputFlags(0);
    /// Output when the timestep is not divided
    pub const WHOLE: OutputFlags = OutputFlags(0x1);
    /// Output when the timestep is divided
    pub const DIVIDED: OutputFlags = OutputFlags(0x2);

    pub const ALL: OutputFlags = OutputFlags(0x3);

    /// Build from raw bits; `None` if any bit outside [`Self::ALL`] is set.
    #[inline]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::ALL.0 == 0 {
            Some(OutputFlags(bits))
        } else {
            None
        }
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn union(self, other: OutputFlags) -> Self {
        OutputFlags(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, other: OutputFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl TryFrom<u8> for OutputFlags {
    type Error = ScheduleError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::from_bits(bits).ok_or(ScheduleError::UnknownOutputBits(bits))
    }
}

impl From<OutputFlags> for u8 {
    fn from(flags: OutputFlags) -> Self {
        flags.0
    }
}

/// How often the kernel writes output records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Once per data interval
    #[default]
    Data,
    /// Every normal run timestep
    Normal,
    /// Every run timestep at every level
    All,
}

/// One level of the schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimestepLevel {
    pub level: TimestepLevelId,
    /// Length of one step at this level (s)
    pub time_step: f64,
    /// Number of these steps in one step of the enclosing level
    pub intervals: u32,
    /// Layer mass below which the kernel drops to the next finer level (kg/m²)
    pub threshold: f64,
    pub output: OutputFlags,
}

/// The data interval plus its three nested integration levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimestepSchedule {
    levels: [TimestepLevel; 4],
}

impl TimestepSchedule {
    /// Wrap four explicit levels.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`] if the levels are out of order or the data
    /// level has no positive time step.
    pub fn new(levels: [TimestepLevel; 4]) -> Result<Self, ScheduleError> {
        let schedule = Self { levels };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Build the standard schedule for a data interval given in minutes.
    ///
    /// The data interval must be between 1 minute and 60 hours, and a whole
    /// number of hours when it exceeds one hour. Each finer level uses its
    /// default step, capped at the enclosing level's step.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::DataStepOutOfRange`] or
    /// [`ScheduleError::DataStepNotWholeHours`].
    pub fn from_data_minutes(data_minutes: f64, mode: OutputMode) -> Result<Self, ScheduleError> {
        if !(MIN_DATA_TSTEP_MIN..=MAX_DATA_TSTEP_MIN).contains(&data_minutes) {
            return Err(ScheduleError::DataStepOutOfRange(data_minutes));
        }
        if data_minutes > DEFAULT_NORMAL_TSTEP_MIN && data_minutes % 60.0 != 0.0 {
            return Err(ScheduleError::DataStepNotWholeHours(data_minutes));
        }

        let normal_minutes = data_minutes.min(DEFAULT_NORMAL_TSTEP_MIN);
        let medium_minutes = normal_minutes.min(DEFAULT_MEDIUM_TSTEP_MIN);
        let small_minutes = medium_minutes.min(DEFAULT_SMALL_TSTEP_MIN);

        let mut levels = [
            TimestepLevel {
                level: TimestepLevelId::Data,
                time_step: min2sec(data_minutes),
                intervals: 1,
                threshold: 0.0,
                output: OutputFlags::NONE,
            },
            TimestepLevel {
                level: TimestepLevelId::Normal,
                time_step: min2sec(normal_minutes),
                intervals: (data_minutes / normal_minutes).round() as u32,
                threshold: DEFAULT_NORMAL_THRESHOLD,
                output: OutputFlags::NONE,
            },
            TimestepLevel {
                level: TimestepLevelId::Medium,
                time_step: min2sec(medium_minutes),
                intervals: (normal_minutes / medium_minutes).round() as u32,
                threshold: DEFAULT_MEDIUM_THRESHOLD,
                output: OutputFlags::NONE,
            },
            TimestepLevel {
                level: TimestepLevelId::Small,
                time_step: min2sec(small_minutes),
                intervals: (medium_minutes / small_minutes).round() as u32,
                threshold: DEFAULT_SMALL_THRESHOLD,
                output: OutputFlags::NONE,
            },
        ];

        match mode {
            OutputMode::Data => {
                levels[TimestepLevelId::Data.index()].output = OutputFlags::DIVIDED;
            }
            OutputMode::Normal => {
                levels[TimestepLevelId::Normal.index()].output =
                    OutputFlags::WHOLE.union(OutputFlags::DIVIDED);
            }
            OutputMode::All => {
                for id in [
                    TimestepLevelId::Normal,
                    TimestepLevelId::Medium,
                    TimestepLevelId::Small,
                ] {
                    levels[id.index()].output = OutputFlags::WHOLE;
                }
            }
        }

        Self::new(levels)
    }

    /// Check level ordering and the data time step.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::LevelOutOfOrder`] or
    /// [`ScheduleError::NonPositiveDataStep`].
    pub fn validate(&self) -> Result<(), ScheduleError> {
        for (position, (entry, expected)) in
            self.levels.iter().zip(TimestepLevelId::ALL).enumerate()
        {
            if entry.level != expected {
                return Err(ScheduleError::LevelOutOfOrder {
                    position,
                    found: entry.level,
                });
            }
        }

        let data_step = self.data_time_step();
        if !data_step.is_finite() || data_step <= 0.0 {
            return Err(ScheduleError::NonPositiveDataStep(data_step));
        }

        Ok(())
    }

    #[inline]
    pub fn level(&self, id: TimestepLevelId) -> &TimestepLevel {
        &self.levels[id.index()]
    }

    #[inline]
    pub fn levels(&self) -> &[TimestepLevel; 4] {
        &self.levels
    }

    /// Length of the data interval (s)
    #[inline]
    pub fn data_time_step(&self) -> f64 {
        self.levels[TimestepLevelId::Data.index()].time_step
    }

    /// Replace the mass threshold of one level.
    pub fn with_threshold(mut self, id: TimestepLevelId, threshold: f64) -> Self {
        self.levels[id.index()].threshold = threshold;
        self
    }
}
