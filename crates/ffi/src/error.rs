use snowgrid_core::{ParameterError, PressureError, ScheduleError, StepError};
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// `code()` crosses the FFI boundary as the return value; `msg()` is kept in
/// thread-local storage for `snowgrid_get_last_error`.
pub(crate) trait SnowGridError {
    fn code(&self) -> SnowGridErrorCode;

    fn msg(&self) -> &str;
}

/// Error code plus diagnostic message for the common FFI failure cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultSnowGridError {
    code: SnowGridErrorCode,
    msg: String,
}

impl DefaultSnowGridError {
    /// Null pointer passed where non-null required.
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: SnowGridErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: SnowGridErrorCode::InvalidParameter,
            msg: message,
        }
    }

    pub fn invalid_schedule(error: &ScheduleError) -> Self {
        Self {
            code: SnowGridErrorCode::InvalidSchedule,
            msg: format!("Invalid timestep schedule: {error}"),
        }
    }

    pub fn invalid_site_parameters(error: &ParameterError) -> Self {
        Self {
            code: SnowGridErrorCode::InvalidParameter,
            msg: format!("Invalid site parameters: {error}"),
        }
    }

    pub fn pressure(error: &PressureError) -> Self {
        Self {
            code: SnowGridErrorCode::InvalidParameter,
            msg: format!("Cannot derive site pressure: {error}"),
        }
    }

    /// Some columns failed while the rest of the grid advanced.
    pub fn column_failures(failed: usize, active: usize, first: &str) -> Self {
        Self {
            code: SnowGridErrorCode::ColumnFailures,
            msg: format!("{failed} of {active} active columns failed; first: {first}"),
        }
    }
}

impl From<StepError> for DefaultSnowGridError {
    fn from(error: StepError) -> Self {
        match error {
            StepError::LengthMismatch { .. } => Self {
                code: SnowGridErrorCode::LengthMismatch,
                msg: error.to_string(),
            },
            StepError::InvalidSchedule(e) => Self::invalid_schedule(&e),
            StepError::InvalidParameters(e) => Self::invalid_site_parameters(&e),
            StepError::ThreadPool(e) => Self {
                code: SnowGridErrorCode::ThreadPool,
                msg: format!("Failed to build worker pool: {e}"),
            },
        }
    }
}

impl SnowGridError for DefaultSnowGridError {
    fn code(&self) -> SnowGridErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by snowgrid functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnowGridErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Null pointer passed where non-null required.
    NullPointer = 1,

    /// A per-column input array does not have `n` entries.
    LengthMismatch = 2,

    /// The four timestep records are out of order, malformed, or the data
    /// step is not positive.
    InvalidSchedule = 3,

    /// Site parameters or another scalar argument are out of range.
    InvalidParameter = 4,

    /// The worker threads could not be spawned.
    ThreadPool = 5,

    /// The pass completed but one or more columns failed and were left
    /// unchanged. See `out_failed` for which.
    ColumnFailures = 6,
}

impl From<DefaultSnowGridError> for SnowGridErrorCode {
    fn from(error: DefaultSnowGridError) -> Self {
        error.code
    }
}

thread_local! {
    /// Most recent FFI error on this thread (message, code).
    /// The `CString` is owned here so the pointer handed to C stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, SnowGridErrorCode)> = const { RefCell::new((None, SnowGridErrorCode::Ok)) };
}

pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, SnowGridErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, SnowGridErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns null if the last call on this thread succeeded.
///
/// # Lifetime
/// The returned pointer is valid until the next snowgrid call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```c
/// SnowGridErrorCode err = snowgrid_run_step(n, 4, tstep, columns, &in1, &in2,
///                                           &precip, &params, kernel, NULL,
///                                           failed, &failed_count);
/// if (err != Ok) {
///     const char* msg = snowgrid_get_last_error();
///     if (msg) fprintf(stderr, "snowgrid: %s\n", msg);
/// }
/// ```
#[no_mangle]
pub extern "C" fn snowgrid_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code on this thread.
#[no_mangle]
pub extern "C" fn snowgrid_get_last_error_code() -> SnowGridErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
