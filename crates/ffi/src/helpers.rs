use crate::error::{with_last_error_mut, DefaultSnowGridError, SnowGridError, SnowGridErrorCode};
use std::ffi::CString;

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl SnowGridError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Record an error in thread-local storage and return its code.
#[inline]
pub(crate) fn track_error(error: &impl SnowGridError) -> SnowGridErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = SnowGridErrorCode::Ok;
    });
}

/// Run an FFI body, translating its result into a return code and keeping
/// the thread-local error state in step with it.
pub(crate) fn handle_ffi_result_error<F>(f: F) -> SnowGridErrorCode
where
    F: FnOnce() -> Result<(), DefaultSnowGridError>,
{
    match f() {
        Ok(()) => {
            clear_last_error();
            SnowGridErrorCode::Ok
        }
        Err(error) => track_error(&error),
    }
}

/// Borrow `*ptr`, failing on null.
///
/// # Safety
/// A non-null `ptr` must point to a valid `T` that outlives `'a`.
pub(crate) unsafe fn ref_from_ptr<'a, T>(
    ptr: *const T,
    name: &str,
) -> Result<&'a T, DefaultSnowGridError> {
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultSnowGridError::null_pointer(name))
}

/// Mutably borrow `*ptr`, failing on null.
///
/// # Safety
/// A non-null `ptr` must point to a valid `T` that outlives `'a` and is not
/// aliased for that lifetime.
pub(crate) unsafe fn mut_from_ptr<'a, T>(
    ptr: *mut T,
    name: &str,
) -> Result<&'a mut T, DefaultSnowGridError> {
    unsafe { ptr.as_mut() }.ok_or_else(|| DefaultSnowGridError::null_pointer(name))
}

/// View `len` elements starting at `ptr`, failing on null.
///
/// # Safety
/// A non-null `ptr` must point to `len` initialised `T`s that outlive `'a`.
pub(crate) unsafe fn slice_from_ptr<'a, T>(
    ptr: *const T,
    len: usize,
    name: &str,
) -> Result<&'a [T], DefaultSnowGridError> {
    if ptr.is_null() {
        return Err(DefaultSnowGridError::null_pointer(name));
    }
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// Mutable view of `len` elements starting at `ptr`, failing on null.
///
/// # Safety
/// A non-null `ptr` must point to `len` initialised `T`s that outlive `'a`
/// and are not aliased for that lifetime.
pub(crate) unsafe fn slice_from_mut_ptr<'a, T>(
    ptr: *mut T,
    len: usize,
    name: &str,
) -> Result<&'a mut [T], DefaultSnowGridError> {
    if ptr.is_null() {
        return Err(DefaultSnowGridError::null_pointer(name));
    }
    Ok(unsafe { std::slice::from_raw_parts_mut(ptr, len) })
}
