//! C ABI over [`Mandelbrot`].
//!
//! The handle returned by `mandelbrot_new` must be released with
//! `mandelbrot_free`. Calls on one handle must not overlap; the library does
//! no locking of its own. Every fallible call returns one of the
//! `MANDELBROT_*` status codes (see `include/mandelgen.h`). A panic never
//! unwinds into the caller: it is reported as `MANDELBROT_INTERNAL`, or as a
//! null handle from `mandelbrot_new`.

use std::ffi::{c_char, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use log::{error, warn};

use crate::error::{Error, Result};
use crate::Mandelbrot;

pub const MANDELBROT_OK: i32 = 0;
pub const MANDELBROT_INVALID_ARGUMENT: i32 = 1;
pub const MANDELBROT_NO_DATA: i32 = 2;
pub const MANDELBROT_WRITE_FAILED: i32 = 3;
pub const MANDELBROT_OUT_OF_MEMORY: i32 = 4;
pub const MANDELBROT_CANCELLED: i32 = 5;
pub const MANDELBROT_INTERNAL: i32 = 6;
pub const MANDELBROT_BAD_HANDLE: i32 = -1;

impl Error {
    /// Status code reported across the C ABI.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidDimensions { .. }
            | Error::InvalidIterations(_)
            | Error::InvalidViewport(_)
            | Error::UnknownPalette(_) => MANDELBROT_INVALID_ARGUMENT,
            Error::NoData => MANDELBROT_NO_DATA,
            Error::Write { .. } | Error::Encode { .. } => MANDELBROT_WRITE_FAILED,
            Error::Allocation { .. } => MANDELBROT_OUT_OF_MEMORY,
            Error::Cancelled => MANDELBROT_CANCELLED,
            Error::Shape(_)
            | Error::BandMismatch(_)
            | Error::WorkerPanicked
            | Error::Disconnected => MANDELBROT_INTERNAL,
        }
    }
}

fn guarded<F>(op: &str, f: F) -> i32
where
    F: FnOnce() -> Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => MANDELBROT_OK,
        Ok(Err(e)) => {
            warn!("{}: {}", op, e);
            e.code()
        }
        Err(_) => {
            error!("{}: panicked", op);
            MANDELBROT_INTERNAL
        }
    }
}

#[no_mangle]
pub extern "C" fn mandelbrot_new() -> *mut Mandelbrot {
    match panic::catch_unwind(Mandelbrot::new) {
        Ok(mandelbrot) => Box::into_raw(Box::new(mandelbrot)),
        Err(_) => {
            error!("mandelbrot_new: panicked");
            ptr::null_mut()
        }
    }
}

/// # Safety
///
/// `ptr` must be null or a handle from `mandelbrot_new` that has not been
/// freed.
#[no_mangle]
pub unsafe extern "C" fn mandelbrot_free(ptr: *mut Mandelbrot) {
    if ptr.is_null() {
        return;
    }
    let mandelbrot = Box::from_raw(ptr);
    if panic::catch_unwind(AssertUnwindSafe(move || drop(mandelbrot))).is_err() {
        error!("mandelbrot_free: panicked");
    }
}

/// # Safety
///
/// `ptr` must be null or a live handle from `mandelbrot_new`.
#[no_mangle]
pub unsafe extern "C" fn mandelbrot_generate(
    ptr: *mut Mandelbrot,
    width: usize,
    height: usize,
    iterations: usize,
) -> i32 {
    let mandelbrot = match ptr.as_mut() {
        Some(m) => m,
        None => return MANDELBROT_BAD_HANDLE,
    };
    guarded("mandelbrot_generate", || {
        mandelbrot.generate(width, height, iterations)
    })
}

/// # Safety
///
/// `ptr` must be null or a live handle from `mandelbrot_new`; `path` must be
/// null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn mandelbrot_save(ptr: *const Mandelbrot, path: *const c_char) -> i32 {
    let mandelbrot = match ptr.as_ref() {
        Some(m) => m,
        None => return MANDELBROT_BAD_HANDLE,
    };
    if path.is_null() {
        return MANDELBROT_BAD_HANDLE;
    }
    let path = match CStr::from_ptr(path).to_str() {
        Ok(path) => path,
        Err(e) => {
            warn!("mandelbrot_save: path is not UTF-8: {}", e);
            return MANDELBROT_BAD_HANDLE;
        }
    };
    guarded("mandelbrot_save", || mandelbrot.save(path))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_handle_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ffi.png");
        let c_path = CString::new(path.to_str().unwrap()).unwrap();

        unsafe {
            let m = mandelbrot_new();
            assert_eq!(mandelbrot_save(m, c_path.as_ptr()), MANDELBROT_NO_DATA);
            assert_eq!(
                mandelbrot_generate(m, 0, 10, 10),
                MANDELBROT_INVALID_ARGUMENT
            );
            assert_eq!(mandelbrot_generate(m, 30, 20, 25), MANDELBROT_OK);
            assert_eq!(mandelbrot_save(m, c_path.as_ptr()), MANDELBROT_OK);
            mandelbrot_free(m);
        }

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (30, 20));
    }

    #[test]
    fn test_null_arguments() {
        unsafe {
            mandelbrot_free(ptr::null_mut());
            assert_eq!(
                mandelbrot_generate(ptr::null_mut(), 10, 10, 10),
                MANDELBROT_BAD_HANDLE
            );
            let m = mandelbrot_new();
            assert_eq!(mandelbrot_save(m, ptr::null()), MANDELBROT_BAD_HANDLE);
            mandelbrot_free(m);
        }
    }

    #[test]
    fn test_panics_become_status_codes() {
        assert_eq!(guarded("ok", || Ok(())), MANDELBROT_OK);
        assert_eq!(guarded("no data", || Err(Error::NoData)), MANDELBROT_NO_DATA);
        assert_eq!(
            guarded("join", || Err(Error::BandMismatch("bands out of order"))),
            MANDELBROT_INTERNAL
        );
        assert_eq!(
            guarded("boom", || -> Result<()> { panic!("boom") }),
            MANDELBROT_INTERNAL
        );
    }

    #[test]
    fn test_write_failure_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no").join("such").join("dir.png");
        let c_path = CString::new(path.to_str().unwrap()).unwrap();
        unsafe {
            let m = mandelbrot_new();
            assert_eq!(mandelbrot_generate(m, 4, 4, 4), MANDELBROT_OK);
            assert_eq!(
                mandelbrot_save(m, c_path.as_ptr()),
                MANDELBROT_WRITE_FAILED
            );
            mandelbrot_free(m);
        }
    }
}
