/*!
Foreign Symbols - the names and calling shapes extracted C code links against

Every foreign name lives in this module and forwards to [`StringIo`].
`Prims_string` is `const char *`; `Prims_nat` is a 32-bit checked integer.

A null or unterminated argument is undefined behaviour, as the calling
convention gives no way to tell a valid string from a dangling one.
Debug builds assert against null.
*/

#![allow(non_snake_case)]

use crate::error::ShimError;
use crate::shim::{Native, StringIo};
use std::alloc::{Layout, handle_alloc_error};
use std::ffi::{CStr, c_char};
use tracing::error;

/// `Prims_string` as seen by extracted code
pub type PrimsString = *const c_char;

/// `Prims_nat` as seen by extracted code
pub type PrimsNat = i32;

/// Length of `s` in bytes.
///
/// Aborts if the length does not fit `Prims_nat`, the same way extracted
/// code treats checked-integer overflow.
///
/// # Safety
/// `s` must point to a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn FStar_String_strlen(s: PrimsString) -> PrimsNat {
    debug_assert!(!s.is_null(), "FStar_String_strlen: null string");

    let len = Native::stdout().length(unsafe { CStr::from_ptr(s) });
    match PrimsNat::try_from(len) {
        Ok(n) => n,
        Err(_) => {
            error!("FStar_String_strlen: length {} overflows Prims_nat", len);
            std::process::abort()
        }
    }
}

/// Concatenate `s0` and `s1` into a newly allocated string.
///
/// The caller owns the result and releases it with `free()`.
///
/// # Safety
/// Both arguments must point to valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn FStar_String_strcat(s0: PrimsString, s1: PrimsString) -> PrimsString {
    debug_assert!(!s0.is_null(), "FStar_String_strcat: first string is null");
    debug_assert!(!s1.is_null(), "FStar_String_strcat: second string is null");

    let (s0, s1) = unsafe { (CStr::from_ptr(s0), CStr::from_ptr(s1)) };
    match Native::stdout().concatenate(s0, s1) {
        Ok(buf) => buf.into_raw(),
        Err(err @ ShimError::AllocationFailure { requested }) => {
            error!("FStar_String_strcat: {}", err);
            // There is no error channel to the caller; a null result would
            // be dereferenced by generated code.
            let layout = Layout::from_size_align(requested, 1).unwrap_or(Layout::new::<u8>());
            handle_alloc_error(layout)
        }
    }
}

/// Alias of [`FStar_String_strcat`] for the `Prims` naming convention.
///
/// # Safety
/// Same as [`FStar_String_strcat`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Prims_strcat(s0: PrimsString, s1: PrimsString) -> PrimsString {
    unsafe { FStar_String_strcat(s0, s1) }
}

/// Write `s` to standard output, with no newline.
///
/// # Safety
/// `s` must point to a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn FStar_HyperStack_IO_print_string(s: PrimsString) {
    debug_assert!(!s.is_null(), "FStar_HyperStack_IO_print_string: null string");

    Native::stdout().print(unsafe { CStr::from_ptr(s) });
}
