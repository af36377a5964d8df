/*!
Owned C String Buffer - allocated with the C allocator

Buffers handed to generated code must be releasable with `free()`, so the
storage comes from `calloc` rather than the Rust global allocator. Rust
owners never call `free` themselves: dropping a `CBuf` releases it.
*/

use crate::error::{ShimError, ShimResult};
use std::ffi::{CStr, c_char};
use std::fmt;
use std::ops::Deref;
use std::ptr::NonNull;
use tracing::debug;

/// Uniquely owned, NUL-terminated byte buffer.
///
/// Holds `capacity()` bytes; the last one is always the terminator.
pub struct CBuf {
    ptr: NonNull<c_char>,
    capacity: usize,
}

// SAFETY: `CBuf` is the only handle to its allocation and has no interior
// mutability.
unsafe impl Send for CBuf {}
unsafe impl Sync for CBuf {}

impl CBuf {
    /// Allocate a zero-initialised buffer with room for `len` bytes of
    /// content plus the terminator.
    pub fn zeroed(len: usize) -> ShimResult<Self> {
        let capacity = len
            .checked_add(1)
            .ok_or(ShimError::AllocationFailure { requested: usize::MAX })?;

        // SAFETY: calloc has no preconditions; null is handled below.
        let raw = unsafe { libc::calloc(capacity, 1) }.cast::<c_char>();
        let ptr = NonNull::new(raw).ok_or(ShimError::AllocationFailure {
            requested: capacity,
        })?;

        debug!(capacity, "allocated string buffer");
        Ok(Self { ptr, capacity })
    }

    /// Total size of the allocation, terminator included.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The content region, excluding the terminator.
    pub fn content_mut(&mut self) -> &mut [u8] {
        // SAFETY: the allocation is `capacity` bytes, initialised by calloc,
        // and we hold the only reference to it.
        unsafe {
            std::slice::from_raw_parts_mut(self.ptr.as_ptr().cast::<u8>(), self.capacity - 1)
        }
    }

    pub fn as_c_str(&self) -> &CStr {
        // SAFETY: the final byte is never exposed through `content_mut`, so
        // the buffer is always terminated within its allocation.
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }
    }

    /// Give up ownership. The caller must release the pointer with `free()`
    /// or hand it back through [`CBuf::from_raw`].
    pub fn into_raw(self) -> *mut c_char {
        let ptr = self.ptr.as_ptr();
        std::mem::forget(self);
        ptr
    }

    /// Retake ownership of a pointer produced by [`CBuf::into_raw`].
    ///
    /// # Safety
    /// `ptr` must come from `into_raw` and must not have been freed or
    /// reclaimed already. The capacity is recomputed from the terminator,
    /// so it is exact only if the content holds no interior NUL.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Self {
        // SAFETY: see the function's safety docs.
        let capacity = unsafe { CStr::from_ptr(ptr) }.to_bytes_with_nul().len();
        Self {
            // SAFETY: pointers from `into_raw` are never null.
            ptr: unsafe { NonNull::new_unchecked(ptr) },
            capacity,
        }
    }
}

impl Drop for CBuf {
    fn drop(&mut self) {
        // SAFETY: the pointer came from calloc and is freed exactly once.
        unsafe { libc::free(self.ptr.as_ptr().cast()) }
    }
}

impl Deref for CBuf {
    type Target = CStr;

    fn deref(&self) -> &CStr {
        self.as_c_str()
    }
}

impl AsRef<CStr> for CBuf {
    fn as_ref(&self) -> &CStr {
        self.as_c_str()
    }
}

impl PartialEq for CBuf {
    fn eq(&self, other: &Self) -> bool {
        self.as_c_str() == other.as_c_str()
    }
}

impl Eq for CBuf {}

impl PartialEq<CStr> for CBuf {
    fn eq(&self, other: &CStr) -> bool {
        self.as_c_str() == other
    }
}

impl PartialEq<&CStr> for CBuf {
    fn eq(&self, other: &&CStr) -> bool {
        self.as_c_str() == *other
    }
}

impl fmt::Debug for CBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CBuf({:?}, capacity={})", self.as_c_str(), self.capacity)
    }
}
