/*!
String/IO Shim - the capability interface behind the foreign symbols

Every operation is a function of its arguments; nothing is retained
between calls. No synchronisation is added here: concurrent callers rely
on the C allocator and on `std::io::Stdout` being safe to call from
several threads, and output from concurrent `print`s may interleave.
*/

use crate::buffer::CBuf;
use crate::error::{ShimError, ShimResult};
use std::ffi::CStr;
use std::io::{self, Write};
use tracing::warn;

/// The three primitives extracted code expects from its host.
pub trait StringIo {
    /// Number of bytes before the terminator.
    fn length(&self, s: &CStr) -> usize;

    /// A new owned string holding `s0` followed by `s1`.
    fn concatenate(&self, s0: &CStr, s1: &CStr) -> ShimResult<CBuf>;

    /// Emit the bytes of `s`, nothing more.
    fn print(&mut self, s: &CStr);
}

/// Native implementation writing to any output sink.
#[derive(Debug)]
pub struct Native<W> {
    out: W,
}

impl Native<io::Stdout> {
    /// The instance used at the foreign boundary.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Native<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StringIo for Native<W> {
    fn length(&self, s: &CStr) -> usize {
        s.count_bytes()
    }

    fn concatenate(&self, s0: &CStr, s1: &CStr) -> ShimResult<CBuf> {
        let (a, b) = (s0.to_bytes(), s1.to_bytes());
        let len = a
            .len()
            .checked_add(b.len())
            .ok_or(ShimError::AllocationFailure { requested: usize::MAX })?;

        let mut buf = CBuf::zeroed(len)?;
        let (head, tail) = buf.content_mut().split_at_mut(a.len());
        head.copy_from_slice(a);
        tail.copy_from_slice(b);
        Ok(buf)
    }

    fn print(&mut self, s: &CStr) {
        // The host's main is foreign, so Rust's stdout buffer may never be
        // flushed at exit unless we do it here.
        let written = self
            .out
            .write_all(s.to_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            warn!("print_string: failed to write to output: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::ffi::CString;
    use tracing_test::traced_test;

    fn shim() -> Native<Vec<u8>> {
        Native::new(Vec::new())
    }

    fn c_string(s: &str) -> CString {
        CString::new(s.replace('\0', "")).unwrap()
    }

    #[test]
    fn test_length() {
        assert_eq!(shim().length(c"hello"), 5);
    }

    #[test]
    fn test_length_empty() {
        assert_eq!(shim().length(c""), 0);
    }

    #[test]
    fn test_length_counts_bytes() {
        // "héllo" is six bytes in UTF-8
        assert_eq!(shim().length(c"h\xc3\xa9llo"), 6);
    }

    #[test]
    fn test_concatenate() {
        let result = shim().concatenate(c"foo", c"bar").unwrap();
        assert_eq!(result, c"foobar");
        assert_eq!(result.capacity(), 7);
    }

    #[test]
    fn test_concatenate_empty() {
        let result = shim().concatenate(c"", c"").unwrap();
        assert_eq!(result, c"");
        assert_eq!(result.capacity(), 1);
    }

    #[test]
    fn test_concatenate_preserves_order() {
        let shim = shim();
        assert_eq!(shim.concatenate(c"bar", c"foo").unwrap(), c"barfoo");
        assert_ne!(
            shim.concatenate(c"ab", c"cd").unwrap(),
            shim.concatenate(c"cd", c"ab").unwrap()
        );
    }

    #[test]
    fn test_concatenate_non_utf8() {
        let result = shim().concatenate(c"\xff", c"\xfe").unwrap();
        assert_eq!(result.to_bytes(), b"\xff\xfe");
    }

    #[test]
    fn test_print() {
        let mut shim = shim();
        shim.print(c"abc");
        assert_eq!(shim.into_inner(), b"abc");
    }

    #[test]
    fn test_print_appends_nothing() {
        let mut shim = shim();
        shim.print(c"hello");
        shim.print(c"");
        shim.print(c" world\n");
        assert_eq!(shim.into_inner(), b"hello world\n");
    }

    #[test]
    fn test_print_stdout() {
        Native::stdout().print(c"");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    #[traced_test]
    fn test_print_failure_is_logged() {
        Native::new(BrokenPipe).print(c"lost");
        assert!(logs_contain("failed to write to output"));
    }

    proptest! {
        #[test]
        fn test_concatenate_length_adds(a: String, b: String) {
            let (a, b) = (c_string(&a), c_string(&b));
            let shim = shim();
            let ab = shim.concatenate(&a, &b).unwrap();
            prop_assert_eq!(shim.length(&ab), shim.length(&a) + shim.length(&b));
            prop_assert_eq!(ab.capacity(), shim.length(&a) + shim.length(&b) + 1);
        }

        #[test]
        fn test_concatenate_identity(a: String) {
            let a = c_string(&a);
            let shim = shim();
            prop_assert_eq!(shim.concatenate(&a, c"").unwrap(), a.as_c_str());
            prop_assert_eq!(shim.concatenate(c"", &a).unwrap(), a.as_c_str());
        }

        #[test]
        fn test_concatenate_associative(a: String, b: String, c: String) {
            let (a, b, c) = (c_string(&a), c_string(&b), c_string(&c));
            let shim = shim();
            let left = shim.concatenate(&shim.concatenate(&a, &b).unwrap(), &c).unwrap();
            let right = shim.concatenate(&a, &shim.concatenate(&b, &c).unwrap()).unwrap();
            prop_assert_eq!(left, right);
        }

        #[test]
        fn test_print_emits_input(a: String, b: String) {
            let (a, b) = (c_string(&a), c_string(&b));
            let mut shim = shim();
            shim.print(&a);
            shim.print(&b);
            let mut expected = a.as_bytes().to_vec();
            expected.extend_from_slice(b.as_bytes());
            prop_assert_eq!(shim.into_inner(), expected);
        }
    }
}
