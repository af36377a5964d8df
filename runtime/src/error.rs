/*!
Error types for the string shim
*/

/// Errors surfaced by the string operations.
///
/// Invalid string references are not represented here: a dangling or
/// unterminated pointer cannot be told apart from a valid one at the
/// foreign boundary, so it stays undefined behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ShimError {
    /// The allocator could not provide a buffer of `requested` bytes,
    /// or the size itself does not fit in `usize`.
    #[error("allocation of {requested} bytes failed")]
    AllocationFailure { requested: usize },
}

/// Result type for shim operations
pub type ShimResult<T> = Result<T, ShimError>;
