//! Error types
//!
//! The engine performs no I/O, so every error here is a precondition
//! violation: the caller handed over a value that cannot have come from a
//! well-formed deck. None of them are retryable.

/// Cadence error type
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CadenceError {
    /// Rating outside 1..=4
    #[error("Invalid rating: {0} (expected 1=Again, 2=Hard, 3=Good, 4=Easy)")]
    InvalidRating(u8),
    /// Unknown learning state name
    #[error("Invalid learning state: {0}")]
    InvalidState(String),
    /// Corrupt scheduling snapshot (negative or non-finite values)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Parameter set that cannot drive the memory model
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Cadence result type
pub type Result<T> = std::result::Result<T, CadenceError>;
