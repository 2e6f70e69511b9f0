//! Error types for the Weft solver.
//!
//! All crates return `WeftResult<T>` from fallible operations. The
//! per-particle hot path never fails; only construction, validation
//! and I/O do.

use thiserror::Error;

/// Unified error type for Weft.
#[derive(Debug, Error)]
pub enum WeftError {
    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Collider shape data is malformed or inconsistent.
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A simulation invariant was violated (e.g., penetration left behind).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Convenience alias for `Result<T, WeftError>`.
pub type WeftResult<T> = Result<T, WeftError>;
