//! Error types for emptynull operations

use thiserror::Error;

/// Fatal trigger misconfiguration.
///
/// Each variant aborts the triggering mutation. None of them are caused by
/// row data; they mean the trigger was attached with the wrong timing,
/// granularity or event set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvocationError {
    #[error("replace_empty_string: not fired by trigger manager")]
    NotCalledAsTrigger,

    #[error("replace_empty_string: must be fired for row")]
    NotRowLevel,

    #[error("replace_empty_string: must be fired before event")]
    NotBefore,

    #[error("replace_empty_string: cannot process DELETE events")]
    DeleteNotSupported,

    #[error("replace_empty_string: cannot process {operation} events")]
    UnsupportedOperation { operation: String },

    #[error("replace_empty_string: invalid trigger event word {bits:#x}")]
    InvalidEvent { bits: u32 },
}

/// Master error type for all emptynull errors.
///
/// Invocation errors display exactly as their inner message, which is the
/// text PostgreSQL reports to the client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NullifyError {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error("Row shape mismatch: {reason}")]
    Shape { reason: String },

    #[error("Host error: {reason}")]
    Host { reason: String },
}

/// Result type alias for emptynull operations.
pub type NullifyResult<T> = Result<T, NullifyError>;

// =============================================================================
// TESTS
// =============================================================================
