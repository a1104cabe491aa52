/// Errors raised by a storage backend.
///
/// The manifest never propagates these to its callers: a failing backend
/// is logged and counted as a negative result for that backend only.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend cannot serve requests right now.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data for a path cannot be decoded.
    #[error("corrupt wisp {path}: {reason}")]
    Corrupt { path: String, reason: String },
}

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
