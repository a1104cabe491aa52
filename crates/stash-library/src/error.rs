/// Errors raised by a library plugin.
///
/// The hub never propagates these: a failing library is logged and
/// answers with an empty result.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// The library cannot serve requests right now.
    #[error("library unavailable: {0}")]
    Unavailable(String),

    /// The lookup itself failed.
    #[error("lookup failed: {0}")]
    Lookup(String),
}

/// Result alias for library operations.
pub type LibraryResult<T> = Result<T, LibraryError>;
