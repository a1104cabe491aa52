use thiserror::Error;

/// Errors produced while validating Wisps and their paths.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WispError {
    /// The path does not satisfy the absolute-path grammar.
    #[error("malformed path: {path:?}")]
    MalformedPath { path: String },

    /// The content or metadata of a Wisp has the wrong shape.
    #[error("malformed wisp: {0}")]
    MalformedWisp(String),
}

impl WispError {
    pub(crate) fn path(path: impl Into<String>) -> Self {
        Self::MalformedPath { path: path.into() }
    }
}

/// Convenience alias for Wisp validation results.
pub type Result<T> = std::result::Result<T, WispError>;
