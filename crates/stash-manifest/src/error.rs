use stash_lock::LockError;
use stash_types::{WispError, WispPath};

/// Errors surfaced by manifest operations.
///
/// Only validation, capacity and configuration problems reach callers.
/// Backend faults are absorbed and reported as negative per-backend results.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The path or Wisp failed validation before any backend was touched.
    #[error(transparent)]
    Wisp(#[from] WispError),

    /// The lock queue refused the claim.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// A backend answered a read with a Wisp for a different path.
    ///
    /// Logged and skipped during reads; never returned to callers.
    #[error("backend {backend} returned Wisp<{returned}> when Wisp<{requested}> was requested")]
    MismatchedResult {
        backend: String,
        requested: WispPath,
        returned: WispPath,
    },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ManifestError {
    pub fn is_malformed_path(&self) -> bool {
        matches!(self, Self::Wisp(WispError::MalformedPath { .. }))
    }

    pub fn is_malformed_wisp(&self) -> bool {
        matches!(self, Self::Wisp(WispError::MalformedWisp(_)))
    }
}

/// Result alias for manifest operations.
pub type Result<T> = std::result::Result<T, ManifestError>;
