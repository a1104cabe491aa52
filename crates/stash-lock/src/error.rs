/// Errors produced by the lock queue.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LockError {
    /// The queue already holds its configured maximum of claims.
    #[error("lock queue full: {limit} claims pending")]
    QueueFull { limit: usize },
}

/// Convenience alias used throughout the lock crate.
pub type Result<T> = std::result::Result<T, LockError>;
