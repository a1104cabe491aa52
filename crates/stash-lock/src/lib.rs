//! Path-hierarchy lock queue for MageStash.
//!
//! Every manifest operation claims the path it touches before calling any
//! backend. Two claims conflict when their paths are equal or one is an
//! ancestor of the other; conflicting claims are granted strictly in
//! arrival order, while claims on unrelated paths never wait on each other.
//!
//! A new claim only ever waits for claims that were queued before it, so
//! the wait graph follows arrival order and cannot contain a cycle.

pub mod error;
pub mod queue;

pub use error::{LockError, Result};
pub use queue::{PathClaim, PathLockQueue};
