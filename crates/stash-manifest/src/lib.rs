//! Fan-out coordinator for the MageStash content store.
//!
//! The [`Manifest`] holds an ordered list of storage backends and performs
//! validated reads, writes and deletes across all of them. Each operation
//! first claims its path in a [`PathLockQueue`](stash_lock::PathLockQueue),
//! so a write to `/g/child` and a delete of `/g` never interleave, while
//! operations on unrelated paths run concurrently.
//!
//! Backend faults never reach the caller: reads fall through to the next
//! backend and writes/deletes report `false` for the failing backend.
//! There is no rollback across backends.
//!
//! [`Walk`] enumerates a subtree lazily on top of the manifest's reads, and
//! [`ManifestLibrary`] exposes a subtree to the library domain.

pub mod config;
pub mod error;
pub mod library;
pub mod manifest;
pub mod walk;

#[cfg(test)]
mod test_support;

pub use config::ManifestConfig;
pub use error::{ManifestError, Result};
pub use library::ManifestLibrary;
pub use manifest::Manifest;
pub use walk::Walk;
