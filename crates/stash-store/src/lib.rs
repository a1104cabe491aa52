//! Storage backends for MageStash.
//!
//! A backend persists Wisps by path. The manifest fans every read, write and
//! delete out to all attached backends, so a backend only has to answer for
//! itself: it never coordinates with other backends and never sees two
//! concurrent calls for hierarchically related paths.
//!
//! # Backends
//!
//! All backends implement the [`Backend`] trait:
//!
//! - [`InMemoryBackend`]: `BTreeMap`-based store for tests and embedding
//!
//! # Contract
//!
//! 1. `read_wisp` returns `None` or a Wisp whose path equals the argument.
//! 2. `write_wisp` returns `Ok(false)` for expected failures instead of erroring.
//! 3. `delete_wisp` is idempotent: deleting an absent path returns `Ok(false)`.
//! 4. Backends are tagged with [`MANIFEST_DOMAIN`] so the plugin registry
//!    routes them to the manifest.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{BackendError, BackendResult};
pub use memory::InMemoryBackend;
pub use traits::{Backend, MANIFEST_DOMAIN};
