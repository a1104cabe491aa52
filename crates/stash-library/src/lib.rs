//! Library lookups for MageStash.
//!
//! A library is a plugin that can find a Wisp by identifier and search
//! Wisps by terms. Libraries are tagged with [`LIBRARY_DOMAIN`]; once a
//! [`LibraryHub`] is started against a registry it receives every such
//! plugin and fans `find_wisp` / `search` out to all of them.
//!
//! Libraries live in their own `PluginRegistry<dyn Library>`, just as
//! backends live in a `PluginRegistry<dyn Backend>`: the registry's type
//! parameter is the capability the routed plugins provide.

pub mod error;
pub mod hub;
pub mod traits;

pub use error::{LibraryError, LibraryResult};
pub use hub::LibraryHub;
pub use traits::{Library, LIBRARY_DOMAIN};
