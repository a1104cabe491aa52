//! Foundation types for the MageStash content store.
//!
//! A store is a tree of **Wisps** addressed by absolute path, the way files
//! and directories are addressed on a filesystem. Every Wisp is one of two
//! variants:
//!
//! - a **content** Wisp (leaf) holding an opaque text payload;
//! - a **group** Wisp (node) holding an ordered list of child local ids.
//!
//! The children of a group live at `group_path + "/" + local_id`. That link
//! is computed, never stored as a back-reference.
//!
//! # Key Types
//!
//! - [`WispPath`]: validated absolute path (`/docs/intro`)
//! - [`LocalId`]: validated final path segment (`intro`)
//! - [`Wisp`] / [`WispContent`]: the entity and its two variants
//! - [`Metadata`]: shallow map of scalars or arrays of scalars
//!
//! The untyped validators ([`is_valid_path`], [`is_valid_content`],
//! [`is_valid_metadata`], [`assert_valid`]) operate on raw strings and JSON
//! values, for candidates that have not been converted to typed Wisps yet.

pub mod error;
pub mod metadata;
pub mod path;
pub mod validate;
pub mod wisp;

pub use error::{Result, WispError};
pub use metadata::{is_valid_metadata, Metadata, MetadataValue, Scalar};
pub use path::{is_valid_local_id, is_valid_path, LocalId, WispPath, SEPARATOR};
pub use validate::{assert_valid, is_valid_content};
pub use wisp::{is_content_type, is_group_type, Wisp, WispContent};
