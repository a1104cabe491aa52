//! Plugin registration for MageStash.
//!
//! Plugins are named providers (storage backends, indexers, ...) loaded into
//! a [`PluginRegistry`]. Each plugin is tagged with a [`Domain`]; a component
//! that owns a domain binds a [`DomainObserver`] and is told whenever a
//! plugin of that domain is loaded or removed. This is how backends reach
//! the manifest without anyone probing plugin shapes at runtime.
//!
//! # Modules
//!
//! - [`error`]: Error types for plugin operations
//! - [`plugin`]: The [`Plugin`] trait and [`Domain`] tag
//! - [`registry`]: [`PluginRegistry`] and the [`DomainObserver`] trait

pub mod error;
pub mod plugin;
pub mod registry;

pub use error::{PluginError, Result};
pub use plugin::{Domain, Plugin, NO_DOMAIN};
pub use registry::{DomainObserver, PluginRegistry};
