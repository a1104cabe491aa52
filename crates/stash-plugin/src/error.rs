//! Error types for plugin registration.

use thiserror::Error;

/// Errors that can occur while loading or removing plugins.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PluginError {
    /// Another plugin with the same name is already loaded.
    #[error("plugin already loaded: {name}")]
    DuplicateName { name: String },

    /// No plugin with this name is loaded.
    #[error("plugin not found: {name}")]
    NotFound { name: String },

    /// The plugin's start hook refused the load.
    #[error("plugin {name} failed to start: {reason}")]
    StartFailed { name: String, reason: String },

    /// A lifecycle hook reported a failure.
    #[error("plugin hook failed: {0}")]
    Hook(String),
}

/// Convenience type alias for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;
