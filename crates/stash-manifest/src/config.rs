use serde::{Deserialize, Serialize};
use stash_plugin::Domain;

use crate::error::{ManifestError, Result};

/// Configuration for the [`Manifest`](crate::Manifest).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Maximum number of pending path claims. `None` leaves the lock queue
    /// unbounded; when set, operations beyond the limit fail with
    /// `LockError::QueueFull` instead of queueing.
    pub max_pending_claims: Option<usize>,
    /// Plugin domain whose backends are attached by `Manifest::start`.
    pub domain: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            max_pending_claims: None,
            domain: stash_store::MANIFEST_DOMAIN.as_str().to_string(),
        }
    }
}

impl ManifestConfig {
    /// Parse a TOML document. Missing keys take their default values.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| ManifestError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ManifestError::Config(e.to_string()))
    }

    /// The configured domain as a routing tag.
    pub fn domain(&self) -> Domain {
        Domain::new(self.domain.clone())
    }
}
