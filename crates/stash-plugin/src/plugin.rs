//! The [`Plugin`] trait and the [`Domain`] tag used to route plugins.

use std::borrow::Cow;
use std::fmt;

use crate::error::Result;

/// Tag naming the component a plugin belongs to.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Domain(Cow<'static, str>);

/// Domain of plugins that are not routed anywhere.
pub const NO_DOMAIN: Domain = Domain::from_static("");

impl Domain {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Domain({})", self.0)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named, loadable provider.
///
/// The trait is object-safe and `Send + Sync` so plugins can be shared as
/// `Arc<dyn Plugin>` (or as any trait object extending it).
pub trait Plugin: Send + Sync {
    /// Unique display name of this plugin.
    fn name(&self) -> &str;

    /// Domain this plugin is routed to when loaded.
    fn domain(&self) -> Domain {
        NO_DOMAIN
    }

    /// Called before the plugin is registered. An error refuses the load.
    fn on_start(&self) -> Result<()> {
        Ok(())
    }

    /// Called after the plugin has been removed. Errors are only logged.
    fn on_stop(&self) -> Result<()> {
        Ok(())
    }
}
