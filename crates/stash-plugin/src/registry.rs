use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::{PluginError, Result};
use crate::plugin::{Domain, Plugin};

/// Receives the plugins routed to a bound domain.
pub trait DomainObserver<P: ?Sized>: Send + Sync {
    /// A plugin of the observed domain was loaded (or was already loaded
    /// when the observer was bound).
    fn plugin_loaded(&self, plugin: Arc<P>);

    /// A plugin of the observed domain was removed.
    fn plugin_removed(&self, plugin: &Arc<P>);
}

/// Registry of loaded plugins, keyed by unique name.
///
/// Plugins are kept in load order. Each domain has at most one bound
/// observer; binding a new observer for a domain replaces the previous one.
pub struct PluginRegistry<P: ?Sized + Plugin> {
    plugins: Vec<Arc<P>>,
    observers: HashMap<Domain, Arc<dyn DomainObserver<P>>>,
}

impl<P: ?Sized + Plugin> PluginRegistry<P> {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            observers: HashMap::new(),
        }
    }

    /// Number of loaded plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<P>> {
        self.plugins.iter().find(|p| p.name() == name).cloned()
    }

    /// Names of all loaded plugins, in load order.
    pub fn names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name().to_string()).collect()
    }

    /// Load a plugin.
    ///
    /// Fails if the name is taken or the start hook fails. On success the
    /// observer bound to the plugin's domain, if any, receives it.
    pub fn load(&mut self, plugin: Arc<P>) -> Result<()> {
        let name = plugin.name().to_string();
        if self.contains(&name) {
            warn!(plugin = %name, "plugin name already loaded, refusing");
            return Err(PluginError::DuplicateName { name });
        }

        if let Err(e) = plugin.on_start() {
            error!(plugin = %name, error = %e, "plugin start hook failed");
            return Err(PluginError::StartFailed {
                name,
                reason: e.to_string(),
            });
        }

        self.plugins.push(Arc::clone(&plugin));

        let domain = plugin.domain();
        if let Some(observer) = self.observers.get(&domain) {
            observer.plugin_loaded(Arc::clone(&plugin));
        }

        info!(plugin = %name, domain = %domain, "plugin loaded");
        Ok(())
    }

    /// Remove a plugin by name and return it.
    ///
    /// The domain observer is notified before the stop hook runs. A failing
    /// stop hook is logged; the plugin is removed regardless.
    pub fn remove(&mut self, name: &str) -> Result<Arc<P>> {
        let Some(idx) = self.plugins.iter().position(|p| p.name() == name) else {
            warn!(plugin = %name, "removal of unknown plugin");
            return Err(PluginError::NotFound {
                name: name.to_string(),
            });
        };
        let plugin = self.plugins.remove(idx);

        if let Some(observer) = self.observers.get(&plugin.domain()) {
            observer.plugin_removed(&plugin);
        }

        if let Err(e) = plugin.on_stop() {
            error!(plugin = %name, error = %e, "plugin stop hook failed during removal");
        }

        info!(plugin = %name, "plugin removed");
        Ok(plugin)
    }

    /// Bind `observer` to `domain` and hand it every already-loaded plugin
    /// of that domain, in load order.
    pub fn bind_domain(&mut self, domain: Domain, observer: Arc<dyn DomainObserver<P>>) {
        for plugin in self.plugins.iter().filter(|p| p.domain() == domain) {
            observer.plugin_loaded(Arc::clone(plugin));
        }
        if self.observers.insert(domain.clone(), observer).is_some() {
            warn!(domain = %domain, "replaced existing domain observer");
        }
    }

    /// Unbind the observer of `domain`. Returns `true` if one was bound.
    pub fn unbind_domain(&mut self, domain: &Domain) -> bool {
        self.observers.remove(domain).is_some()
    }

    /// Remove every plugin, most recently loaded first. Returns how many
    /// were removed.
    pub fn shutdown(&mut self) -> usize {
        let names = self.names();
        info!(count = names.len(), "unloading all plugins");
        let mut removed = 0;
        for name in names.iter().rev() {
            if self.remove(name).is_ok() {
                removed += 1;
            }
        }
        removed
    }
}

impl<P: ?Sized + Plugin> Default for PluginRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized + Plugin> std::fmt::Debug for PluginRegistry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .field("bound_domains", &self.observers.keys().collect::<Vec<_>>())
            .finish()
    }
}
