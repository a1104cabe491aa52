use std::sync::{Arc, PoisonError, RwLock};

use futures_util::future::join_all;
use stash_plugin::{DomainObserver, Plugin, PluginRegistry};
use stash_types::Wisp;
use tracing::{debug, error, info, warn};

use crate::traits::{Library, LIBRARY_DOMAIN};

/// Fans lookups out to every attached library.
///
/// Results come back one slot per library, in attach order. A library that
/// fails is logged and contributes `None` (lookup) or an empty list
/// (search), so one broken library never hides the answers of the others.
pub struct LibraryHub {
    libraries: RwLock<Vec<Arc<dyn Library>>>,
}

impl LibraryHub {
    pub fn new() -> Self {
        Self {
            libraries: RwLock::new(Vec::new()),
        }
    }

    /// Number of attached libraries.
    pub fn count(&self) -> usize {
        self.libraries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn library_names(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|library| library.name().to_string())
            .collect()
    }

    /// Attach a library. Returns `false` if the name is already attached.
    pub fn attach(&self, library: Arc<dyn Library>) -> bool {
        let mut libraries = self.libraries.write().unwrap_or_else(PoisonError::into_inner);
        if libraries.iter().any(|l| l.name() == library.name()) {
            warn!(library = library.name(), "library already attached");
            return false;
        }
        info!(library = library.name(), "library attached");
        libraries.push(library);
        true
    }

    pub fn detach(&self, name: &str) -> bool {
        let mut libraries = self.libraries.write().unwrap_or_else(PoisonError::into_inner);
        let before = libraries.len();
        libraries.retain(|l| l.name() != name);
        let removed = libraries.len() != before;
        if removed {
            info!(library = name, "library detached");
        }
        removed
    }

    pub fn clear(&self) {
        self.libraries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Receive every library loaded into `registry`, now and later.
    pub fn start(self: &Arc<Self>, registry: &mut PluginRegistry<dyn Library>) {
        let observer: Arc<dyn DomainObserver<dyn Library>> = self.clone();
        registry.bind_domain(LIBRARY_DOMAIN, observer);
        info!(libraries = self.count(), "library hub started");
    }

    pub fn stop(&self, registry: &mut PluginRegistry<dyn Library>) {
        registry.unbind_domain(&LIBRARY_DOMAIN);
        self.clear();
        info!("library hub stopped");
    }

    fn snapshot(&self) -> Vec<Arc<dyn Library>> {
        self.libraries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Ask every library for `identifier`.
    pub async fn find_wisp(&self, identifier: &str, fuzzy: bool) -> Vec<Option<Wisp>> {
        let libraries = self.snapshot();
        let results = join_all(libraries.iter().map(|library| async move {
            match library.find_wisp(identifier, fuzzy).await {
                Ok(found) => found,
                Err(e) => {
                    error!(library = library.name(), identifier, error = %e, "library lookup failed");
                    None
                }
            }
        }))
        .await;
        debug!(identifier, fuzzy, libraries = results.len(), "lookup complete");
        results
    }

    /// Run `terms` against every library.
    pub async fn search(&self, terms: &[&str]) -> Vec<Vec<Wisp>> {
        let libraries = self.snapshot();
        let results = join_all(libraries.iter().map(|library| async move {
            match library.search(terms).await {
                Ok(found) => found,
                Err(e) => {
                    error!(library = library.name(), ?terms, error = %e, "library search failed");
                    Vec::new()
                }
            }
        }))
        .await;
        debug!(?terms, libraries = results.len(), "search complete");
        results
    }
}

impl Plugin for LibraryHub {
    fn name(&self) -> &str {
        "library"
    }

    fn on_stop(&self) -> stash_plugin::Result<()> {
        self.clear();
        Ok(())
    }
}

impl DomainObserver<dyn Library> for LibraryHub {
    fn plugin_loaded(&self, plugin: Arc<dyn Library>) {
        self.attach(plugin);
    }

    fn plugin_removed(&self, plugin: &Arc<dyn Library>) {
        self.detach(plugin.name());
    }
}

impl Default for LibraryHub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LibraryHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryHub")
            .field("libraries", &self.library_names())
            .finish()
    }
}
