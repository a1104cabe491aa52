use std::sync::{Arc, PoisonError, RwLock};

use futures_util::future::join_all;
use serde_json::Value;
use stash_lock::PathLockQueue;
use stash_plugin::{DomainObserver, Plugin, PluginRegistry};
use stash_store::Backend;
use stash_types::{Wisp, WispPath};
use tracing::{debug, error, info, warn};

use crate::config::ManifestConfig;
use crate::error::{ManifestError, Result};
use crate::walk::Walk;

/// Coordinator that fans Wisp operations out to every attached backend.
///
/// Every operation claims its path in the lock queue before touching any
/// backend and holds the claim until it returns, so operations on the same
/// lineage (ancestor, descendant or equal paths) run one at a time in arrival
/// order while unrelated paths proceed concurrently.
///
/// Backends join and leave through [`Manifest::attach`] /
/// [`Manifest::detach`], normally driven by a [`PluginRegistry`] after
/// [`Manifest::start`].
pub struct Manifest {
    backends: RwLock<Vec<Arc<dyn Backend>>>,
    locks: PathLockQueue,
    config: ManifestConfig,
}

impl Manifest {
    pub fn new(config: ManifestConfig) -> Self {
        Self {
            backends: RwLock::new(Vec::new()),
            locks: PathLockQueue::with_limit(config.max_pending_claims),
            config,
        }
    }

    pub fn config(&self) -> &ManifestConfig {
        &self.config
    }

    /// Number of attached backends.
    pub fn count(&self) -> usize {
        self.backends
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Names of the attached backends, in registration order.
    pub fn backend_names(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|backend| backend.name().to_string())
            .collect()
    }

    /// Number of path claims currently queued.
    pub fn pending_claims(&self) -> usize {
        self.locks.len()
    }

    /// Attach a backend at the end of the fan-out order.
    ///
    /// Returns `false` if a backend with the same name is already attached.
    pub fn attach(&self, backend: Arc<dyn Backend>) -> bool {
        let mut backends = self.backends.write().unwrap_or_else(PoisonError::into_inner);
        if backends.iter().any(|b| b.name() == backend.name()) {
            warn!(backend = backend.name(), "backend already attached");
            return false;
        }
        info!(backend = backend.name(), position = backends.len(), "backend attached");
        backends.push(backend);
        true
    }

    /// Detach the backend named `name`. Returns `false` if none matched.
    pub fn detach(&self, name: &str) -> bool {
        let mut backends = self.backends.write().unwrap_or_else(PoisonError::into_inner);
        let before = backends.len();
        backends.retain(|b| b.name() != name);
        let removed = backends.len() != before;
        if removed {
            info!(backend = name, "backend detached");
        }
        removed
    }

    /// Detach every backend.
    pub fn clear(&self) {
        self.backends
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Route the configured domain of `registry` into this manifest.
    ///
    /// Backends already loaded in that domain are attached immediately;
    /// later loads and removals are applied as they happen.
    pub fn start(self: &Arc<Self>, registry: &mut PluginRegistry<dyn Backend>) {
        let observer: Arc<dyn DomainObserver<dyn Backend>> = self.clone();
        registry.bind_domain(self.config.domain(), observer);
        info!(domain = %self.config.domain, backends = self.count(), "manifest started");
    }

    /// Stop routing from `registry` and detach every backend.
    pub fn stop(&self, registry: &mut PluginRegistry<dyn Backend>) {
        registry.unbind_domain(&self.config.domain());
        self.clear();
        info!(domain = %self.config.domain, "manifest stopped");
    }

    fn snapshot(&self) -> Vec<Arc<dyn Backend>> {
        self.backends
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Read the Wisp at `path` from the first backend that has it.
    ///
    /// Backends are consulted in registration order. A backend answering
    /// with a Wisp for another path, or failing, is logged and skipped.
    pub async fn read_wisp(&self, path: &str) -> Result<Option<Wisp>> {
        let path = WispPath::parse(path)?;
        self.read_path(&path).await
    }

    pub(crate) async fn read_path(&self, path: &WispPath) -> Result<Option<Wisp>> {
        let claim = self.locks.acquire(path).await?;

        let mut found = None;
        for backend in self.snapshot() {
            if let Some(wisp) = read_from(backend.as_ref(), path).await {
                found = Some(wisp);
                break;
            }
        }

        claim.release();
        debug!(%path, found = found.is_some(), "read complete");
        Ok(found)
    }

    /// Read `path` from every backend, one slot per backend in registration
    /// order. Mismatched and failed reads leave their slot empty.
    pub async fn read_wisp_all(&self, path: &str) -> Result<Vec<Option<Wisp>>> {
        let path = WispPath::parse(path)?;
        let claim = self.locks.acquire(&path).await?;

        let backends = self.snapshot();
        let results = join_all(
            backends
                .iter()
                .map(|backend| read_from(backend.as_ref(), &path)),
        )
        .await;

        claim.release();
        debug!(%path, backends = results.len(), "read-all complete");
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Writes and deletes
    // -----------------------------------------------------------------------

    /// Write `wisp` to every backend.
    ///
    /// Returns one flag per backend in registration order; a failing backend
    /// counts as `false`. Nothing is rolled back on partial failure.
    pub async fn write_wisp(&self, wisp: &Wisp) -> Result<Vec<bool>> {
        wisp.validate()?;
        let claim = self.locks.acquire(&wisp.path).await?;

        let backends = self.snapshot();
        let results = join_all(backends.iter().map(|backend| async move {
            match backend.write_wisp(wisp).await {
                Ok(written) => written,
                Err(e) => {
                    error!(backend = backend.name(), path = %wisp.path, error = %e, "backend write failed");
                    false
                }
            }
        }))
        .await;

        claim.release();
        debug!(path = %wisp.path, ?results, "write complete");
        Ok(results)
    }

    /// Validate an untyped candidate and write it.
    pub async fn write_value(&self, candidate: Value) -> Result<Vec<bool>> {
        let wisp = Wisp::from_value(candidate)?;
        self.write_wisp(&wisp).await
    }

    /// Delete `path` from every backend, with the same per-backend result
    /// semantics as [`Manifest::write_wisp`].
    ///
    /// The manifest does not cascade: whether children survive is up to
    /// each backend.
    pub async fn delete_wisp(&self, path: &str) -> Result<Vec<bool>> {
        let path = WispPath::parse(path)?;
        let claim = self.locks.acquire(&path).await?;

        let backends = self.snapshot();
        let path_ref = &path;
        let results = join_all(backends.iter().map(|backend| async move {
            match backend.delete_wisp(path_ref).await {
                Ok(deleted) => deleted,
                Err(e) => {
                    error!(backend = backend.name(), path = %path_ref, error = %e, "backend delete failed");
                    false
                }
            }
        }))
        .await;

        claim.release();
        debug!(%path, ?results, "delete complete");
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    /// Lazily walk the subtree rooted at `path`, depth first.
    ///
    /// Nothing is read until the walk is advanced.
    pub fn walk(&self, path: &str) -> Result<Walk<'_>> {
        let root = WispPath::parse(path)?;
        Ok(Walk::new(self, root))
    }

    /// Every Wisp under `root` (inclusive) matching any of `terms`, in walk
    /// order. See [`Wisp::matches_terms`].
    pub async fn search(&self, root: &str, terms: &[&str]) -> Result<Vec<Wisp>> {
        let mut walk = self.walk(root)?;
        let mut matches = Vec::new();
        while let Some(wisp) = walk.next_wisp().await? {
            if wisp.matches_terms(terms) {
                matches.push(wisp);
            }
        }
        Ok(matches)
    }
}

/// Read `path` from one backend, discarding mismatched results and errors.
async fn read_from(backend: &dyn Backend, path: &WispPath) -> Option<Wisp> {
    match backend.read_wisp(path).await {
        Ok(Some(wisp)) if wisp.path == *path => Some(wisp),
        Ok(Some(wisp)) => {
            let mismatch = ManifestError::MismatchedResult {
                backend: backend.name().to_string(),
                requested: path.clone(),
                returned: wisp.path,
            };
            warn!(error = %mismatch, "discarding mismatched read result");
            None
        }
        Ok(None) => None,
        Err(e) => {
            error!(backend = backend.name(), %path, error = %e, "backend read failed");
            None
        }
    }
}

/// The manifest is itself a plugin, so an application can manage it next to
/// its other components. It carries no domain; removing it detaches every
/// backend.
impl Plugin for Manifest {
    fn name(&self) -> &str {
        "manifest"
    }

    fn on_stop(&self) -> stash_plugin::Result<()> {
        self.clear();
        Ok(())
    }
}

impl DomainObserver<dyn Backend> for Manifest {
    fn plugin_loaded(&self, plugin: Arc<dyn Backend>) {
        self.attach(plugin);
    }

    fn plugin_removed(&self, plugin: &Arc<dyn Backend>) {
        self.detach(plugin.name());
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new(ManifestConfig::default())
    }
}

impl std::fmt::Debug for Manifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manifest")
            .field("backends", &self.backend_names())
            .field("pending_claims", &self.pending_claims())
            .field("config", &self.config)
            .finish()
    }
}
