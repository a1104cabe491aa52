use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use stash_plugin::{Domain, Plugin};
use stash_types::{Wisp, WispPath};
use tracing::debug;

use crate::error::{BackendError, BackendResult};
use crate::traits::{Backend, MANIFEST_DOMAIN};

/// In-memory, `BTreeMap`-based backend.
///
/// Intended for tests and embedding. Wisps are cloned on read and write.
/// Deleting a path also drops everything stored beneath it, the same
/// observable effect as a filesystem backend removing a directory tree.
pub struct InMemoryBackend {
    name: String,
    domain: Domain,
    wisps: RwLock<BTreeMap<WispPath, Wisp>>,
}

impl InMemoryBackend {
    /// Create an empty backend routed to the manifest domain.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: MANIFEST_DOMAIN,
            wisps: RwLock::new(BTreeMap::new()),
        }
    }

    /// Route this backend to a different domain.
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    /// Number of Wisps currently stored.
    pub fn len(&self) -> usize {
        self.wisps.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every stored Wisp.
    pub fn clear(&self) {
        self.wisps
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<WispPath> {
        self.wisps
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn read_map(&self) -> BackendResult<RwLockReadGuard<'_, BTreeMap<WispPath, Wisp>>> {
        self.wisps
            .read()
            .map_err(|_| BackendError::Unavailable(format!("{}: lock poisoned", self.name)))
    }

    fn write_map(&self) -> BackendResult<RwLockWriteGuard<'_, BTreeMap<WispPath, Wisp>>> {
        self.wisps
            .write()
            .map_err(|_| BackendError::Unavailable(format!("{}: lock poisoned", self.name)))
    }
}

impl Plugin for InMemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> Domain {
        self.domain.clone()
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn read_wisp(&self, path: &WispPath) -> BackendResult<Option<Wisp>> {
        Ok(self.read_map()?.get(path).cloned())
    }

    async fn write_wisp(&self, wisp: &Wisp) -> BackendResult<bool> {
        self.write_map()?.insert(wisp.path.clone(), wisp.clone());
        Ok(true)
    }

    async fn delete_wisp(&self, path: &WispPath) -> BackendResult<bool> {
        let mut map = self.write_map()?;
        let existed = map.remove(path).is_some();
        let before = map.len();
        map.retain(|stored, _| !path.is_ancestor_of(stored));
        let descendants = before - map.len();
        if descendants > 0 {
            debug!(backend = %self.name, %path, descendants, "dropped descendants with deleted wisp");
        }
        Ok(existed)
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("wisp_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stash_types::LocalId;

    fn path(s: &str) -> WispPath {
        WispPath::parse(s).unwrap()
    }

    fn leaf(p: &str, text: &str) -> Wisp {
        Wisp::content(path(p), text)
    }

    fn group(p: &str, children: &[&str]) -> Wisp {
        Wisp::group(
            path(p),
            children.iter().map(|c| LocalId::parse(*c).unwrap()).collect(),
        )
    }

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn write_and_read_content() {
        let backend = InMemoryBackend::new("mem");
        let wisp = leaf("/docs/intro", "hello");

        assert!(backend.write_wisp(&wisp).await.unwrap());
        let read_back = backend.read_wisp(&wisp.path).await.unwrap();
        assert_eq!(read_back, Some(wisp));
    }

    #[tokio::test]
    async fn read_missing_is_none() {
        let backend = InMemoryBackend::new("mem");
        assert_eq!(backend.read_wisp(&path("/nothing")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn overwrite_replaces_variant() {
        let backend = InMemoryBackend::new("mem");
        backend.write_wisp(&leaf("/x", "text")).await.unwrap();
        backend.write_wisp(&group("/x", &["a"])).await.unwrap();

        let read_back = backend.read_wisp(&path("/x")).await.unwrap().unwrap();
        assert!(read_back.is_group());
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let backend = InMemoryBackend::new("mem");
        backend.write_wisp(&leaf("/a", "x")).await.unwrap();

        assert!(backend.delete_wisp(&path("/a")).await.unwrap());
        assert!(!backend.delete_wisp(&path("/a")).await.unwrap());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn delete_drops_descendants_only() {
        let backend = InMemoryBackend::new("mem");
        for wisp in [
            group("/docs", &["intro", "deep"]),
            leaf("/docs/intro", "hi"),
            group("/docs/deep", &["x"]),
            leaf("/docs/deep/x", "x"),
            leaf("/docsets", "sibling with shared prefix"),
        ] {
            backend.write_wisp(&wisp).await.unwrap();
        }

        assert!(backend.delete_wisp(&path("/docs")).await.unwrap());
        assert_eq!(backend.paths(), vec![path("/docsets")]);
    }

    #[tokio::test]
    async fn delete_absent_parent_still_drops_children() {
        let backend = InMemoryBackend::new("mem");
        backend.write_wisp(&leaf("/orphan/child", "x")).await.unwrap();

        assert!(!backend.delete_wisp(&path("/orphan")).await.unwrap());
        assert!(backend.is_empty());
    }

    #[test]
    fn plugin_identity() {
        let backend = InMemoryBackend::new("mem");
        assert_eq!(backend.name(), "mem");
        assert_eq!(backend.domain(), MANIFEST_DOMAIN);

        let rerouted = InMemoryBackend::new("mem").with_domain(Domain::new("archive"));
        assert_eq!(rerouted.domain(), Domain::new("archive"));
    }

    #[tokio::test]
    async fn clear_empties_store() {
        let backend = InMemoryBackend::default();
        backend.write_wisp(&leaf("/a", "1")).await.unwrap();
        backend.write_wisp(&leaf("/b", "2")).await.unwrap();
        assert_eq!(backend.len(), 2);

        backend.clear();
        assert!(backend.is_empty());
    }
}
