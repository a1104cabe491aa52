use std::sync::Arc;

use async_trait::async_trait;
use stash_library::{Library, LibraryError, LibraryResult, LIBRARY_DOMAIN};
use stash_plugin::{Domain, Plugin};
use stash_types::{Wisp, WispPath};

use crate::manifest::Manifest;

/// Library view over the subtree of a [`Manifest`].
///
/// Exact lookups take an absolute path inside the subtree. Fuzzy lookups
/// return the first Wisp, in walk order, whose path contains the identifier
/// ignoring ASCII case. Search is [`Manifest::search`] on the subtree root.
pub struct ManifestLibrary {
    name: String,
    manifest: Arc<Manifest>,
    root: WispPath,
}

impl ManifestLibrary {
    pub fn new(name: impl Into<String>, manifest: Arc<Manifest>, root: WispPath) -> Self {
        Self {
            name: name.into(),
            manifest,
            root,
        }
    }

    pub fn root(&self) -> &WispPath {
        &self.root
    }

    fn covers(&self, path: &WispPath) -> bool {
        *path == self.root || self.root.is_ancestor_of(path)
    }
}

fn lookup_error(e: crate::ManifestError) -> LibraryError {
    LibraryError::Lookup(e.to_string())
}

impl Plugin for ManifestLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> Domain {
        LIBRARY_DOMAIN
    }
}

#[async_trait]
impl Library for ManifestLibrary {
    async fn find_wisp(&self, identifier: &str, fuzzy: bool) -> LibraryResult<Option<Wisp>> {
        if !fuzzy {
            // Anything that is not a path in this subtree is simply unknown here.
            return match WispPath::parse(identifier) {
                Ok(path) if self.covers(&path) => {
                    self.manifest.read_path(&path).await.map_err(lookup_error)
                }
                _ => Ok(None),
            };
        }

        let needle = identifier.to_ascii_lowercase();
        let mut walk = self.manifest.walk(self.root.as_str()).map_err(lookup_error)?;
        while let Some(wisp) = walk.next_wisp().await.map_err(lookup_error)? {
            if wisp.path.as_str().to_ascii_lowercase().contains(&needle) {
                return Ok(Some(wisp));
            }
        }
        Ok(None)
    }

    async fn search(&self, terms: &[&str]) -> LibraryResult<Vec<Wisp>> {
        self.manifest
            .search(self.root.as_str(), terms)
            .await
            .map_err(lookup_error)
    }
}

impl std::fmt::Debug for ManifestLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestLibrary")
            .field("name", &self.name)
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManifestConfig;
    use crate::test_support::{group, leaf, path, GatedBackend};
    use stash_library::LibraryHub;
    use stash_plugin::PluginRegistry;
    use stash_store::InMemoryBackend;

    async fn docs_manifest() -> Arc<Manifest> {
        let manifest = Arc::new(Manifest::default());
        manifest.attach(Arc::new(InMemoryBackend::new("mem")));
        for wisp in [
            group("/docs", &["intro", "Guide"]),
            leaf("/docs/intro", "hello world"),
            group("/docs/Guide", &["setup"]),
            leaf("/docs/Guide/setup", "install the world"),
            leaf("/private", "world secrets"),
        ] {
            manifest.write_wisp(&wisp).await.unwrap();
        }
        manifest
    }

    #[tokio::test]
    async fn exact_lookup_stays_in_subtree() {
        let library = ManifestLibrary::new("docs", docs_manifest().await, path("/docs"));

        let found = library.find_wisp("/docs/intro", false).await.unwrap();
        assert_eq!(found, Some(leaf("/docs/intro", "hello world")));
        assert_eq!(library.find_wisp("/private", false).await.unwrap(), None);
        assert_eq!(library.find_wisp("not a path", false).await.unwrap(), None);
    }

    #[tokio::test]
    async fn fuzzy_lookup_follows_walk_order() {
        let library = ManifestLibrary::new("docs", docs_manifest().await, path("/docs"));

        let found = library.find_wisp("guide", true).await.unwrap().unwrap();
        assert_eq!(found.path.as_str(), "/docs/Guide");
        let found = library.find_wisp("SETUP", true).await.unwrap().unwrap();
        assert_eq!(found.path.as_str(), "/docs/Guide/setup");
        assert_eq!(library.find_wisp("private", true).await.unwrap(), None);
    }

    #[tokio::test]
    async fn search_is_scoped_to_root() {
        let library = ManifestLibrary::new("docs", docs_manifest().await, path("/docs"));
        let hits = library.search(&["world"]).await.unwrap();
        let paths: Vec<&str> = hits.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, ["/docs/intro", "/docs/Guide/setup"]);
    }

    #[tokio::test]
    async fn manifest_errors_surface_as_lookup_errors() {
        // A full lock queue makes every read fail.
        let config = ManifestConfig {
            max_pending_claims: Some(1),
            ..Default::default()
        };
        let manifest = Arc::new(Manifest::new(config));
        let gated = Arc::new(GatedBackend::closed("gated"));
        manifest.attach(gated.clone());

        let writer = {
            let manifest = Arc::clone(&manifest);
            tokio::spawn(async move { manifest.write_wisp(&leaf("/busy", "x")).await })
        };
        gated.wait_for_events(1).await;

        let library = ManifestLibrary::new("docs", Arc::clone(&manifest), path("/docs"));
        let err = library.search(&["x"]).await.unwrap_err();
        assert!(matches!(err, LibraryError::Lookup(_)));

        gated.open_gate();
        writer.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn hub_routes_manifest_library() {
        let manifest = docs_manifest().await;
        let hub = Arc::new(LibraryHub::new());
        let mut registry: PluginRegistry<dyn Library> = PluginRegistry::new();
        hub.start(&mut registry);

        registry
            .load(Arc::new(ManifestLibrary::new("docs", Arc::clone(&manifest), path("/docs"))))
            .unwrap();
        registry
            .load(Arc::new(ManifestLibrary::new("all", manifest, path("/private"))))
            .unwrap();

        let found = hub.find_wisp("/docs/intro", false).await;
        assert_eq!(found, [Some(leaf("/docs/intro", "hello world")), None]);

        let hits = hub.search(&["secrets"]).await;
        assert_eq!(hits[0], Vec::<Wisp>::new());
        assert_eq!(hits[1].len(), 1);
    }
}
