use std::collections::HashSet;

use futures_util::stream::{self, Stream};
use stash_types::{LocalId, Wisp, WispPath};

use crate::error::Result;
use crate::manifest::Manifest;

/// Lazy depth-first cursor over the subtree rooted at a path.
///
/// The root is yielded first, if it exists. Groups are then expanded from a
/// last-in-first-out stack: every child of the group being expanded is read
/// and yielded in content order, and child groups are pushed as they are
/// yielded. A newly discovered subgroup is therefore expanded before groups
/// that were already pending, and sibling subgroups are expanded in reverse
/// discovery order.
///
/// Children that no backend has are skipped, as are repeated ids within one
/// group, so each reachable Wisp is yielded once. Every read is an independent
/// manifest read with its own claim, so the subtree is not a snapshot.
pub struct Walk<'a> {
    manifest: &'a Manifest,
    root: WispPath,
    started: bool,
    /// Groups yielded but not yet expanded.
    pending: Vec<(WispPath, Vec<LocalId>)>,
    /// Group currently being expanded and its unvisited children.
    current: Option<(WispPath, std::vec::IntoIter<LocalId>)>,
    /// Ids of `current` already visited.
    seen: HashSet<LocalId>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(manifest: &'a Manifest, root: WispPath) -> Self {
        Self {
            manifest,
            root,
            started: false,
            pending: Vec::new(),
            current: None,
            seen: HashSet::new(),
        }
    }

    pub fn root(&self) -> &WispPath {
        &self.root
    }

    /// Next Wisp of the subtree, or `None` once it is exhausted.
    ///
    /// An error leaves the cursor after the entry whose read failed.
    pub async fn next_wisp(&mut self) -> Result<Option<Wisp>> {
        if !self.started {
            let root = self.manifest.read_path(&self.root).await?;
            self.started = true;
            if let Some(wisp) = &root {
                self.defer(wisp);
            }
            return Ok(root);
        }

        loop {
            let Some((parent, children)) = self.current.as_mut() else {
                match self.pending.pop() {
                    Some((group, ids)) => {
                        self.seen.clear();
                        self.current = Some((group, ids.into_iter()));
                        continue;
                    }
                    None => return Ok(None),
                }
            };

            let Some(id) = children.next() else {
                self.current = None;
                continue;
            };
            if !self.seen.insert(id.clone()) {
                continue;
            }
            let child = parent.child(&id);

            if let Some(wisp) = self.manifest.read_path(&child).await? {
                self.defer(&wisp);
                return Ok(Some(wisp));
            }
        }
    }

    fn defer(&mut self, wisp: &Wisp) {
        if let Some(children) = wisp.children() {
            self.pending.push((wisp.path.clone(), children.to_vec()));
        }
    }

    /// Rewind to the root. The next call reads the subtree afresh.
    pub fn restart(&mut self) {
        self.started = false;
        self.pending.clear();
        self.current = None;
        self.seen.clear();
    }

    /// Drain the remaining Wisps.
    pub async fn collect_all(&mut self) -> Result<Vec<Wisp>> {
        let mut wisps = Vec::new();
        while let Some(wisp) = self.next_wisp().await? {
            wisps.push(wisp);
        }
        Ok(wisps)
    }

    /// Adapt the cursor into a [`Stream`]. The stream ends after the first
    /// error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Wisp>> + 'a {
        stream::unfold(Some(self), |walk| async move {
            let Some(mut walk) = walk else {
                return None;
            };
            match walk.next_wisp().await {
                Ok(Some(wisp)) => Some((Ok(wisp), Some(walk))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

impl std::fmt::Debug for Walk<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walk")
            .field("root", &self.root)
            .field("started", &self.started)
            .field("pending_groups", &self.pending.len())
            .finish()
    }
}
