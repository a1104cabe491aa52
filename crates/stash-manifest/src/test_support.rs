//! Backends and builders shared by the manifest tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use stash_plugin::{Domain, Plugin};
use stash_store::{Backend, BackendError, BackendResult, MANIFEST_DOMAIN};
use stash_types::{LocalId, Wisp, WispPath};
use tokio::sync::Semaphore;

pub(crate) fn path(s: &str) -> WispPath {
    WispPath::parse(s).unwrap()
}

pub(crate) fn leaf(p: &str, text: &str) -> Wisp {
    Wisp::content(path(p), text)
}

pub(crate) fn group(p: &str, children: &[&str]) -> Wisp {
    Wisp::group(
        path(p),
        children.iter().map(|c| LocalId::parse(*c).unwrap()).collect(),
    )
}

/// Fails every call.
pub(crate) struct FailingBackend {
    name: String,
}

impl FailingBackend {
    pub(crate) fn new(name: &str) -> Self {
        Self { name: name.into() }
    }
}

impl Plugin for FailingBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> Domain {
        MANIFEST_DOMAIN
    }
}

#[async_trait]
impl Backend for FailingBackend {
    async fn read_wisp(&self, _path: &WispPath) -> BackendResult<Option<Wisp>> {
        Err(BackendError::Unavailable(format!("{} is down", self.name)))
    }

    async fn write_wisp(&self, _wisp: &Wisp) -> BackendResult<bool> {
        Err(BackendError::Unavailable(format!("{} is down", self.name)))
    }

    async fn delete_wisp(&self, _path: &WispPath) -> BackendResult<bool> {
        Err(BackendError::Io(std::io::Error::other("disk gone")))
    }
}

/// Answers every read with a Wisp stored at the wrong path.
pub(crate) struct MismatchBackend {
    name: String,
}

impl MismatchBackend {
    pub(crate) fn new(name: &str) -> Self {
        Self { name: name.into() }
    }
}

impl Plugin for MismatchBackend {
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Backend for MismatchBackend {
    async fn read_wisp(&self, _path: &WispPath) -> BackendResult<Option<Wisp>> {
        Ok(Some(leaf("/elsewhere", "wrong")))
    }

    async fn write_wisp(&self, _wisp: &Wisp) -> BackendResult<bool> {
        Ok(false)
    }

    async fn delete_wisp(&self, _path: &WispPath) -> BackendResult<bool> {
        Ok(false)
    }
}

/// Stores Wisps without touching descendants on delete, recording every
/// call. Writes are held at a gate until it is opened.
pub(crate) struct GatedBackend {
    name: String,
    gate: Semaphore,
    wisps: Mutex<BTreeMap<WispPath, Wisp>>,
    events: Mutex<Vec<String>>,
}

impl GatedBackend {
    /// Writes wait until [`GatedBackend::open_gate`] is called.
    pub(crate) fn closed(name: &str) -> Self {
        Self {
            name: name.into(),
            gate: Semaphore::new(0),
            wisps: Mutex::new(BTreeMap::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn open(name: &str) -> Self {
        let backend = Self::closed(name);
        backend.open_gate();
        backend
    }

    /// Let every waiting and future write through.
    pub(crate) fn open_gate(&self) {
        // Waiters on a closed semaphore are woken with an error.
        self.gate.close();
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) async fn wait_for_events(&self, count: usize) {
        while self.events.lock().unwrap().len() < count {
            tokio::task::yield_now().await;
        }
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl Plugin for GatedBackend {
    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Backend for GatedBackend {
    async fn read_wisp(&self, path: &WispPath) -> BackendResult<Option<Wisp>> {
        Ok(self.wisps.lock().unwrap().get(path).cloned())
    }

    async fn write_wisp(&self, wisp: &Wisp) -> BackendResult<bool> {
        self.record(format!("write-start {}", wisp.path));
        let _ = self.gate.acquire().await;
        self.wisps
            .lock()
            .unwrap()
            .insert(wisp.path.clone(), wisp.clone());
        self.record(format!("write-end {}", wisp.path));
        Ok(true)
    }

    async fn delete_wisp(&self, path: &WispPath) -> BackendResult<bool> {
        self.record(format!("delete {path}"));
        Ok(self.wisps.lock().unwrap().remove(path).is_some())
    }
}
