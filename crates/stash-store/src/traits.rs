use async_trait::async_trait;
use stash_plugin::{Domain, Plugin};
use stash_types::{Wisp, WispPath};

use crate::error::BackendResult;

/// Domain that routes backend plugins to the manifest.
pub const MANIFEST_DOMAIN: Domain = Domain::from_static("manifest");

/// Path-addressed Wisp storage.
///
/// Implementations must satisfy these invariants:
/// - A read returns either nothing or the Wisp stored at exactly that path.
/// - A write fully replaces whatever was stored at the path, including a
///   change of variant.
/// - Expected failures are reported as `Ok(false)`; `Err` is reserved for
///   faults (I/O, corruption, unavailability).
/// - Concurrent calls for unrelated paths are safe.
#[async_trait]
pub trait Backend: Plugin {
    /// Read the Wisp stored at `path`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    async fn read_wisp(&self, path: &WispPath) -> BackendResult<Option<Wisp>>;

    /// Store `wisp`, replacing any previous Wisp at the same path.
    async fn write_wisp(&self, wisp: &Wisp) -> BackendResult<bool>;

    /// Delete the Wisp at `path`. Returns `Ok(false)` if nothing was there.
    async fn delete_wisp(&self, path: &WispPath) -> BackendResult<bool>;
}
