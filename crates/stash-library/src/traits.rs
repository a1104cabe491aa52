use async_trait::async_trait;
use stash_plugin::{Domain, Plugin};
use stash_types::Wisp;

use crate::error::LibraryResult;

/// Domain that routes library plugins to the [`LibraryHub`](crate::LibraryHub).
pub const LIBRARY_DOMAIN: Domain = Domain::from_static("library");

/// Lookup and search over some collection of Wisps.
///
/// A library answers for itself only. It may index the same Wisps a
/// backend stores or an unrelated catalogue.
#[async_trait]
pub trait Library: Plugin {
    /// Find the Wisp known by `identifier`.
    ///
    /// With `fuzzy` unset the identifier must match exactly; with it set the
    /// library may return its best approximate match.
    async fn find_wisp(&self, identifier: &str, fuzzy: bool) -> LibraryResult<Option<Wisp>>;

    /// Every Wisp matching any of `terms`.
    async fn search(&self, terms: &[&str]) -> LibraryResult<Vec<Wisp>>;
}
