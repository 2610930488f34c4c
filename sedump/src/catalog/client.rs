//! Catalog client trait for testability.

use futures::future::BoxFuture;

use super::{CatalogEntry, CatalogError};

/// Trait for querying the hosting service's catalog.
///
/// This abstraction allows for dependency injection and easier testing by
/// enabling mock catalogs in tests. The production implementation is
/// [`ArchiveOrgCatalog`](super::ArchiveOrgCatalog).
pub trait CatalogClient: Send + Sync {
    /// Fetch the full ordered list of archives known to the catalog.
    ///
    /// The list is fetched fresh on every call; resolution never caches it
    /// across invocations.
    fn entries(&self) -> BoxFuture<'_, Result<Vec<CatalogEntry>, CatalogError>>;
}
