use async_trait::async_trait;
use popcorn_models::{DetailRecord, SearchResult};
use tokio_util::sync::CancellationToken;
use crate::error::CatalogError;

/// Read-only access to a remote movie catalog.
///
/// Each call is a single round trip. Implementations must return
/// [`CatalogError::Cancelled`] promptly once `cancel` fires, but callers
/// never rely on that for correctness.
#[async_trait]
pub trait Catalog: Send + Sync {
    fn catalog_name(&self) -> &str;

    /// Search titles by free text.
    async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, CatalogError>;

    /// Fetch the expanded record for one identifier.
    async fn fetch_detail(
        &self,
        imdb_id: &str,
        cancel: &CancellationToken,
    ) -> Result<DetailRecord, CatalogError>;
}
