//! Cover art catalog interface.

use async_trait::async_trait;
use bytes::Bytes;

/// Errors returned by a cover catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    Decode(String),
}

/// Async trait that cover art sources implement.
///
/// Catalogs are shared across tasks behind an `Arc`.
#[async_trait]
pub trait CoverCatalog: Send + Sync {
    /// Short, lowercase identifier (e.g. `"anilist"`).
    fn name(&self) -> &'static str;

    /// Look up the cover image URL for a series title.
    ///
    /// `Ok(None)` means the catalog answered but has no cover for it.
    async fn cover_url(&self, search: &str) -> Result<Option<String>, CatalogError>;

    /// Download an image found by [`cover_url`](Self::cover_url).
    async fn fetch_image(&self, url: &str) -> Result<Bytes, CatalogError>;
}
