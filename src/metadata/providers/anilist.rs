//! AniList cover art catalog.
//!
//! Implements [`CoverCatalog`] with the AniList GraphQL API.
//!
//! Features:
//! - Token-bucket rate limiting at 1 request / second via [`governor`].
//! - Fixed-backoff retry on transport failures and unexpected statuses.
//! - HTTP 404 and a missing `coverImage.large` both mean "no cover".

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::MetadataConfig;
use crate::metadata::provider::{CatalogError, CoverCatalog};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const COVER_QUERY: &str = "query ($search: String) { Media(search: $search, type: ANIME) { coverImage { large } } }";

// ---------------------------------------------------------------------------
// AniList response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<MediaData>,
}

#[derive(Debug, Deserialize)]
struct MediaData {
    #[serde(rename = "Media")]
    media: Option<Media>,
}

#[derive(Debug, Deserialize)]
struct Media {
    #[serde(rename = "coverImage")]
    cover_image: Option<CoverImage>,
}

#[derive(Debug, Deserialize)]
struct CoverImage {
    large: Option<String>,
}

impl GraphQlResponse {
    fn cover_url(self) -> Option<String> {
        self.data?.media?.cover_image?.large.filter(|url| !url.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Catalog implementation
// ---------------------------------------------------------------------------

/// AniList cover lookup.
pub struct AniListCatalog {
    client: reqwest::Client,
    endpoint: String,
    retries: u32,
    backoff: Duration,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl AniListCatalog {
    pub fn new(config: &MetadataConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client: {}", e);
                reqwest::Client::new()
            });

        let quota = Quota::per_second(NonZeroU32::MIN);

        Self {
            client,
            endpoint: config.endpoint.clone(),
            retries: config.retries.max(1),
            backoff: Duration::from_secs(config.retry_backoff_secs),
            rate_limiter: RateLimiter::direct(quota),
        }
    }

    /// One GraphQL round trip. `Ok(None)` is a definitive "not found".
    async fn query_once(&self, search: &str) -> Result<Option<String>, CatalogError> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": COVER_QUERY, "variables": { "search": search } }))
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let body: GraphQlResponse = response
                    .json()
                    .await
                    .map_err(|e| CatalogError::Decode(e.to_string()))?;
                Ok(body.cover_url())
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(CatalogError::Status(status.as_u16())),
        }
    }
}

#[async_trait]
impl CoverCatalog for AniListCatalog {
    fn name(&self) -> &'static str {
        "anilist"
    }

    async fn cover_url(&self, search: &str) -> Result<Option<String>, CatalogError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.query_once(search).await {
                Ok(found) => {
                    debug!(search, found = found.is_some(), "AniList cover lookup");
                    return Ok(found);
                }
                Err(CatalogError::Decode(e)) => return Err(CatalogError::Decode(e)),
                Err(e) if attempt < self.retries => {
                    warn!(
                        retry = attempt,
                        wait_secs = self.backoff.as_secs(),
                        "AniList lookup failed: {}",
                        e
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_image(&self, url: &str) -> Result<Bytes, CatalogError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        response
            .bytes()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))
    }
}
