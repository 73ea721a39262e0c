//! Rename downloaded episodes and attach cover art.
//!
//! The [`Enricher`] never fails: every problem (unparseable name, rename
//! error, catalog outage) is logged and the asset continues unchanged.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use super::naming::{self, EpisodeInfo};
use super::provider::CoverCatalog;
use crate::config::MetadataConfig;
use crate::pipeline::Service;

/// What enrichment produced for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    /// Current location of the file (renamed if that succeeded).
    pub path: PathBuf,
    /// Parsed episode facts, if the name could be parsed.
    pub info: Option<EpisodeInfo>,
    /// Downloaded cover image.
    pub thumbnail: Option<PathBuf>,
    /// Series title as shortened for the file name.
    pub display_title: Option<String>,
}

impl Enrichment {
    fn unchanged(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            info: None,
            thumbnail: None,
            display_title: None,
        }
    }
}

/// Renames files to their canonical name and fetches a thumbnail.
///
/// # Example
///
/// ```rust,ignore
/// let enricher = Enricher::new(Some(Arc::new(AniListCatalog::new(&config.metadata))), &config.metadata);
/// let enrichment = enricher.enrich(Path::new("videos/Show_S01E02.mkv"), Service::Crunchy).await;
/// ```
pub struct Enricher {
    catalog: Option<Arc<dyn CoverCatalog>>,
    max_title_length: usize,
    default_resolution: String,
}

impl Enricher {
    /// Create an enricher. Without a catalog only renaming is done.
    pub fn new(catalog: Option<Arc<dyn CoverCatalog>>, config: &MetadataConfig) -> Self {
        Self {
            catalog,
            max_title_length: config.max_title_length,
            default_resolution: config.default_resolution.clone(),
        }
    }

    /// Rename `path` in place and fetch its cover.
    pub async fn enrich(&self, path: &Path, service: Service) -> Enrichment {
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            return Enrichment::unchanged(path);
        };

        let Some(info) = naming::parse_episode_info(&file_name) else {
            warn!("Could not extract a title from {:?}, keeping the name", file_name);
            return Enrichment::unchanged(path);
        };

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "mkv".to_string());
        let name = naming::canonical_name(
            &info,
            service,
            self.max_title_length,
            &self.default_resolution,
            &extension,
        );

        let target = path.with_file_name(&name);
        let path = if target == path {
            target
        } else {
            match std::fs::rename(path, &target) {
                Ok(()) => {
                    info!("Renamed {:?} -> {:?}", file_name, name);
                    target
                }
                Err(e) => {
                    warn!("Failed to rename {:?} to {:?}: {}", path, name, e);
                    path.to_path_buf()
                }
            }
        };

        let thumbnail = self.fetch_cover(&info.title, &path).await;
        let display_title = Some(naming::shorten_title(&info.title, self.max_title_length));

        Enrichment {
            path,
            info: Some(info),
            thumbnail,
            display_title,
        }
    }

    async fn lookup(catalog: &dyn CoverCatalog, search: &str) -> Option<String> {
        match catalog.cover_url(search).await {
            Ok(url) => url,
            Err(e) => {
                warn!("{} lookup for {:?} failed: {}", catalog.name(), search, e);
                None
            }
        }
    }

    /// Look the title up (once more with separators removed if needed) and
    /// save the cover as `<stem>_cover.jpg` next to the file.
    async fn fetch_cover(&self, title: &str, path: &Path) -> Option<PathBuf> {
        let catalog = self.catalog.as_deref()?;

        let url = match Self::lookup(catalog, title).await {
            Some(url) => url,
            None => {
                let fallback = naming::fallback_query(title);
                if fallback == title {
                    info!("No cover found for {:?}", title);
                    return None;
                }
                Self::lookup(catalog, &fallback).await?
            }
        };

        let image = match catalog.fetch_image(&url).await {
            Ok(image) => image,
            Err(e) => {
                warn!("Failed to download cover {}: {}", url, e);
                return None;
            }
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let cover = path.with_file_name(format!("{}_cover.jpg", stem));

        match tokio::fs::write(&cover, &image).await {
            Ok(()) => {
                info!("Saved cover {:?}", cover);
                Some(cover)
            }
            Err(e) => {
                warn!("Failed to save cover {:?}: {}", cover, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::provider::CatalogError;
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;

    struct FakeCatalog {
        known: Option<&'static str>,
        fail: bool,
        queries: Mutex<Vec<String>>,
    }

    impl FakeCatalog {
        fn new(known: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                known,
                fail: false,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CoverCatalog for FakeCatalog {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn cover_url(&self, search: &str) -> Result<Option<String>, CatalogError> {
            self.queries.lock().push(search.to_string());
            if self.fail {
                return Err(CatalogError::Status(500));
            }
            Ok((self.known == Some(search)).then(|| "https://img/cover.jpg".to_string()))
        }

        async fn fetch_image(&self, _url: &str) -> Result<Bytes, CatalogError> {
            Ok(Bytes::from_static(b"jpeg"))
        }
    }

    fn config() -> MetadataConfig {
        MetadataConfig::default()
    }

    #[tokio::test]
    async fn test_renames_and_fetches_cover() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Show_S01E02.mkv");
        std::fs::write(&source, b"video").unwrap();

        let catalog = FakeCatalog::new(Some("Show"));
        let enricher = Enricher::new(Some(catalog.clone()), &config());
        let result = enricher.enrich(&source, Service::Crunchy).await;

        let renamed = dir.path().join("[CR] Show - S01E02 [1080p].mkv");
        assert_eq!(result.path, renamed);
        assert!(renamed.exists());
        assert!(!source.exists());

        let cover = dir.path().join("[CR] Show - S01E02 [1080p]_cover.jpg");
        assert_eq!(result.thumbnail.as_deref(), Some(cover.as_path()));
        assert_eq!(std::fs::read(&cover).unwrap(), b"jpeg");
        assert_eq!(result.display_title.as_deref(), Some("Show"));
        assert_eq!(*catalog.queries.lock(), vec!["Show".to_string()]);
    }

    #[tokio::test]
    async fn test_fallback_query_used_once() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Attack on Titan: Final Season - 28 [1080p].mkv");
        std::fs::write(&source, b"video").unwrap();

        let catalog = FakeCatalog::new(Some("Attack on Titan Final Season"));
        let enricher = Enricher::new(Some(catalog.clone()), &config());
        let result = enricher.enrich(&source, Service::Hidive).await;

        assert!(result.thumbnail.is_some());
        assert_eq!(result.display_title.as_deref(), Some("Attack on Titan"));
        assert_eq!(
            *catalog.queries.lock(),
            vec![
                "Attack on Titan: Final Season".to_string(),
                "Attack on Titan Final Season".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_catalog_failure_degrades_to_no_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Show_S01E02.mkv");
        std::fs::write(&source, b"video").unwrap();

        let catalog = Arc::new(FakeCatalog {
            known: None,
            fail: true,
            queries: Mutex::new(Vec::new()),
        });
        let enricher = Enricher::new(Some(catalog), &config());
        let result = enricher.enrich(&source, Service::Crunchy).await;

        assert!(result.path.ends_with("[CR] Show - S01E02 [1080p].mkv"));
        assert!(result.thumbnail.is_none());
    }

    #[tokio::test]
    async fn test_unparseable_name_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("[Group] [1080p].mkv");
        std::fs::write(&source, b"video").unwrap();

        let enricher = Enricher::new(None, &config());
        let result = enricher.enrich(&source, Service::Crunchy).await;

        assert_eq!(result, Enrichment::unchanged(&source));
        assert!(source.exists());
    }
}
