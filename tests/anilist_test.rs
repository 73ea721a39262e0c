//! AniList catalog tests against a mock GraphQL endpoint.

use std::sync::Arc;

use anidrop::config::MetadataConfig;
use anidrop::metadata::{AniListCatalog, CatalogError, CoverCatalog, Enricher};
use anidrop::pipeline::Service;
use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog(server: &MockServer) -> AniListCatalog {
    AniListCatalog::new(&MetadataConfig {
        endpoint: format!("{}/graphql", server.uri()),
        retries: 3,
        retry_backoff_secs: 0,
        timeout_secs: 5,
        ..MetadataConfig::default()
    })
}

fn cover(url: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": { "Media": { "coverImage": { "large": url } } }
    }))
}

fn searching(title: &str) -> impl wiremock::Match {
    body_partial_json(json!({ "variables": { "search": title } }))
}

#[tokio::test]
async fn test_cover_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(searching("Frieren"))
        .respond_with(cover("https://img.example/frieren.jpg"))
        .expect(1)
        .mount(&server)
        .await;

    let url = catalog(&server).cover_url("Frieren").await.unwrap();
    assert_eq!(url.as_deref(), Some("https://img.example/frieren.jpg"));
}

#[tokio::test]
async fn test_missing_media_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "Media": null },
            "errors": [{ "message": "Not Found.", "status": 404 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(catalog(&server).cover_url("Nothing").await.unwrap(), None);
}

#[tokio::test]
async fn test_not_found_status_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(catalog(&server).cover_url("Nothing").await.unwrap(), None);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(cover("https://img.example/late.jpg"))
        .mount(&server)
        .await;

    let url = catalog(&server).cover_url("Late").await.unwrap();
    assert_eq!(url.as_deref(), Some("https://img.example/late.jpg"));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_gives_up_after_configured_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let err = catalog(&server).cover_url("Down").await.unwrap_err();
    assert_matches!(err, CatalogError::Status(503));
}

#[tokio::test]
async fn test_enricher_saves_cover_next_to_renamed_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(searching("Show"))
        .respond_with(cover(&format!("{}/covers/show.jpg", server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/covers/show.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\xff\xd8jpeg".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("Show_S01E02.mkv");
    std::fs::write(&source, b"video").unwrap();

    let catalog: Arc<dyn CoverCatalog> = Arc::new(catalog(&server));
    let enricher = Enricher::new(Some(catalog), &MetadataConfig::default());
    let enrichment = enricher.enrich(&source, Service::Crunchy).await;

    assert_eq!(enrichment.path, dir.path().join("[CR] Show - S01E02 [1080p].mkv"));
    let thumbnail = enrichment.thumbnail.unwrap();
    assert_eq!(thumbnail, dir.path().join("[CR] Show - S01E02 [1080p]_cover.jpg"));
    assert_eq!(std::fs::read(thumbnail).unwrap(), b"\xff\xd8jpeg");
}
