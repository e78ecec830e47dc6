//! Tests for page sources

use super::*;
use crate::config::SourceConfig;
use crate::error::Error;
use crate::types::{FetchedPage, Pagination, PaginationResult};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Song {
    id: u32,
    title: String,
}

fn source_for(server: &MockServer) -> HttpPageSource<Song> {
    let mut config = SourceConfig::new(format!("{}/api/songs", server.uri()), 10);
    config.max_retries = 0;
    HttpPageSource::new(config).unwrap()
}

// ============================================================================
// Closure sources
// ============================================================================

#[tokio::test]
async fn test_fn_source_forwards_arguments() {
    let source = source_fn(|_cancel, pagination: Pagination| async move {
        Ok(FetchedPage::new(
            vec![pagination.page, pagination.page_size],
            PaginationResult::new(pagination.page, pagination.page_size, 40),
        ))
    });

    let page = source
        .fetch(CancellationToken::new(), Pagination::new(2, 10))
        .await
        .unwrap();

    assert_eq!(page.items, vec![2, 10]);
    assert_eq!(page.pagination, PaginationResult::new(2, 10, 40));
}

#[tokio::test]
async fn test_fn_source_sees_cancellation() {
    let source = source_fn(|cancel: CancellationToken, _pagination| async move {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(FetchedPage::<u8>::empty())
    });

    let cancel = CancellationToken::new();
    assert!(source.fetch(cancel.clone(), Pagination::default()).await.is_ok());

    cancel.cancel();
    let err = source.fetch(cancel, Pagination::default()).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

// ============================================================================
// HTTP source
// ============================================================================

#[tokio::test]
async fn test_http_source_fetches_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/songs"))
        .and(query_param("page", "2"))
        .and(query_param("pagesize", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 3, "title": "Third"},
                {"id": 4, "title": "Fourth"}
            ],
            "pagination": {"page": 2, "page_size": 2, "total_records": 5, "total_pages": 3}
        })))
        .mount(&server)
        .await;

    let page = source_for(&server)
        .fetch(CancellationToken::new(), Pagination::new(2, 2))
        .await
        .unwrap();

    assert_eq!(
        page.items,
        vec![
            Song {
                id: 3,
                title: "Third".to_string()
            },
            Song {
                id: 4,
                title: "Fourth".to_string()
            },
        ]
    );
    assert_eq!(page.pagination, PaginationResult::new(2, 2, 5));
}

#[tokio::test]
async fn test_http_source_custom_names_and_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/albums"))
        .and(query_param("p", "1"))
        .and(query_param("limit", "3"))
        .and(header("X-API-Key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [1, 2, 3],
            "meta": {"page": 1, "page_size": 3, "total_records": 3, "total_pages": 1}
        })))
        .mount(&server)
        .await;

    let mut config = SourceConfig::new(format!("{}/albums", server.uri()), 3);
    config.page_param = "p".to_string();
    config.page_size_param = "limit".to_string();
    config.items_field = "results".to_string();
    config.pagination_field = "meta".to_string();
    config
        .headers
        .insert("X-API-Key".to_string(), "secret".to_string());
    let source: HttpPageSource<u32> = HttpPageSource::new(config).unwrap();

    let page = source
        .fetch(CancellationToken::new(), Pagination::new(1, 3))
        .await
        .unwrap();

    assert_eq!(page.items, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_http_source_null_data_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "pagination": {"page": 1, "page_size": 10, "total_records": 0, "total_pages": 0}
        })))
        .mount(&server)
        .await;

    let page = source_for(&server)
        .fetch(CancellationToken::new(), Pagination::new(1, 10))
        .await
        .unwrap();

    assert!(page.is_empty());
    assert_eq!(page.pagination.total_records, 0);
}

#[tokio::test]
async fn test_http_source_missing_pagination_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .fetch(CancellationToken::new(), Pagination::new(1, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().contains("pagination"));
}

#[tokio::test]
async fn test_http_source_rejects_non_object_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .fetch(CancellationToken::new(), Pagination::new(1, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_http_source_mistyped_items() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "not a number", "title": "x"}],
            "pagination": {"page": 1, "page_size": 10, "total_records": 1, "total_pages": 1}
        })))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .fetch(CancellationToken::new(), Pagination::new(1, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::JsonParse(_)));
}

#[tokio::test]
async fn test_http_source_propagates_status_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .fetch(CancellationToken::new(), Pagination::new(1, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 502, .. }));
}

#[tokio::test]
async fn test_http_source_honors_cancellation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({"data": [], "pagination": {}})),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = source_for(&server)
        .fetch(cancel, Pagination::new(1, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
}

#[test]
fn test_http_source_rejects_invalid_config() {
    let config = SourceConfig::new("http://localhost/songs", 0);
    assert!(HttpPageSource::<Song>::new(config).is_err());
}
