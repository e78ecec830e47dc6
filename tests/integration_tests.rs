//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: source config → HTTP page source →
//! aggregator → merged page

use page_aggregator::{
    fetch_paginated_external, load_config_from_str, Aggregator, Error, FetchedPage,
    HttpPageSource, Pagination, PaginationResult, SourceConfig,
};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

// ============================================================================
// Mock collection
// ============================================================================

/// Serves records `0..total` in windows of `window` records per page number
struct Collection {
    total: u64,
    window: u64,
    reverse_delay: bool,
}

impl Collection {
    fn new(total: u64, window: u64) -> Self {
        Self {
            total,
            window,
            reverse_delay: false,
        }
    }

    fn reversed(mut self) -> Self {
        self.reverse_delay = true;
        self
    }
}

fn query_u64(request: &Request, name: &str) -> u64 {
    request
        .url
        .query_pairs()
        .find(|(key, _)| key == name)
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(0)
}

impl Respond for Collection {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let page = query_u64(request, "page");
        let page_size = query_u64(request, "pagesize");

        let start = page.saturating_sub(1) * self.window;
        let end = (start + page_size).min(self.total).max(start);
        let data: Vec<Value> = (start..end)
            .map(|id| json!({"id": id, "title": format!("Song {id}")}))
            .collect();

        let mut response = ResponseTemplate::new(200).set_body_json(json!({
            "data": data,
            "pagination": {
                "page": page,
                "page_size": page_size,
                "total_records": self.total,
                "total_pages": self.total.div_ceil(page_size.max(1)),
            }
        }));
        if self.reverse_delay {
            response = response.set_delay(Duration::from_millis(20u64.saturating_sub(page) * 10));
        }
        response
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Song {
    id: u64,
    title: String,
}

async fn songs_server(collection: Collection) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/songs"))
        .respond_with(collection)
        .mount(&server)
        .await;
    server
}

fn song_source(server: &MockServer, external_page_size: u32) -> Arc<HttpPageSource<Song>> {
    let mut config = SourceConfig::new(format!("{}/api/songs", server.uri()), external_page_size);
    config.max_retries = 0;
    Arc::new(HttpPageSource::new(config).unwrap())
}

fn song_ids(page: &FetchedPage<Song>) -> Vec<u64> {
    page.items.iter().map(|song| song.id).collect()
}

async fn received_windows(server: &MockServer) -> Vec<(u64, u64)> {
    let mut windows: Vec<(u64, u64)> = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| (query_u64(r, "page"), query_u64(r, "pagesize")))
        .collect();
    windows.sort_unstable();
    windows
}

// ============================================================================
// End-to-end aggregation
// ============================================================================

#[tokio::test]
async fn test_aggregates_oversized_page_over_http() {
    let server = songs_server(Collection::new(100, 10)).await;
    let cancel = CancellationToken::new();

    let page = fetch_paginated_external(
        &cancel,
        song_source(&server, 10),
        Pagination::new(1, 25),
        10,
    )
    .await
    .unwrap();

    assert_eq!(song_ids(&page), (0..25).collect::<Vec<_>>());
    assert_eq!(page.items[24].title, "Song 24");
    assert_eq!(page.pagination, PaginationResult::new(1, 25, 100));
    assert_eq!(received_windows(&server).await, vec![(1, 10), (2, 10), (3, 5)]);
}

#[tokio::test]
async fn test_small_page_is_a_single_request() {
    let server = songs_server(Collection::new(100, 10)).await;
    let cancel = CancellationToken::new();

    let page = fetch_paginated_external(
        &cancel,
        song_source(&server, 10),
        Pagination::new(4, 10),
        10,
    )
    .await
    .unwrap();

    assert_eq!(song_ids(&page), (30..40).collect::<Vec<_>>());
    assert_eq!(page.pagination, PaginationResult::new(4, 10, 100));
    assert_eq!(received_windows(&server).await, vec![(4, 10)]);
}

#[tokio::test]
async fn test_stops_at_total_records() {
    let server = songs_server(Collection::new(18, 10)).await;
    let cancel = CancellationToken::new();

    let page = fetch_paginated_external(
        &cancel,
        song_source(&server, 10),
        Pagination::new(1, 25),
        10,
    )
    .await
    .unwrap();

    assert_eq!(page.len(), 18);
    assert_eq!(page.pagination.total_pages, 1);
    assert_eq!(received_windows(&server).await, vec![(1, 10), (2, 8)]);
}

#[tokio::test]
async fn test_out_of_order_responses_are_resequenced() {
    let server = songs_server(Collection::new(500, 10).reversed()).await;
    let cancel = CancellationToken::new();

    let page = fetch_paginated_external(
        &cancel,
        song_source(&server, 10),
        Pagination::new(1, 97),
        10,
    )
    .await
    .unwrap();

    assert_eq!(song_ids(&page), (0..97).collect::<Vec<_>>());
    assert_eq!(page.pagination, PaginationResult::new(1, 97, 500));
    assert_eq!(page.pagination.total_pages, 6);
}

#[tokio::test]
async fn test_upstream_failure_fails_the_whole_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/songs"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/songs"))
        .respond_with(Collection::new(100, 10))
        .with_priority(2)
        .mount(&server)
        .await;
    let cancel = CancellationToken::new();

    let err = fetch_paginated_external(
        &cancel,
        song_source(&server, 10),
        Pagination::new(1, 40),
        10,
    )
    .await
    .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "database unavailable");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
    // every follow-up was still issued
    assert_eq!(received_windows(&server).await.len(), 4);
}

#[tokio::test]
async fn test_configured_source_with_bounded_concurrency() {
    let server = songs_server(Collection::new(1_000, 20)).await;
    let config = load_config_from_str(&format!(
        r"
url: {}/api/songs
external_page_size: 20
max_concurrency: 3
max_retries: 0
",
        server.uri()
    ))
    .unwrap();

    let aggregator = Aggregator::new(config.aggregator());
    let source: HttpPageSource<Song> = HttpPageSource::new(config).unwrap();
    let cancel = CancellationToken::new();

    let page = aggregator
        .fetch(&cancel, Arc::new(source), Pagination::new(2, 150))
        .await
        .unwrap();

    // page 2 of 20-record windows starts at record 20
    assert_eq!(song_ids(&page), (20..170).collect::<Vec<_>>());
    assert_eq!(page.pagination, PaginationResult::new(2, 150, 1_000));
    assert_eq!(received_windows(&server).await.len(), 8);
}

#[tokio::test]
async fn test_dynamic_items_as_json_values() {
    let server = songs_server(Collection::new(30, 10)).await;
    let config = SourceConfig::new(format!("{}/api/songs", server.uri()), 10);
    let source: HttpPageSource<Value> = HttpPageSource::new(config).unwrap();
    let cancel = CancellationToken::new();

    let page = fetch_paginated_external(&cancel, Arc::new(source), Pagination::new(1, 30), 10)
        .await
        .unwrap();

    let envelope = serde_json::to_value(page.into_envelope()).unwrap();
    assert_eq!(envelope["data"].as_array().unwrap().len(), 30);
    assert_eq!(envelope["data"][29]["id"], 29);
    assert_eq!(
        envelope["pagination"],
        json!({"page": 1, "page_size": 30, "total_records": 30, "total_pages": 1})
    );
}
