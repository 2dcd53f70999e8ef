//! Integration tests for `ListingApiClient` endpoints.
//!
//! Each test stands up a `wiremock` server, so no real backend is needed.
//! Covered: request shape (path, query, body) for every endpoint and the
//! mapping of non-2xx responses onto `ApiError`.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lapscout_client::{ApiError, ListingApiClient};
use lapscout_core::{FilterState, SpecValue, TriState};

fn test_client(server: &MockServer) -> ListingApiClient {
    ListingApiClient::with_base_url(&server.uri()).expect("failed to build test client")
}

fn listing_json(id: i64, price: f64) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Laptop {id}"),
        "brand": "LENOVO",
        "model": "Legion 5",
        "cpu": "Ryzen 7 5800H",
        "gpu": "RTX 3060",
        "ram": "16 Go",
        "ram_gb": 16,
        "storage": "512 Go SSD",
        "storage_gb": 512,
        "screen_size": 15.6,
        "refresh_rate": 165,
        "price": price,
        "last_price": null,
        "city": "Casablanca",
        "link": format!("https://example.com/ad/{id}"),
        "is_new": false,
        "is_sold": false,
        "is_new_listing": true,
        "laptop_score": 640
    })
}

// ---------------------------------------------------------------------------
// estimate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn estimate_posts_description_and_decodes_mixed_specs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/laptops/estimate"))
        .and(body_json(json!({"description": "asus rog i7 16gb rtx 3070"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "specs": {
                "brand": "asus",
                "ram_gb": 16,
                "is_ssd": true,
                "gpu": null
            },
            "scores": {"cpu_score": 720.0, "gpu_score": 810.0},
            "predicted_price": 12500.0,
            "confidence": "high",
            "features_found": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server)
        .estimate("asus rog i7 16gb rtx 3070")
        .await
        .expect("estimate should succeed");

    assert!((result.predicted_price - 12500.0).abs() < f64::EPSILON);
    assert_eq!(result.confidence, "high");
    assert_eq!(result.features_found, 4);
    assert_eq!(result.specs["brand"], SpecValue::Text("asus".to_owned()));
    assert_eq!(result.specs["is_ssd"].to_string(), "Yes");
    assert_eq!(result.specs["gpu"], SpecValue::Null);
    assert_eq!(
        result.score_rows(),
        vec![("cpu".to_owned(), 7.2), ("gpu".to_owned(), 8.1)]
    );
}

#[tokio::test]
async fn estimate_error_detail_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/laptops/estimate"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"detail": "Description too short"})),
        )
        .mount(&server)
        .await;

    let err = test_client(&server).estimate("pc").await.unwrap_err();
    assert!(
        matches!(err, ApiError::Backend { status: 422, ref detail } if detail == "Description too short"),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.to_string(), "Description too short");
}

#[tokio::test]
async fn error_without_detail_is_unknown_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/laptops/estimate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = test_client(&server).estimate("dell xps").await.unwrap_err();
    assert!(
        matches!(err, ApiError::UnknownBackend { status: 500 }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn malformed_success_body_is_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/refresh/counts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = test_client(&server).refresh_counts().await.unwrap_err();
    assert!(
        matches!(err, ApiError::Deserialize { ref context, .. } if context == "refresh counts"),
        "unexpected error: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// search endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_sends_query_limit_and_offset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search/search"))
        .and(query_param("q", "gaming laptop rtx"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [listing_json(1, 9000.0)],
            "total": 31
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = test_client(&server)
        .search("gaming laptop rtx", 20)
        .await
        .expect("search should succeed");

    assert_eq!(page.total, 31);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].display_brand(), "Lenovo");
}

#[tokio::test]
async fn filter_search_encodes_active_filters_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/filter/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
            "total": 0
        })))
        .mount(&server)
        .await;

    let filter = FilterState {
        brand: "hp".to_owned(),
        is_new: TriState::Yes,
        price_max: "8000".to_owned(),
        ..FilterState::default()
    };
    test_client(&server)
        .filter_search(&filter, 10, 0)
        .await
        .expect("filter search should succeed");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url.query(),
        Some("limit=10&offset=0&brand=hp&is_new=true&price_max=8000&price_min=1")
    );
}

#[tokio::test]
async fn filter_search_keeps_user_price_min_alongside_zero_price_guard() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/filter/search"))
        .and(query_param("price_min", "500"))
        .and(query_param("price_min", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
            "total": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = FilterState {
        price_min: "500".to_owned(),
        ..FilterState::default()
    };
    test_client(&server)
        .filter_search(&filter, 10, 0)
        .await
        .expect("filter search should succeed");
}

#[tokio::test]
async fn deals_page_requests_backend_deal_ordering() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/filter/search"))
        .and(query_param("price_min", "1"))
        .and(query_param("order_by", "deal_score"))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [listing_json(7, 4000.0)],
            "total": 12
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = test_client(&server)
        .deals_page(10)
        .await
        .expect("deals page should succeed");
    assert_eq!(page.total, 12);
}

#[tokio::test]
async fn null_fields_in_listing_decode_to_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 3, "brand": null, "price": null, "ram_gb": null}],
            "total": null
        })))
        .mount(&server)
        .await;

    let page = test_client(&server)
        .search("anything", 0)
        .await
        .expect("search should succeed");
    assert_eq!(page.total, 0);
    assert_eq!(page.results[0].display_brand(), "Unknown");
    assert!(page.results[0].price.abs() < f64::EPSILON);
}

// ---------------------------------------------------------------------------
// distinct values
// ---------------------------------------------------------------------------

#[tokio::test]
async fn distinct_values_uses_column_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/filter/distinct/cpu_family"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": ["i5", "i7", "Ryzen 7"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let values = test_client(&server)
        .distinct_values("cpu_family")
        .await
        .expect("distinct should succeed");
    assert_eq!(values, vec!["i5", "i7", "Ryzen 7"]);
}

// ---------------------------------------------------------------------------
// refresh endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_refresh_posts_page_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/refresh/start"))
        .and(query_param("pages", "500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "started": true,
            "message": "Refresh started"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client(&server)
        .start_refresh(500)
        .await
        .expect("start should succeed");
    assert!(response.started);
    assert_eq!(response.message, "Refresh started");
}

#[tokio::test]
async fn start_refresh_refusal_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/refresh/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "started": false,
            "message": "Refresh already running"
        })))
        .mount(&server)
        .await;

    let response = test_client(&server)
        .start_refresh(500)
        .await
        .expect("refusal is a normal response");
    assert!(!response.started);
    assert_eq!(response.message, "Refresh already running");
}

#[tokio::test]
async fn refresh_status_decodes_partial_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/refresh/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "running",
            "scraping_progress": 100.0,
            "scraping_complete": true,
            "parsing_progress": 42.5,
            "parsing_message": null
        })))
        .mount(&server)
        .await;

    let status = test_client(&server)
        .refresh_status()
        .await
        .expect("status should succeed");
    assert!(status.is_running());
    assert!(status.has_parsing_phase());
    assert!(status.parsing_message.is_empty());
    assert_eq!(status.new_count, 0);
}

#[tokio::test]
async fn refresh_counts_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/refresh/counts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "new_listings": 14,
            "sold_listings": 3,
            "price_changed": 5
        })))
        .mount(&server)
        .await;

    let counts = test_client(&server)
        .refresh_counts()
        .await
        .expect("counts should succeed");
    assert_eq!(counts.new_listings, 14);
    assert_eq!(counts.sold_listings, 3);
    assert_eq!(counts.price_changed, 5);
}

#[tokio::test]
async fn base_url_path_prefix_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/backend/api/refresh/counts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ListingApiClient::with_base_url(&format!("{}/backend", server.uri()))
        .expect("failed to build test client");
    let counts = client.refresh_counts().await.expect("counts should succeed");
    assert_eq!(counts.new_listings, 0);
}
