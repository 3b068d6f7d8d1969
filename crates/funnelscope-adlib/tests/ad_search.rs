//! Integration tests for `AdLibraryClient` against wiremock.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use funnelscope_adlib::{AdLibraryClient, AdLibraryError, AdTarget};

fn test_client(base_url: &str) -> AdLibraryClient {
    AdLibraryClient::new(base_url, "test-token", 5).expect("client construction")
}

fn ads_body(count: usize) -> serde_json::Value {
    let ads: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            json!({
                "page_name": "Sculpt Clinic",
                "ad_creative_bodies": [format!("Transform your body, ad {i}")],
                "ad_delivery_start_time": "2026-05-01",
                "media_type": if i % 2 == 0 { "VIDEO" } else { "IMAGE" },
                "cta_type": "BOOK_NOW"
            })
        })
        .collect();
    json!({ "data": ads })
}

#[tokio::test]
async fn page_id_lookup_returns_normalized_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ads_archive"))
        .and(query_param("search_page_ids", "12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&ads_body(2)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ads = client
        .search(&AdTarget::by_page_id("12345", "Sculpt Clinic"), 25)
        .await
        .unwrap();

    assert_eq!(ads.len(), 2);
    assert_eq!(ads[0].advertiser_name, "Sculpt Clinic");
    assert!(ads[0].has_video, "even-indexed fixture ad is VIDEO");
    assert!(!ads[1].has_video);
    assert_eq!(ads[0].cta_label.as_deref(), Some("BOOK_NOW"));
}

#[tokio::test]
async fn empty_page_id_result_falls_back_to_name_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ads_archive"))
        .and(query_param("search_page_ids", "12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({"data": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ads_archive"))
        .and(query_param("search_terms", "Sculpt Clinic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&ads_body(1)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ads = client
        .search(&AdTarget::by_page_id("12345", "Sculpt Clinic"), 25)
        .await
        .unwrap();

    assert_eq!(ads.len(), 1, "name search should have been attempted");
}

#[tokio::test]
async fn name_only_target_skips_page_id_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ads_archive"))
        .and(query_param("search_terms", "Sculpt Clinic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&ads_body(3)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ads = client
        .search(&AdTarget::by_name("Sculpt Clinic"), 25)
        .await
        .unwrap();
    assert_eq!(ads.len(), 3);
}

#[tokio::test]
async fn api_error_envelope_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ads_archive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "error": { "message": "Invalid access token", "code": 190 }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.search(&AdTarget::by_name("Anyone"), 10).await;

    match result {
        Err(AdLibraryError::ApiError(msg)) => assert!(msg.contains("Invalid access token")),
        other => panic!("expected ApiError, got: {other:?}"),
    }
}

#[tokio::test]
async fn non_2xx_status_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.search(&AdTarget::by_name("Anyone"), 10).await;
    assert!(matches!(result, Err(AdLibraryError::Http(_))));
}

#[tokio::test]
async fn limit_is_forwarded_to_the_archive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ads_archive"))
        .and(query_param("limit", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&ads_body(1)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ads = client.search_by_name("Sculpt Clinic", 7).await.unwrap();
    assert_eq!(ads.len(), 1);
}
