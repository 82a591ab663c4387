//! Provider adapter tests against mock upstreams.

use serde_json::json;
use trisearch::config::CollaboratorSpec;
use trisearch::error::CollaboratorError;
use trisearch::providers::{
    BingProvider, Collaborator, CustomProvider, GoogleProvider, ProviderKind, SearchProvider,
};
use trisearch::RelevanceModel;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{bing_body, custom_body, google_body, mock_config, BING_PATH, GOOGLE_PATH};

#[tokio::test]
async fn test_google_sends_credentials_and_preserves_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GOOGLE_PATH))
        .and(query_param("q", "nile river"))
        .and(query_param("key", "google-key"))
        .and(query_param("cx", "engine-cx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(google_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GoogleProvider::from_config(&mock_config(&server).google).unwrap();
    let set = provider.search("nile river").await.unwrap();

    assert_eq!(set.provider, ProviderKind::Google);
    assert_eq!(set.len(), 2);
    assert_eq!(set.items[0].title, "Nile - Wikipedia");
    assert_eq!(set.items[0].url, "https://en.wikipedia.org/wiki/Nile");
    assert_eq!(set.items[0].snippet, "The Nile is a major river.");
    assert_eq!(set.items[1].url, "https://example.org/nile");
}

#[tokio::test]
async fn test_google_passthrough_is_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GOOGLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(google_body()))
        .mount(&server)
        .await;

    let provider = GoogleProvider::from_config(&mock_config(&server).google).unwrap();
    assert_eq!(provider.fetch_raw("nile").await.unwrap(), google_body());
}

#[tokio::test]
async fn test_google_without_items_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GOOGLE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"searchInformation": {"totalResults": "0"}})),
        )
        .mount(&server)
        .await;

    let provider = GoogleProvider::from_config(&mock_config(&server).google).unwrap();
    assert!(provider.search("zzzz").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_google_error_status_uses_designated_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GOOGLE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": {"code": 403}})))
        .mount(&server)
        .await;

    let provider = GoogleProvider::from_config(&mock_config(&server).google).unwrap();
    let err = provider.search("nile").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch google results");
    assert_eq!(err.detail(), "upstream returned HTTP 403");
}

#[tokio::test]
async fn test_google_missing_credentials_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(google_body()))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = mock_config(&server).google;
    config.search_engine_id = None;
    let provider = GoogleProvider::from_config(&config).unwrap();

    let err = provider.search("nile").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch google results");
}

#[tokio::test]
async fn test_bing_uses_serpapi_contract() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(BING_PATH))
        .and(query_param("engine", "bing"))
        .and(query_param("q", "lake victoria"))
        .and(query_param("api_key", "serp-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = BingProvider::from_config(&mock_config(&server).bing).unwrap();
    let set = provider.search("lake victoria").await.unwrap();

    assert_eq!(set.provider, ProviderKind::Bing);
    assert_eq!(set.len(), 1);
    assert_eq!(set.items[0].title, "Nile | Britannica");
    assert_eq!(set.items[0].url, "https://www.britannica.com/place/Nile-River");
}

#[tokio::test]
async fn test_bing_ignores_items_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(BING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"title": "x", "link": "https://x.example", "snippet": ""}]
        })))
        .mount(&server)
        .await;

    let provider = BingProvider::from_config(&mock_config(&server).bing).unwrap();
    assert!(provider.search("x").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bing_malformed_body_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(BING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let provider = BingProvider::from_config(&mock_config(&server).bing).unwrap();
    let err = provider.search("x").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch bing results");
}

#[tokio::test]
async fn test_custom_posts_query_to_model_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search/pagerank"))
        .and(body_json(json!({"query": "nile", "top_k": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(custom_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = CustomProvider::from_config(&mock_config(&server).custom).unwrap();
    let set = provider.search("nile", RelevanceModel::PageRank).await.unwrap();

    assert_eq!(set.provider, ProviderKind::Custom);
    assert_eq!(set.len(), 2);
    assert_eq!(set.items[0].url, "https://africa.example/nile");
    assert_eq!(set.items[0].snippet, "River basin overview");
    assert_eq!(set.items[0].score, Some(0.91));
}

#[tokio::test]
async fn test_custom_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search/vector"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "index missing"})))
        .mount(&server)
        .await;

    let provider = CustomProvider::from_config(&mock_config(&server).custom).unwrap();
    let err = provider
        .search("nile", RelevanceModel::Vector)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch custom results");
}

fn http_collaborator(server: &MockServer, route: &str) -> Collaborator {
    let spec = CollaboratorSpec::Http {
        url: format!("{}{}", server.uri(), route),
    };
    Collaborator::new("clustering", spec, 5).unwrap()
}

#[tokio::test]
async fn test_http_collaborator_sends_query_and_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cluster"))
        .and(query_param("query", "rust {param} macros"))
        .and(query_param("param", "kmeans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"title": "Macros", "url": "https://doc.example/macros", "cluster": 2}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let value = http_collaborator(&server, "/cluster")
        .invoke("rust {param} macros", "kmeans")
        .await
        .unwrap();
    assert_eq!(value[0]["cluster"], 2);
}

#[tokio::test]
async fn test_http_collaborator_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cluster"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = http_collaborator(&server, "/cluster")
        .invoke("nile", "agglo")
        .await
        .unwrap_err();
    match err {
        CollaboratorError::Http(message) => assert!(message.contains("503"), "{}", message),
        other => panic!("expected an HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_collaborator_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cluster"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let err = http_collaborator(&server, "/cluster")
        .invoke("nile", "agglo")
        .await
        .unwrap_err();
    assert!(matches!(err, CollaboratorError::Parse(_)));
}

#[tokio::test]
async fn test_http_collaborator_output_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cluster"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[".repeat(256)))
        .mount(&server)
        .await;

    let err = http_collaborator(&server, "/cluster")
        .with_max_output_bytes(64)
        .invoke("nile", "agglo")
        .await
        .unwrap_err();
    assert!(matches!(err, CollaboratorError::TooLarge(64)));
}
