//! HTTP router tests.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use trisearch::config::{CollaboratorSpec, Config};
use trisearch::{create_combined_router, Dispatcher};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{bing_body, custom_body, google_body, mock_config, BING_PATH, GOOGLE_PATH};

fn router(config: &Config) -> Router {
    let dispatcher = Dispatcher::from_config(config).unwrap();
    create_combined_router(dispatcher, config)
}

async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(router, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_blank_query_is_500_without_upstream_calls() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = router(&mock_config(&server));

    for uri in [
        "/search/google?query=%20%20",
        "/search/bing",
        "/search/custom/model?query=",
        "/search?query=%09",
    ] {
        let (status, body) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(body, json!({"error": "Query must not be empty"}));
    }
}

#[tokio::test]
async fn test_unknown_mode_is_500_without_upstream_calls() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = router(&mock_config(&server));

    let (status, body) = get_json(app.clone(), "/search/custom/model?query=nile&model=bm25").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Unknown relevance model: bm25");

    let (status, body) = get_json(app.clone(), "/search/custom/clustering?query=nile").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    let (status, body) = get_json(app, "/search?query=nile&expand_query=fuzzy").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_rejected_query_string_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = router(&mock_config(&server));

    for uri in [
        "/search/google?query=nile&query=congo",
        "/search/custom/model?query=nile&model=hits&model=vector",
        "/search?query=a&query=b",
    ] {
        let (status, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        let body: Value = serde_json::from_slice(&body).unwrap();
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("query string"), "{}", error);
    }
}

#[tokio::test]
async fn test_google_passthrough() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GOOGLE_PATH))
        .and(query_param("q", "blue nile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(google_body()))
        .mount(&server)
        .await;
    let app = router(&mock_config(&server));

    let (status, body) = get_json(app, "/search/google?query=blue%20nile").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, google_body());
}

#[tokio::test]
async fn test_bing_upstream_failure_is_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BING_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let app = router(&mock_config(&server));

    let (status, body) = get_json(app, "/search/bing?query=nile").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to fetch bing results"}));
}

#[tokio::test]
async fn test_custom_model_default_is_vector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search/vector"))
        .respond_with(ResponseTemplate::new(200).set_body_json(custom_body()))
        .expect(1)
        .mount(&server)
        .await;
    let app = router(&mock_config(&server));

    let (status, body) = get_json(app, "/search/custom/model?query=nile&model=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, custom_body());
}

#[cfg(unix)]
#[tokio::test]
async fn test_clustering_non_json_output_is_500() {
    let server = MockServer::start().await;
    let mut config = mock_config(&server);
    config.collaborators.clustering =
        Some(crate::common::sh_collaborator("echo 'clusters: 3'"));
    let app = router(&config);

    let (status, body) = get_json(app, "/search/custom/clustering?query=nile&cluster=kmeans").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Failed to parse collaborator output"), "{}", error);
}

#[tokio::test]
async fn test_http_clustering_non_json_is_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cluster"))
        .and(query_param("query", "nile"))
        .and(query_param("param", "kmeans"))
        .respond_with(ResponseTemplate::new(200).set_body_string("clusters: 3"))
        .expect(1)
        .mount(&server)
        .await;
    let mut config = mock_config(&server);
    config.collaborators.clustering = Some(CollaboratorSpec::Http {
        url: format!("{}/cluster", server.uri()),
    });
    let app = router(&config);

    let (status, body) = get_json(app, "/search/custom/clustering?query=nile&cluster=kmeans").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Failed to parse collaborator output"), "{}", error);
}

#[cfg(unix)]
#[tokio::test]
async fn test_expansion_passthrough() {
    let server = MockServer::start().await;
    let mut config = mock_config(&server);
    config.collaborators.expansion = Some(crate::common::sh_collaborator(
        r#"printf '{"expanded_query": "%s river"}' "$0""#,
    ));
    let app = router(&config);

    let (status, body) =
        get_json(app, "/search/custom/expansion?query=nile&expand_query=association").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"expanded_query": "nile river"}));
}

#[tokio::test]
async fn test_unconfigured_collaborator_is_500() {
    let server = MockServer::start().await;
    let app = router(&mock_config(&server));

    let (status, body) =
        get_json(app, "/search/custom/expansion?query=nile&expand_query=scalar").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "No expansion collaborator configured");
}

#[tokio::test]
async fn test_aggregated_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GOOGLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(google_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(BING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/search/hybrid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(custom_body()))
        .mount(&server)
        .await;
    let app = router(&mock_config(&server));

    let (status, body) = get_json(app, "/search?query=nile&model=hybrid").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "nile");
    assert_eq!(body["mode"], json!({"kind": "relevance", "value": "hybrid"}));
    assert_eq!(body["custom"]["status"], "ok");
    assert_eq!(body["custom"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["google"]["items"][0]["url"], "https://en.wikipedia.org/wiki/Nile");
    assert_eq!(body["bing"]["status"], "ok");
    assert!(body["error"].is_null());
}

#[tokio::test]
async fn test_service_routes() {
    let config = Config::default();
    let app = router(&config);

    let (status, body) = get(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    let (status, body) = get_json(app.clone(), "/api").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "trisearch");

    let (status, body) = get(app.clone(), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("trisearch_uptime_seconds"));

    let (status, _) = get(app, "/ui").await;
    assert_eq!(status, StatusCode::OK);
}
