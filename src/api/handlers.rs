//! REST API request handlers.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

use crate::dispatch::{Dispatcher, SearchRequest};
use crate::error::{CollaboratorError, ProviderError, ValidationError};
use crate::metrics::get_metrics;
use crate::query::{
    normalize_query, ClusteringAlgorithm, ExpansionMethod, ModeSelection, RelevanceModel,
};

/// Application state shared across handlers.
pub struct ApiState {
    /// Dispatcher holding every provider and collaborator.
    pub dispatcher: Dispatcher,
}

impl ApiState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters accepted by every search endpoint.
///
/// All fields are optional at the extractor level so that a missing query
/// produces the same JSON error body as a blank one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    /// Search query text.
    #[serde(default)]
    pub query: Option<String>,
    /// Relevance model (`page_rank`, `hits`, `hybrid`, `vector`).
    #[serde(default)]
    pub model: Option<String>,
    /// Clustering algorithm (`kmeans`, `agglo`).
    #[serde(default)]
    pub cluster: Option<String>,
    /// Expansion method (`association`, `metric`, `scalar`).
    #[serde(default)]
    pub expand_query: Option<String>,
}

impl SearchParams {
    fn query(&self) -> Result<String, ValidationError> {
        normalize_query(self.query.as_deref().unwrap_or_default())
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Parse a mode parameter; a missing value parses as the empty string.
fn parse_param<T>(value: Option<&str>) -> Result<T, ValidationError>
where
    T: FromStr<Err = ValidationError>,
{
    value.unwrap_or_default().parse()
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Validation failures share the 500 `{error}` contract of every other
/// failure; they return before any outbound call.
fn invalid_request(e: ValidationError) -> Response {
    get_metrics().validation_failures_total.inc();
    error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Unwrap the query-string extractor, turning a rejection into the JSON
/// error body instead of axum's plain-text default.
fn extract_params(
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> std::result::Result<SearchParams, Response> {
    match params {
        Ok(Query(params)) => Ok(params),
        Err(rejection) => {
            get_metrics().validation_failures_total.inc();
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                rejection.body_text(),
            ))
        }
    }
}

fn provider_response(result: Result<Value, ProviderError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn collaborator_response(result: Result<Value, CollaboratorError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

// ============================================================================
// Handler Functions
// ============================================================================

/// GET /search/google - Google Custom Search passthrough.
pub async fn google_handler(
    State(state): State<Arc<ApiState>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let params = match extract_params(params) {
        Ok(params) => params,
        Err(response) => return response,
    };
    let query = match params.query() {
        Ok(query) => query,
        Err(e) => return invalid_request(e),
    };
    provider_response(state.dispatcher.google().fetch_raw(&query).await)
}

/// GET /search/bing - Bing (SerpAPI) passthrough.
pub async fn bing_handler(
    State(state): State<Arc<ApiState>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let params = match extract_params(params) {
        Ok(params) => params,
        Err(response) => return response,
    };
    let query = match params.query() {
        Ok(query) => query,
        Err(e) => return invalid_request(e),
    };
    provider_response(state.dispatcher.bing().fetch_raw(&query).await)
}

/// GET /search/custom/model - Relevance search on the custom backend.
///
/// A missing or blank `model` uses the vector baseline.
pub async fn custom_model_handler(
    State(state): State<Arc<ApiState>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let params = match extract_params(params) {
        Ok(params) => params,
        Err(response) => return response,
    };
    let parsed = params
        .query()
        .and_then(|q| Ok((q, parse_param::<RelevanceModel>(params.model.as_deref())?)));
    let (query, model) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return invalid_request(e),
    };
    provider_response(state.dispatcher.custom().fetch_raw(&query, model).await)
}

/// GET /search/custom/clustering - Run the clustering collaborator.
pub async fn clustering_handler(
    State(state): State<Arc<ApiState>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let params = match extract_params(params) {
        Ok(params) => params,
        Err(response) => return response,
    };
    let parsed = params
        .query()
        .and_then(|q| Ok((q, parse_param::<ClusteringAlgorithm>(params.cluster.as_deref())?)));
    let (query, algorithm) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return invalid_request(e),
    };
    collaborator_response(state.dispatcher.run_clustering(&query, algorithm).await)
}

/// GET /search/custom/expansion - Run the query-expansion collaborator.
pub async fn expansion_handler(
    State(state): State<Arc<ApiState>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let params = match extract_params(params) {
        Ok(params) => params,
        Err(response) => return response,
    };
    let parsed = params
        .query()
        .and_then(|q| Ok((q, parse_param::<ExpansionMethod>(params.expand_query.as_deref())?)));
    let (query, method) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return invalid_request(e),
    };
    collaborator_response(state.dispatcher.run_expansion(&query, method).await)
}

/// GET /search - Aggregated search across all three panels.
///
/// Validation failures return 500 like the other endpoints. Once dispatched
/// the response is always 200; each provider reports its own status inside
/// the outcome.
pub async fn search_handler(
    State(state): State<Arc<ApiState>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let params = match extract_params(params) {
        Ok(params) => params,
        Err(response) => return response,
    };
    let mode = match ModeSelection::from_params(
        params.model.as_deref(),
        params.cluster.as_deref(),
        params.expand_query.as_deref(),
    ) {
        Ok(mode) => mode,
        Err(e) => return invalid_request(e),
    };
    let query = match params.query() {
        Ok(query) => query,
        Err(e) => return invalid_request(e),
    };

    let outcome = state
        .dispatcher
        .fetch_search_results(&SearchRequest::new(query, mode))
        .await;
    (StatusCode::OK, Json(outcome)).into_response()
}

/// GET /health - Liveness check.
pub async fn health_handler() -> &'static str {
    "OK"
}

/// GET /metrics - Prometheus text exposition.
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        get_metrics().export_prometheus(),
    )
}

/// GET /api - Endpoint listing.
pub async fn api_info_handler() -> Json<Value> {
    Json(serde_json::json!({
        "name": "trisearch",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Side-by-side custom, Google and Bing search",
        "endpoints": {
            "google": {
                "method": "GET",
                "path": "/search/google",
                "params": { "query": "Search query (required)" }
            },
            "bing": {
                "method": "GET",
                "path": "/search/bing",
                "params": { "query": "Search query (required)" }
            },
            "custom_model": {
                "method": "GET",
                "path": "/search/custom/model",
                "params": {
                    "query": "Search query (required)",
                    "model": "page_rank, hits, hybrid or vector (default: vector)"
                }
            },
            "custom_clustering": {
                "method": "GET",
                "path": "/search/custom/clustering",
                "params": {
                    "query": "Search query (required)",
                    "cluster": "kmeans or agglo"
                }
            },
            "custom_expansion": {
                "method": "GET",
                "path": "/search/custom/expansion",
                "params": {
                    "query": "Search query (required)",
                    "expand_query": "association, metric or scalar"
                }
            },
            "search": {
                "method": "GET",
                "path": "/search",
                "description": "Run all three searches and return every panel",
                "params": {
                    "query": "Search query (required)",
                    "model": "Relevance model",
                    "cluster": "Clustering algorithm",
                    "expand_query": "Expansion method"
                }
            },
            "health": { "method": "GET", "path": "/health" },
            "metrics": { "method": "GET", "path": "/metrics" }
        }
    }))
}
