//! REST API router and server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{
    api_info_handler, bing_handler, clustering_handler, custom_model_handler, expansion_handler,
    google_handler, health_handler, metrics_handler, search_handler, ApiState,
};
use crate::config::{Config, ServerConfig};
use crate::dispatch::Dispatcher;
use crate::error::{ConfigError, Result};
use crate::web::create_web_ui_router;

/// Create the search API router.
///
/// Endpoints:
/// - GET /search/google?query=...            - Google JSON passthrough
/// - GET /search/bing?query=...              - Bing (SerpAPI) JSON passthrough
/// - GET /search/custom/model?query=&model=  - Custom relevance search
/// - GET /search/custom/clustering?query=&cluster=
/// - GET /search/custom/expansion?query=&expand_query=
/// - GET /search?query=...                   - All three panels at once
pub fn create_rest_router(state: Arc<ApiState>, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/search", get(search_handler))
        .route("/search/google", get(google_handler))
        .route("/search/bing", get(bing_handler))
        .route("/search/custom/model", get(custom_model_handler))
        .route("/search/custom/clustering", get(clustering_handler))
        .route("/search/custom/expansion", get(expansion_handler))
        .with_state(state);

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_origin(Any);

        router.layer(cors)
    } else {
        router
    }
}

/// Create the full application router: search API, service routes and web UI.
pub fn create_combined_router(dispatcher: Dispatcher, config: &Config) -> Router {
    let state = Arc::new(ApiState::new(dispatcher));
    let rest_router = create_rest_router(state, &config.server);

    let service_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/api", get(api_info_handler))
        .route("/metrics", get(metrics_handler));

    rest_router
        .merge(service_routes)
        .merge(create_web_ui_router(&config.web))
        .layer(TraceLayer::new_for_http())
}

/// Build the dispatcher from configuration and serve until shutdown.
pub async fn run_http(config: Config) -> Result<()> {
    let dispatcher = Dispatcher::from_config(&config)?;
    let app = create_combined_router(dispatcher, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            ConfigError::Invalid(format!(
                "Invalid listen address {}:{}: {}",
                config.server.host, config.server.port, e
            ))
        })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("trisearch listening on http://{}", addr);
    if config.web.enabled {
        tracing::info!("Web UI available at http://{}{}", addr, config.web.path_prefix);
    }

    axum::serve(listener, app).await?;

    tracing::info!("trisearch shutting down");
    Ok(())
}
