//! Web UI route handlers.

use axum::{http::header, response::IntoResponse, routing::get, Router};

use crate::config::WebConfig;
use crate::web::static_files::{render_index, serve_css, serve_js};

/// Create the web UI router.
///
/// Routes (under the configured prefix, `/ui` by default):
/// - GET /ui           - Search page
/// - GET /ui/style.css - CSS styles
/// - GET /ui/app.js    - JavaScript
pub fn create_web_ui_router(config: &WebConfig) -> Router {
    if !config.enabled {
        return Router::new();
    }

    let page = render_index(&config.path_prefix);
    let serve_index = move || {
        let page = page.clone();
        async move { ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], page).into_response() }
    };

    let web_routes = Router::new()
        .route("/", get(serve_index))
        .route("/style.css", get(serve_css))
        .route("/app.js", get(serve_js));

    Router::new().nest(&config.path_prefix, web_routes)
}
