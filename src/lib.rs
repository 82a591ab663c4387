//! trisearch: side-by-side search across a custom engine, Google and Bing.
//!
//! A single query is sent to three result sources at once: a local custom
//! search backend (relevance ranking, clustering or query expansion), Google
//! Custom Search and Bing through SerpAPI. Each source fills its own panel
//! and fails independently of the others.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod providers;
pub mod query;
pub mod web;

pub use api::{create_combined_router, create_rest_router, run_http, ApiState};
pub use config::Config;
pub use dispatch::{Dispatcher, ProviderOutcome, SearchOutcome, SearchRequest, SearchSession};
pub use error::{Result, TrisearchError};
pub use metrics::{get_metrics, Metrics};
pub use providers::{
    BingProvider, Collaborator, CustomProvider, GoogleProvider, ProviderKind, ResultSet,
    SearchProvider, SearchResultItem,
};
pub use query::{ClusteringAlgorithm, ExpansionMethod, ModeSelection, RelevanceModel};
pub use web::create_web_ui_router;
