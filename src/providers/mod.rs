//! Search provider adapters.
//!
//! Each adapter builds the outbound request for one upstream and normalizes
//! that upstream's response shape into a [`ResultSet`].
//!
//! # Providers
//!
//! - [`GoogleProvider`]: Google Custom Search JSON API, hits under `items`.
//! - [`BingProvider`]: Bing through SerpAPI, hits under `organic_results`.
//! - [`CustomProvider`]: the local relevance service (page-rank, HITS,
//!   hybrid, vector), hits under `results` with `url`/`meta_description`.
//! - [`Collaborator`]: clustering and query-expansion programs or services
//!   that answer with JSON.

mod bing;
mod collaborator;
mod custom;
mod google;
mod traits;

pub use bing::BingProvider;
pub use collaborator::{cluster_results, parse_output, render_args, Collaborator, ExpansionOutput};
pub use custom::CustomProvider;
pub use google::GoogleProvider;
pub use traits::{ProviderKind, ResultSet, SearchProvider, SearchResultItem};

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::error::{ConfigError, ProviderError, Result};
use crate::metrics::get_metrics;

/// Build an HTTP client with a per-request timeout.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("trisearch/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ConfigError::Invalid(format!("Failed to create HTTP client: {}", e)))?;
    Ok(client)
}

/// Send a request and decode a JSON body, rejecting non-2xx responses.
pub(crate) async fn fetch_json(
    provider: ProviderKind,
    request: RequestBuilder,
) -> std::result::Result<Value, ProviderError> {
    let name = provider.as_str();
    let start = Instant::now();

    let result = async {
        let response = request
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: name,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::UpstreamStatus {
                provider: name,
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::Decode {
                provider: name,
                message: e.to_string(),
            })
    }
    .await;

    let elapsed = start.elapsed();
    get_metrics().record_provider_call(name, elapsed, result.is_ok());

    match &result {
        Ok(_) => tracing::debug!(
            provider = name,
            elapsed_ms = elapsed.as_millis() as u64,
            "Provider request succeeded"
        ),
        Err(e) => tracing::warn!(
            provider = name,
            elapsed_ms = elapsed.as_millis() as u64,
            detail = %e.detail(),
            "Provider request failed"
        ),
    }

    result
}

/// Decode a typed response body, reporting shape mismatches as decode errors.
pub(crate) fn decode_body<T: serde::de::DeserializeOwned>(
    provider: ProviderKind,
    body: Value,
) -> std::result::Result<T, ProviderError> {
    serde_json::from_value(body).map_err(|e| ProviderError::Decode {
        provider: provider.as_str(),
        message: e.to_string(),
    })
}
