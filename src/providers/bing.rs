//! Bing adapter, served through SerpAPI.
//!
//! SerpAPI returns Bing hits under `organic_results`, not `items` like
//! Google does.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::{BingConfig, ENV_SERPAPI_API_KEY};
use crate::error::{ProviderError, Result};

use super::google::WebHit;
use super::{build_client, decode_body, fetch_json};
use super::{ProviderKind, ResultSet, SearchProvider, SearchResultItem};

/// Bing provider backed by the SerpAPI search endpoint.
pub struct BingProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Option<Vec<WebHit>>,
}

impl BingProvider {
    /// Create a provider from configuration.
    pub fn from_config(config: &BingConfig) -> Result<Self> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self::new(client, &config.base_url, config.api_key.clone()))
    }

    /// Create a provider with explicit parameters.
    pub fn new(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl SearchProvider for BingProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Bing
    }

    async fn fetch_raw(&self, query: &str) -> std::result::Result<Value, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials {
                provider: self.kind().as_str(),
                field: ENV_SERPAPI_API_KEY,
            })?;

        let request = self
            .client
            .get(&self.base_url)
            .query(&[("engine", "bing"), ("q", query), ("api_key", api_key)]);

        fetch_json(self.kind(), request).await
    }

    fn parse_results(&self, body: Value) -> std::result::Result<ResultSet, ProviderError> {
        let response: SerpApiResponse = decode_body(self.kind(), body)?;
        let items = response
            .organic_results
            .unwrap_or_default()
            .into_iter()
            .map(SearchResultItem::from)
            .collect();
        Ok(ResultSet::new(ProviderKind::Bing, items))
    }
}
