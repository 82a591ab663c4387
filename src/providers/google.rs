//! Google Custom Search adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::{GoogleConfig, ENV_GOOGLE_API_KEY, ENV_SEARCH_ENGINE_ID};
use crate::error::{ProviderError, Result};

use super::{build_client, decode_body, fetch_json};
use super::{ProviderKind, ResultSet, SearchProvider, SearchResultItem};

/// Google Custom Search JSON API provider.
pub struct GoogleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    search_engine_id: Option<String>,
}

/// Response body, only the fields we render.
#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Option<Vec<WebHit>>,
}

/// Hit shape shared by Google and SerpAPI's Bing results.
#[derive(Debug, Deserialize)]
pub(super) struct WebHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl From<WebHit> for SearchResultItem {
    fn from(hit: WebHit) -> Self {
        SearchResultItem::new(hit.title, hit.link, hit.snippet)
    }
}

impl GoogleProvider {
    /// Create a provider from configuration.
    pub fn from_config(config: &GoogleConfig) -> Result<Self> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self::new(
            client,
            &config.base_url,
            config.api_key.clone(),
            config.search_engine_id.clone(),
        ))
    }

    /// Create a provider with explicit parameters.
    pub fn new(
        client: Client,
        base_url: &str,
        api_key: Option<String>,
        search_engine_id: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
            search_engine_id,
        }
    }
}

#[async_trait]
impl SearchProvider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn fetch_raw(&self, query: &str) -> std::result::Result<Value, ProviderError> {
        let provider = self.kind().as_str();
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials {
                provider,
                field: ENV_GOOGLE_API_KEY,
            })?;
        let cx = self
            .search_engine_id
            .as_deref()
            .ok_or(ProviderError::MissingCredentials {
                provider,
                field: ENV_SEARCH_ENGINE_ID,
            })?;

        let request = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("key", key), ("cx", cx)]);

        fetch_json(self.kind(), request).await
    }

    fn parse_results(&self, body: Value) -> std::result::Result<ResultSet, ProviderError> {
        let response: GoogleResponse = decode_body(self.kind(), body)?;
        let items = response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(SearchResultItem::from)
            .collect();
        Ok(ResultSet::new(ProviderKind::Google, items))
    }
}
