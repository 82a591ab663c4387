//! Adapter for the local relevance service.
//!
//! The service exposes one POST endpoint per ranking model under
//! `/search/{pagerank,hits,hybrid,vector}` and answers with
//! `{"results": [{url, title, meta_description, score}]}`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::CustomSearchConfig;
use crate::error::{ProviderError, Result};
use crate::query::RelevanceModel;

use super::{build_client, decode_body, fetch_json};
use super::{ProviderKind, ResultSet, SearchResultItem};

/// Client for the custom relevance service.
pub struct CustomProvider {
    client: Client,
    base_url: String,
    top_k: usize,
}

#[derive(Debug, Serialize)]
struct RelevanceRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct RelevanceResponse {
    #[serde(default)]
    results: Option<Vec<RelevanceHit>>,
}

#[derive(Debug, Deserialize)]
struct RelevanceHit {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    meta_description: String,
    #[serde(default)]
    score: Option<f64>,
}

impl From<RelevanceHit> for SearchResultItem {
    fn from(hit: RelevanceHit) -> Self {
        SearchResultItem {
            score: hit.score,
            ..SearchResultItem::new(hit.title, hit.url, hit.meta_description)
        }
    }
}

impl CustomProvider {
    /// Create a provider from configuration.
    pub fn from_config(config: &CustomSearchConfig) -> Result<Self> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self::new(client, &config.base_url, config.top_k))
    }

    /// Create a provider with explicit parameters.
    pub fn new(client: Client, base_url: &str, top_k: usize) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            top_k,
        }
    }

    /// Endpoint URL for a ranking model.
    pub fn endpoint_url(&self, model: RelevanceModel) -> String {
        format!("{}/search/{}", self.base_url, model.endpoint())
    }

    /// POST the query to the model's endpoint and return the body unchanged.
    pub async fn fetch_raw(
        &self,
        query: &str,
        model: RelevanceModel,
    ) -> std::result::Result<Value, ProviderError> {
        let request = self
            .client
            .post(self.endpoint_url(model))
            .json(&RelevanceRequest {
                query,
                top_k: self.top_k,
            });

        fetch_json(ProviderKind::Custom, request).await
    }

    /// Run a relevance search and normalize the hits.
    pub async fn search(
        &self,
        query: &str,
        model: RelevanceModel,
    ) -> std::result::Result<ResultSet, ProviderError> {
        let body = self.fetch_raw(query, model).await?;
        Self::parse_results(body)
    }

    /// Map a `{"results": [...]}` body to a result set.
    pub fn parse_results(body: Value) -> std::result::Result<ResultSet, ProviderError> {
        let response: RelevanceResponse = decode_body(ProviderKind::Custom, body)?;
        let items = response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(SearchResultItem::from)
            .collect();
        Ok(ResultSet::new(ProviderKind::Custom, items))
    }
}
