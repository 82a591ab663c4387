//! Search provider trait and normalized result types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderError;

/// Where a result set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Custom,
    Google,
    Bing,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Google => "google",
            Self::Bing => "bing",
        }
    }
}

/// One normalized search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Score reported by the custom engine, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Cluster label assigned by the clustering collaborator, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

impl SearchResultItem {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            score: None,
            cluster: None,
        }
    }

    /// Normalize an untyped hit from any provider shape.
    ///
    /// Accepts `url` or `link` for the address and `snippet`,
    /// `meta_description` or `description` for the summary. Returns `None`
    /// for values that are not JSON objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| obj.get(*k).and_then(Value::as_str))
                .unwrap_or_default()
                .to_string()
        };

        let cluster = obj.get("cluster").and_then(|c| match c {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Some(Self {
            title: text(&["title"]),
            url: text(&["url", "link"]),
            snippet: text(&["snippet", "meta_description", "description"]),
            score: obj.get("score").and_then(Value::as_f64),
            cluster,
        })
    }
}

/// Ordered hits from a single provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub provider: ProviderKind,
    pub items: Vec<SearchResultItem>,
}

impl ResultSet {
    pub fn new(provider: ProviderKind, items: Vec<SearchResultItem>) -> Self {
        Self { provider, items }
    }

    pub fn empty(provider: ProviderKind) -> Self {
        Self::new(provider, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A general web search engine queried with plain text.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider identity used in result sets, logs and metrics.
    fn kind(&self) -> ProviderKind;

    /// Fetch the upstream response body unchanged.
    async fn fetch_raw(&self, query: &str) -> Result<Value, ProviderError>;

    /// Map an upstream response body to a result set.
    fn parse_results(&self, body: Value) -> Result<ResultSet, ProviderError>;

    /// Run a query and normalize the response.
    async fn search(&self, query: &str) -> Result<ResultSet, ProviderError> {
        let body = self.fetch_raw(query).await?;
        self.parse_results(body)
    }
}
