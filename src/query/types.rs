//! Query text and mode selection types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Trim a raw query and reject it if nothing is left.
pub fn normalize_query(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// Relevance Model
// ============================================================================

/// Ranking algorithm used by the custom relevance service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceModel {
    PageRank,
    Hits,
    Hybrid,
    /// Vector-space baseline, used when no model is chosen.
    #[default]
    Vector,
}

impl RelevanceModel {
    /// Value used in query parameters and the UI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PageRank => "page_rank",
            Self::Hits => "hits",
            Self::Hybrid => "hybrid",
            Self::Vector => "vector",
        }
    }

    /// Path segment of the relevance service endpoint.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::PageRank => "pagerank",
            Self::Hits => "hits",
            Self::Hybrid => "hybrid",
            Self::Vector => "vector",
        }
    }
}

impl FromStr for RelevanceModel {
    type Err = ValidationError;

    /// An empty value selects the vector baseline.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "page_rank" | "pagerank" => Ok(Self::PageRank),
            "hits" => Ok(Self::Hits),
            "hybrid" => Ok(Self::Hybrid),
            "" | "vector" => Ok(Self::Vector),
            other => Err(ValidationError::UnknownMode {
                kind: "relevance model",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RelevanceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Clustering
// ============================================================================

/// Clustering algorithm applied by the clustering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusteringAlgorithm {
    /// Flat k-means clustering.
    #[serde(rename = "kmeans")]
    KMeans,
    /// Hierarchical agglomerative clustering.
    #[serde(rename = "agglo")]
    Agglomerative,
}

impl ClusteringAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KMeans => "kmeans",
            Self::Agglomerative => "agglo",
        }
    }
}

impl FromStr for ClusteringAlgorithm {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "kmeans" => Ok(Self::KMeans),
            "agglo" => Ok(Self::Agglomerative),
            other => Err(ValidationError::UnknownMode {
                kind: "clustering algorithm",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ClusteringAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Query Expansion
// ============================================================================

/// Query expansion technique applied by the expansion collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionMethod {
    Association,
    Metric,
    Scalar,
}

impl ExpansionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Association => "association",
            Self::Metric => "metric",
            Self::Scalar => "scalar",
        }
    }
}

impl FromStr for ExpansionMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "association" => Ok(Self::Association),
            "metric" => Ok(Self::Metric),
            "scalar" => Ok(Self::Scalar),
            other => Err(ValidationError::UnknownMode {
                kind: "expansion method",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExpansionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Mode Selection
// ============================================================================

/// The single active customization of the custom search.
///
/// Selections are mutually exclusive: picking one replaces whatever was
/// selected before.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ModeSelection {
    /// Plain relevance search with the vector baseline.
    #[default]
    None,
    Relevance(RelevanceModel),
    Clustering(ClusteringAlgorithm),
    Expansion(ExpansionMethod),
}

impl ModeSelection {
    /// Build a selection from the optional request parameters.
    ///
    /// Blank values count as absent. When several are present, clustering
    /// wins over expansion, which wins over the relevance model.
    pub fn from_params(
        model: Option<&str>,
        cluster: Option<&str>,
        expand_query: Option<&str>,
    ) -> Result<Self, ValidationError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|v| !v.is_empty())
        }

        if let Some(cluster) = present(cluster) {
            return Ok(Self::Clustering(cluster.parse()?));
        }
        if let Some(method) = present(expand_query) {
            return Ok(Self::Expansion(method.parse()?));
        }
        match present(model) {
            Some(model) => Ok(Self::Relevance(model.parse()?)),
            None => Ok(Self::None),
        }
    }

    /// Model used for the relevance search in this mode.
    ///
    /// Expansion searches with the baseline because choosing an expansion
    /// method clears the model selection.
    pub fn relevance_model(&self) -> RelevanceModel {
        match self {
            Self::Relevance(model) => *model,
            _ => RelevanceModel::Vector,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> String {
        match self {
            Self::None => "none".to_string(),
            Self::Relevance(m) => format!("relevance:{}", m),
            Self::Clustering(c) => format!("clustering:{}", c),
            Self::Expansion(e) => format!("expansion:{}", e),
        }
    }
}
