//! Aggregation dispatcher.
//!
//! Runs one query against the custom engine, Google and Bing, and joins the
//! three independently completing results into a single [`SearchOutcome`].

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;

use crate::config::Config;
use crate::error::{CollaboratorError, Result, TrisearchError, ValidationError};
use crate::metrics::get_metrics;
use crate::providers::{
    cluster_results, BingProvider, Collaborator, CustomProvider, ExpansionOutput, GoogleProvider,
    ResultSet, SearchProvider, SearchResultItem,
};
use crate::query::{normalize_query, ClusteringAlgorithm, ExpansionMethod, ModeSelection};

/// One user submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub mode: ModeSelection,
    /// Token identifying this submission; echoed back in the outcome.
    #[serde(default)]
    pub generation: u64,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, mode: ModeSelection) -> Self {
        Self {
            query: query.into(),
            mode,
            generation: 0,
        }
    }

    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

/// Result of one provider within an aggregated search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderOutcome {
    Ok(ResultSet),
    Failed { error: String },
    /// Not attempted because the request was rejected.
    Skipped,
}

impl ProviderOutcome {
    fn from_result(result: Result<ResultSet>) -> Self {
        match result {
            Ok(set) => Self::Ok(set),
            Err(e) => Self::Failed {
                error: e.client_message(),
            },
        }
    }

    /// Hits, empty unless the provider succeeded.
    pub fn items(&self) -> &[SearchResultItem] {
        match self {
            Self::Ok(set) => &set.items,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

/// Aggregated result of one submission.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub generation: u64,
    /// Query as sent to Google and Bing (trimmed).
    pub query: String,
    pub mode: ModeSelection,
    pub custom: ProviderOutcome,
    pub google: ProviderOutcome,
    pub bing: ProviderOutcome,
    /// Rewritten query, present only in expansion mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded_query: Option<String>,
    /// First failure in custom, google, bing order, or the validation message.
    pub error: Option<String>,
    pub took_ms: u64,
}

impl SearchOutcome {
    fn rejected(request: &SearchRequest, err: ValidationError) -> Self {
        Self {
            generation: request.generation,
            query: request.query.clone(),
            mode: request.mode,
            custom: ProviderOutcome::Skipped,
            google: ProviderOutcome::Skipped,
            bing: ProviderOutcome::Skipped,
            expanded_query: None,
            error: Some(err.to_string()),
            took_ms: 0,
        }
    }

    /// Whether every provider returned results.
    pub fn all_ok(&self) -> bool {
        self.custom.is_ok() && self.google.is_ok() && self.bing.is_ok()
    }
}

/// Fans a query out to the custom engine, Google and Bing.
pub struct Dispatcher {
    google: Arc<dyn SearchProvider>,
    bing: Arc<dyn SearchProvider>,
    custom: CustomProvider,
    clustering: Option<Collaborator>,
    expansion: Option<Collaborator>,
}

impl Dispatcher {
    /// Build all providers and collaborators from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let collaborators = &config.collaborators;

        let mut dispatcher = Self::new(
            Arc::new(GoogleProvider::from_config(&config.google)?),
            Arc::new(BingProvider::from_config(&config.bing)?),
            CustomProvider::from_config(&config.custom)?,
        );
        if let Some(spec) = &collaborators.clustering {
            dispatcher = dispatcher.with_clustering(
                Collaborator::new("clustering", spec.clone(), collaborators.timeout_secs)?
                    .with_max_output_bytes(collaborators.max_output_bytes),
            );
        }
        if let Some(spec) = &collaborators.expansion {
            dispatcher = dispatcher.with_expansion(
                Collaborator::new("expansion", spec.clone(), collaborators.timeout_secs)?
                    .with_max_output_bytes(collaborators.max_output_bytes),
            );
        }

        if config.google.api_key.is_none() || config.google.search_engine_id.is_none() {
            tracing::warn!("Google credentials missing, Google results will fail");
        }
        if config.bing.api_key.is_none() {
            tracing::warn!("SerpAPI key missing, Bing results will fail");
        }

        Ok(dispatcher)
    }

    /// Create a dispatcher without collaborators.
    pub fn new(
        google: Arc<dyn SearchProvider>,
        bing: Arc<dyn SearchProvider>,
        custom: CustomProvider,
    ) -> Self {
        Self {
            google,
            bing,
            custom,
            clustering: None,
            expansion: None,
        }
    }

    pub fn with_clustering(mut self, collaborator: Collaborator) -> Self {
        self.clustering = Some(collaborator);
        self
    }

    pub fn with_expansion(mut self, collaborator: Collaborator) -> Self {
        self.expansion = Some(collaborator);
        self
    }

    pub fn google(&self) -> &dyn SearchProvider {
        self.google.as_ref()
    }

    pub fn bing(&self) -> &dyn SearchProvider {
        self.bing.as_ref()
    }

    pub fn custom(&self) -> &CustomProvider {
        &self.custom
    }

    /// Run the clustering collaborator and return its raw JSON.
    pub async fn run_clustering(
        &self,
        query: &str,
        algorithm: ClusteringAlgorithm,
    ) -> std::result::Result<Value, CollaboratorError> {
        let collaborator = self
            .clustering
            .as_ref()
            .ok_or(CollaboratorError::NotConfigured("clustering"))?;
        collaborator.invoke(query, algorithm.as_str()).await
    }

    /// Run the expansion collaborator and return its raw JSON.
    pub async fn run_expansion(
        &self,
        query: &str,
        method: ExpansionMethod,
    ) -> std::result::Result<Value, CollaboratorError> {
        let collaborator = self
            .expansion
            .as_ref()
            .ok_or(CollaboratorError::NotConfigured("expansion"))?;
        collaborator.invoke(query, method.as_str()).await
    }

    /// Run one aggregated search.
    ///
    /// An empty or whitespace-only query is rejected without any outbound
    /// call. Otherwise the custom branch, Google and Bing run concurrently
    /// and each records its own outcome; a failure in one never discards the
    /// others' results.
    pub async fn fetch_search_results(&self, request: &SearchRequest) -> SearchOutcome {
        let metrics = get_metrics();

        let query = match normalize_query(&request.query) {
            Ok(query) => query,
            Err(e) => {
                metrics.validation_failures_total.inc();
                tracing::debug!(generation = request.generation, "Rejected search: {}", e);
                return SearchOutcome::rejected(request, e);
            }
        };
        metrics.searches_total.inc();

        let span = tracing::info_span!(
            "search",
            request_id = %uuid::Uuid::new_v4(),
            generation = request.generation,
            mode = %request.mode.label(),
        );

        async {
            let start = Instant::now();

            let ((expanded_query, custom), google, bing) = tokio::join!(
                self.custom_branch(&query, request.mode),
                self.google.search(&query),
                self.bing.search(&query),
            );

            let custom = ProviderOutcome::from_result(custom);
            let google = ProviderOutcome::from_result(google.map_err(TrisearchError::from));
            let bing = ProviderOutcome::from_result(bing.map_err(TrisearchError::from));

            let error = [&custom, &google, &bing]
                .into_iter()
                .find_map(|o| o.error())
                .map(str::to_string);

            let took_ms = start.elapsed().as_millis() as u64;
            tracing::info!(
                custom = custom.items().len(),
                google = google.items().len(),
                bing = bing.items().len(),
                failed = error.is_some(),
                took_ms,
                "Search complete"
            );

            SearchOutcome {
                generation: request.generation,
                query: query.clone(),
                mode: request.mode,
                custom,
                google,
                bing,
                expanded_query,
                error,
                took_ms,
            }
        }
        .instrument(span)
        .await
    }

    /// Custom search for the active mode.
    ///
    /// Returns the expanded query (expansion mode only) alongside the
    /// results, so the rewrite is reported even if the relevance search
    /// after it fails.
    async fn custom_branch(
        &self,
        query: &str,
        mode: ModeSelection,
    ) -> (Option<String>, Result<ResultSet>) {
        match mode {
            ModeSelection::Clustering(algorithm) => (None, self.cluster(query, algorithm).await),
            ModeSelection::Expansion(method) => {
                let expanded = match self.expand(query, method).await {
                    Ok(expanded) => expanded,
                    Err(e) => return (None, Err(e)),
                };
                tracing::debug!(expanded_query = %expanded, "Query expanded");
                let results = self
                    .custom
                    .search(&expanded, mode.relevance_model())
                    .await
                    .map_err(TrisearchError::from);
                (Some(expanded), results)
            }
            ModeSelection::None | ModeSelection::Relevance(_) => {
                let results = self
                    .custom
                    .search(query, mode.relevance_model())
                    .await
                    .map_err(TrisearchError::from);
                (None, results)
            }
        }
    }

    async fn cluster(&self, query: &str, algorithm: ClusteringAlgorithm) -> Result<ResultSet> {
        let value = self.run_clustering(query, algorithm).await?;
        Ok(cluster_results(&value)?)
    }

    /// Ask the expansion collaborator for a rewritten query.
    ///
    /// Falls back to the original query when the collaborator answers
    /// without a usable `expanded_query`.
    async fn expand(&self, query: &str, method: ExpansionMethod) -> Result<String> {
        let value = self.run_expansion(query, method).await?;
        let output = ExpansionOutput::from_value(value)?;

        match output.expanded_query.as_deref().map(str::trim) {
            Some(expanded) if !expanded.is_empty() => Ok(expanded.to_string()),
            _ => {
                tracing::warn!("Expansion returned no expanded_query, using original query");
                Ok(query.to_string())
            }
        }
    }
}
