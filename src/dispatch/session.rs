//! Search session state: the form and result panels of one user.
//!
//! The session owns the query text, the exclusive mode selection and the
//! three result panels. Every submission gets a new generation number, and
//! outcomes carrying an older generation are discarded, so a slow response
//! to an earlier submission can never overwrite a newer one.

use serde::Serialize;

use crate::error::ValidationError;
use crate::providers::SearchResultItem;
use crate::query::{
    normalize_query, ClusteringAlgorithm, ExpansionMethod, ModeSelection, RelevanceModel,
};

use super::{Dispatcher, SearchOutcome, SearchRequest};

/// UI-visible state for one user.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchSession {
    query: String,
    mode: ModeSelection,
    loading: bool,
    error: Option<String>,
    custom: Vec<SearchResultItem>,
    google: Vec<SearchResultItem>,
    bing: Vec<SearchResultItem>,
    expanded_query: Option<String>,
    generation: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Replace the current mode, clearing any other selection.
    pub fn select(&mut self, mode: ModeSelection) {
        self.mode = mode;
    }

    pub fn select_relevance(&mut self, model: RelevanceModel) {
        self.select(ModeSelection::Relevance(model));
    }

    pub fn select_clustering(&mut self, algorithm: ClusteringAlgorithm) {
        self.select(ModeSelection::Clustering(algorithm));
    }

    pub fn select_expansion(&mut self, method: ExpansionMethod) {
        self.select(ModeSelection::Expansion(method));
    }

    /// Clear mode selections, query text, the error line and all result
    /// panels.
    ///
    /// Any submission still in flight is invalidated.
    pub fn reset(&mut self) {
        self.mode = ModeSelection::None;
        self.query.clear();
        self.error = None;
        self.expanded_query = None;
        self.clear_results();
        self.loading = false;
        self.generation += 1;
    }

    /// Start a submission.
    ///
    /// On an empty query the error is set and no request is produced.
    /// Otherwise every result panel is cleared before the request is handed
    /// out, and the session is marked loading.
    pub fn begin(&mut self) -> Result<SearchRequest, ValidationError> {
        let query = match normalize_query(&self.query) {
            Ok(query) => query,
            Err(e) => {
                self.error = Some(e.to_string());
                self.loading = false;
                return Err(e);
            }
        };

        self.clear_results();
        self.expanded_query = None;
        self.error = None;
        self.loading = true;
        self.generation += 1;

        Ok(SearchRequest::new(query, self.mode).with_generation(self.generation))
    }

    /// Apply an outcome. Returns `false` if it belonged to an older submission.
    pub fn complete(&mut self, outcome: SearchOutcome) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!(
                stale = outcome.generation,
                current = self.generation,
                "Discarding stale search outcome"
            );
            return false;
        }

        self.custom = outcome.custom.items().to_vec();
        self.google = outcome.google.items().to_vec();
        self.bing = outcome.bing.items().to_vec();
        self.expanded_query = outcome.expanded_query;
        self.error = outcome.error;
        self.loading = false;
        true
    }

    /// Begin, dispatch and complete one submission.
    ///
    /// Returns whether new results were applied.
    pub async fn submit(&mut self, dispatcher: &Dispatcher) -> bool {
        match self.begin() {
            Ok(request) => {
                let outcome = dispatcher.fetch_search_results(&request).await;
                self.complete(outcome)
            }
            Err(_) => false,
        }
    }

    fn clear_results(&mut self) {
        self.custom.clear();
        self.google.clear();
        self.bing.clear();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn mode(&self) -> ModeSelection {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn custom_results(&self) -> &[SearchResultItem] {
        &self.custom
    }

    pub fn google_results(&self) -> &[SearchResultItem] {
        &self.google
    }

    pub fn bing_results(&self) -> &[SearchResultItem] {
        &self.bing
    }

    pub fn expanded_query(&self) -> Option<&str> {
        self.expanded_query.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
