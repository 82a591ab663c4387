//! Configuration settings for the trisearch proxy.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the Google Custom Search API key.
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
/// Environment variable holding the Google programmable search engine id.
pub const ENV_SEARCH_ENGINE_ID: &str = "SEARCH_ENGINE_ID";
/// Environment variable holding the SerpAPI key used for Bing.
pub const ENV_SERPAPI_API_KEY: &str = "SERPAPI_API_KEY";
/// Environment variable overriding the HTTP port.
pub const ENV_PORT: &str = "PORT";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub google: GoogleConfig,
    pub bing: BingConfig,
    pub custom: CustomSearchConfig,
    pub collaborators: CollaboratorsConfig,
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            PathBuf::from("trisearch.toml"),
            PathBuf::from("config.toml"),
            dirs::config_dir()
                .map(|p| p.join("trisearch/config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".trisearch/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Overlay credentials and port from the process environment.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay settings from an arbitrary variable source.
    ///
    /// Empty values are ignored so that a blank `GOOGLE_API_KEY=` line does
    /// not wipe a key from the config file.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_GOOGLE_API_KEY) {
            self.google.api_key = Some(key);
        }
        if let Some(cx) = get(ENV_SEARCH_ENGINE_ID) {
            self.google.search_engine_id = Some(cx);
        }
        if let Some(key) = get(ENV_SERPAPI_API_KEY) {
            self.bing.api_key = Some(key);
        }
        if let Some(port) = get(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{} is not a valid port: {}", ENV_PORT, port)))?;
        }

        self.validate()
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.google.base_url.is_empty() {
            return Err(ConfigError::MissingField("google.base_url".to_string()).into());
        }
        if self.bing.base_url.is_empty() {
            return Err(ConfigError::MissingField("bing.base_url".to_string()).into());
        }
        if self.custom.base_url.is_empty() {
            return Err(ConfigError::MissingField("custom.base_url".to_string()).into());
        }
        if self.custom.top_k == 0 {
            return Err(ConfigError::Invalid("custom.top_k must be > 0".to_string()).into());
        }

        for (name, timeout) in [
            ("google.timeout_secs", self.google.timeout_secs),
            ("bing.timeout_secs", self.bing.timeout_secs),
            ("custom.timeout_secs", self.custom.timeout_secs),
            ("collaborators.timeout_secs", self.collaborators.timeout_secs),
        ] {
            if timeout == 0 {
                return Err(ConfigError::Invalid(format!("{} must be > 0", name)).into());
            }
        }

        if self.collaborators.max_output_bytes == 0 {
            return Err(
                ConfigError::Invalid("collaborators.max_output_bytes must be > 0".to_string())
                    .into(),
            );
        }

        for (name, spec) in [
            ("collaborators.clustering", &self.collaborators.clustering),
            ("collaborators.expansion", &self.collaborators.expansion),
        ] {
            match spec {
                Some(CollaboratorSpec::Command { program, .. }) if program.trim().is_empty() => {
                    return Err(ConfigError::MissingField(format!("{}.program", name)).into());
                }
                Some(CollaboratorSpec::Http { url }) if url.trim().is_empty() => {
                    return Err(ConfigError::MissingField(format!("{}.url", name)).into());
                }
                _ => {}
            }
        }

        let prefix = self.web.path_prefix.trim_end_matches('/');
        if self.web.enabled && (!prefix.starts_with('/') || prefix.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "web.path_prefix must start with '/' and not be the root: {}",
                self.web.path_prefix
            ))
            .into());
        }

        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Allow cross-origin requests from any origin
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Google Custom Search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Custom Search JSON API endpoint
    pub base_url: String,
    /// API key (`GOOGLE_API_KEY`)
    pub api_key: Option<String>,
    /// Programmable search engine id (`SEARCH_ENGINE_ID`)
    pub search_engine_id: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/customsearch/v1".to_string(),
            api_key: None,
            search_engine_id: None,
            timeout_secs: 30,
        }
    }
}

/// Bing (via SerpAPI) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BingConfig {
    /// SerpAPI search endpoint
    pub base_url: String,
    /// SerpAPI key (`SERPAPI_API_KEY`)
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://serpapi.com/search.json".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// Custom relevance service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomSearchConfig {
    /// Base URL of the relevance service (endpoints live under `/search/...`)
    pub base_url: String,
    /// Number of results requested from the service
    pub top_k: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CustomSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            top_k: 10,
            timeout_secs: 30,
        }
    }
}

/// External clustering and query-expansion collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorsConfig {
    /// Upper bound on a single collaborator invocation, in seconds
    pub timeout_secs: u64,
    /// Largest accepted collaborator output, in bytes
    pub max_output_bytes: usize,
    /// Clustering collaborator (`{param}` is `kmeans` or `agglo`)
    pub clustering: Option<CollaboratorSpec>,
    /// Query-expansion collaborator (`{param}` is `association`, `metric` or `scalar`)
    pub expansion: Option<CollaboratorSpec>,
}

impl Default for CollaboratorsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            max_output_bytes: 4 * 1024 * 1024,
            clustering: Some(CollaboratorSpec::Command {
                program: "python3".to_string(),
                args: vec![
                    "clustering/main.py".to_string(),
                    "{query}".to_string(),
                    "{param}".to_string(),
                ],
                working_dir: None,
            }),
            expansion: Some(CollaboratorSpec::Command {
                program: "python3".to_string(),
                args: vec![
                    "expansion/query_expansion.py".to_string(),
                    "--query".to_string(),
                    "{query}".to_string(),
                    "--method".to_string(),
                    "{param}".to_string(),
                ],
                working_dir: None,
            }),
        }
    }
}

/// How a collaborator is invoked.
///
/// Command arguments may contain the `{query}` and `{param}` placeholders,
/// which are substituted per request. Each argument is passed to the child
/// as-is, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CollaboratorSpec {
    /// Spawn a process and parse its standard output as JSON.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        working_dir: Option<String>,
    },
    /// GET a local service with `query` and `param` query parameters.
    Http { url: String },
}

/// Embedded web UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Serve the embedded UI
    pub enabled: bool,
    /// Path prefix for UI routes
    pub path_prefix: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path_prefix: "/ui".to_string(),
        }
    }
}
