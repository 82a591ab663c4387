//! Error types for the trisearch proxy.

use thiserror::Error;

/// Main error type for trisearch operations.
#[derive(Error, Debug)]
pub enum TrisearchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Message shown for any failure of the custom search branch.
pub const CUSTOM_SEARCH_FAILED: &str = "Failed to fetch custom results";

impl TrisearchError {
    /// Message safe to show to clients.
    ///
    /// Provider and validation errors carry their own designated text;
    /// collaborator failures collapse to the generic custom-search message.
    pub fn client_message(&self) -> String {
        match self {
            Self::Provider(e) => e.to_string(),
            Self::Validation(e) => e.to_string(),
            Self::Collaborator(_) | Self::Serialization(_) => CUSTOM_SEARCH_FAILED.to_string(),
            Self::Config(_) | Self::Io(_) => "Internal server error".to_string(),
        }
    }
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Upstream search provider failures (Google, Bing, custom relevance service).
///
/// The display text is the provider's designated message; the detail is kept
/// in the variant for logging.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to fetch {provider} results")]
    UpstreamStatus { provider: &'static str, status: u16 },

    #[error("Failed to fetch {provider} results")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch {provider} results")]
    Decode {
        provider: &'static str,
        message: String,
    },

    #[error("Failed to fetch {provider} results")]
    MissingCredentials {
        provider: &'static str,
        field: &'static str,
    },
}

impl ProviderError {
    /// Provider name this error belongs to.
    pub fn provider(&self) -> &'static str {
        match self {
            Self::UpstreamStatus { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Decode { provider, .. }
            | Self::MissingCredentials { provider, .. } => provider,
        }
    }

    /// Detailed description for logs. Never shown to clients.
    pub fn detail(&self) -> String {
        match self {
            Self::UpstreamStatus { status, .. } => format!("upstream returned HTTP {}", status),
            Self::Transport { source, .. } => source.to_string(),
            Self::Decode { message, .. } => message.clone(),
            Self::MissingCredentials { field, .. } => format!("{} is not configured", field),
        }
    }
}

/// Failures of the external clustering / expansion collaborators.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("No {0} collaborator configured")]
    NotConfigured(&'static str),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Collaborator timed out after {0}s")]
    Timeout(u64),

    #[error("Collaborator produced no output (exit status: {status})")]
    EmptyOutput { status: String },

    #[error("Failed to parse collaborator output: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Unexpected collaborator output: {0}")]
    Shape(String),

    #[error("Collaborator output exceeded {0} bytes")]
    TooLarge(usize),

    #[error("Collaborator request failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request validation failures. No network call is made when these occur.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Unknown {kind}: {value}")]
    UnknownMode { kind: &'static str, value: String },
}

/// Result type alias for trisearch operations.
pub type Result<T> = std::result::Result<T, TrisearchError>;
