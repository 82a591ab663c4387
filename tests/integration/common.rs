//! Shared fixtures.

use serde_json::{json, Value};
use trisearch::config::{CollaboratorSpec, Config};
use wiremock::MockServer;

pub const GOOGLE_PATH: &str = "/customsearch/v1";
pub const BING_PATH: &str = "/search.json";

/// Configuration with every upstream pointed at `server` and no collaborators.
pub fn mock_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.google.base_url = format!("{}{}", server.uri(), GOOGLE_PATH);
    config.google.api_key = Some("google-key".to_string());
    config.google.search_engine_id = Some("engine-cx".to_string());
    config.google.timeout_secs = 5;
    config.bing.base_url = format!("{}{}", server.uri(), BING_PATH);
    config.bing.api_key = Some("serp-key".to_string());
    config.bing.timeout_secs = 5;
    config.custom.base_url = server.uri();
    config.custom.timeout_secs = 5;
    config.collaborators.clustering = None;
    config.collaborators.expansion = None;
    config.collaborators.timeout_secs = 10;
    config
}

/// A collaborator that runs `script` with `sh -c`.
///
/// The query and mode parameter are available as `$0` and `$1`.
pub fn sh_collaborator(script: &str) -> CollaboratorSpec {
    CollaboratorSpec::Command {
        program: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            script.to_string(),
            "{query}".to_string(),
            "{param}".to_string(),
        ],
        working_dir: None,
    }
}

pub fn google_body() -> Value {
    json!({
        "kind": "customsearch#search",
        "items": [
            {"title": "Nile - Wikipedia", "link": "https://en.wikipedia.org/wiki/Nile", "snippet": "The Nile is a major river."},
            {"title": "Nile River Facts", "link": "https://example.org/nile", "snippet": "Facts about the Nile."}
        ]
    })
}

pub fn bing_body() -> Value {
    json!({
        "search_metadata": {"status": "Success"},
        "organic_results": [
            {"position": 1, "title": "Nile | Britannica", "link": "https://www.britannica.com/place/Nile-River", "snippet": "Longest river in Africa."}
        ]
    })
}

pub fn custom_body() -> Value {
    json!({
        "results": [
            {"url": "https://africa.example/nile", "title": "The Nile", "meta_description": "River basin overview", "score": 0.91},
            {"url": "https://africa.example/lake-victoria", "title": "Lake Victoria", "meta_description": "Source of the White Nile", "score": 0.77}
        ]
    })
}
