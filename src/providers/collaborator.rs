//! External clustering and query-expansion collaborators.
//!
//! A collaborator is either a program spawned once per request, whose
//! standard output is parsed as JSON after it exits, or a local HTTP service
//! answering GET requests with JSON. Which one is used comes from
//! configuration.

use std::process::Stdio;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::config::CollaboratorSpec;
use crate::error::{CollaboratorError, Result};
use crate::metrics::get_metrics;

use super::{build_client, ProviderKind, ResultSet, SearchResultItem};

/// Placeholder replaced with the user's query in command arguments.
pub const QUERY_PLACEHOLDER: &str = "{query}";
/// Placeholder replaced with the mode parameter in command arguments.
pub const PARAM_PLACEHOLDER: &str = "{param}";

/// Maximum number of output bytes echoed into logs on parse failure.
const LOGGED_OUTPUT_BYTES: usize = 512;

/// Default cap on collaborator output, in bytes.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 4 * 1024 * 1024;

/// A configured collaborator.
pub struct Collaborator {
    name: &'static str,
    spec: CollaboratorSpec,
    timeout: Duration,
    max_output_bytes: usize,
    client: Client,
}

/// Output of the query-expansion collaborator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpansionOutput {
    /// Rewritten query.
    #[serde(default)]
    pub expanded_query: Option<String>,
    /// Results some expansion scripts attach; not used for ranking.
    #[serde(default)]
    pub results: Option<Value>,
}

impl ExpansionOutput {
    /// Interpret collaborator JSON as expansion output.
    pub fn from_value(value: Value) -> std::result::Result<Self, CollaboratorError> {
        if !value.is_object() {
            return Err(CollaboratorError::Shape(
                "expansion output must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(CollaboratorError::Parse)
    }
}

impl Collaborator {
    /// Create a collaborator. `name` is used for logs and metrics.
    pub fn new(name: &'static str, spec: CollaboratorSpec, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            name,
            spec,
            timeout: Duration::from_secs(timeout_secs),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            client: build_client(timeout_secs)?,
        })
    }

    /// Cap the bytes read from the collaborator's output.
    pub fn with_max_output_bytes(mut self, max_output_bytes: usize) -> Self {
        self.max_output_bytes = max_output_bytes;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn spec(&self) -> &CollaboratorSpec {
        &self.spec
    }

    /// Invoke the collaborator and return its JSON output.
    pub async fn invoke(
        &self,
        query: &str,
        param: &str,
    ) -> std::result::Result<Value, CollaboratorError> {
        tracing::debug!(collaborator = self.name, param, "Invoking collaborator");

        let result = match &self.spec {
            CollaboratorSpec::Command {
                program,
                args,
                working_dir,
            } => {
                self.run_command(program, args, working_dir.as_deref(), query, param)
                    .await
            }
            CollaboratorSpec::Http { url } => self.call_http(url, query, param).await,
        };

        get_metrics().record_collaborator(self.name, result.is_ok());
        if let Err(e) = &result {
            tracing::warn!(collaborator = self.name, error = %e, "Collaborator failed");
        }
        result
    }

    async fn run_command(
        &self,
        program: &str,
        args: &[String],
        working_dir: Option<&str>,
        query: &str,
        param: &str,
    ) -> std::result::Result<Value, CollaboratorError> {
        let program = shellexpand::tilde(program).into_owned();

        let mut command = Command::new(&program);
        command
            .args(render_args(args, query, param))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = working_dir {
            command.current_dir(shellexpand::tilde(dir).as_ref());
        }

        let mut child = command
            .spawn()
            .map_err(|source| CollaboratorError::Spawn {
                program: program.clone(),
                source,
            })?;

        if let Some(stderr) = child.stderr.take() {
            let name = self.name;
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::warn!(collaborator = name, "stderr: {}", line);
                }
            });
        }

        let stdout = child.stdout.take().ok_or_else(|| {
            CollaboratorError::Io(std::io::Error::other("collaborator stdout not captured"))
        })?;
        let limit = self.max_output_bytes;

        // Returning early drops the child, which kills it.
        let run = async {
            let mut buf = Vec::new();
            stdout.take(limit as u64 + 1).read_to_end(&mut buf).await?;
            if buf.len() > limit {
                return Err(CollaboratorError::TooLarge(limit));
            }
            let status = child.wait().await?;
            Ok::<_, CollaboratorError>((buf, status))
        };
        let (stdout, status) = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| CollaboratorError::Timeout(self.timeout.as_secs()))??;

        if !status.success() {
            tracing::warn!(
                collaborator = self.name,
                status = %status,
                "Collaborator exited unsuccessfully"
            );
        }

        parse_output(&stdout, &status.to_string())
    }

    async fn call_http(
        &self,
        url: &str,
        query: &str,
        param: &str,
    ) -> std::result::Result<Value, CollaboratorError> {
        let response = self
            .client
            .get(url)
            .query(&[("query", query), ("param", param)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CollaboratorError::Timeout(self.timeout.as_secs())
                } else {
                    CollaboratorError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Http(format!(
                "{} returned HTTP {}",
                url,
                status.as_u16()
            )));
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_output_bytes as u64)
        {
            return Err(CollaboratorError::TooLarge(self.max_output_bytes));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| CollaboratorError::Http(e.to_string()))?;
        if body.len() > self.max_output_bytes {
            return Err(CollaboratorError::TooLarge(self.max_output_bytes));
        }
        parse_output(&body, status.as_str())
    }
}

/// Substitute the placeholders in each argument.
///
/// Substitution is textual, so `--q={query}` works. Each argument is scanned
/// once, left to right, so substituted text is never expanded again.
/// Arguments are passed to the child directly, never through a shell.
pub fn render_args(args: &[String], query: &str, param: &str) -> Vec<String> {
    args.iter().map(|arg| render_arg(arg, query, param)).collect()
}

fn render_arg(arg: &str, query: &str, param: &str) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix(QUERY_PLACEHOLDER) {
            out.push_str(query);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(PARAM_PLACEHOLDER) {
            out.push_str(param);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Parse accumulated collaborator output as JSON.
///
/// Surrounding whitespace is ignored. Empty output and invalid JSON are
/// errors, never panics.
pub fn parse_output(output: &[u8], status: &str) -> std::result::Result<Value, CollaboratorError> {
    let text = String::from_utf8_lossy(output);
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(CollaboratorError::EmptyOutput {
            status: status.to_string(),
        });
    }

    serde_json::from_str(trimmed).map_err(|e| {
        let mut end = trimmed.len().min(LOGGED_OUTPUT_BYTES);
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        tracing::warn!(output = &trimmed[..end], "Failed to parse collaborator output");
        CollaboratorError::Parse(e)
    })
}

/// Normalize clustering output into a result set.
///
/// Accepts a bare array of hits or an object with a `results` array.
pub fn cluster_results(value: &Value) -> std::result::Result<ResultSet, CollaboratorError> {
    let hits = match value {
        Value::Array(hits) => hits,
        Value::Object(obj) => match obj.get("results") {
            Some(Value::Array(hits)) => hits,
            _ => {
                return Err(CollaboratorError::Shape(
                    "expected an array of results".to_string(),
                ))
            }
        },
        _ => {
            return Err(CollaboratorError::Shape(
                "expected an array of results".to_string(),
            ))
        }
    };

    let items = hits.iter().filter_map(SearchResultItem::from_value).collect();
    Ok(ResultSet::new(ProviderKind::Custom, items))
}
