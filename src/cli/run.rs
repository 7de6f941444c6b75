//! Run DQL queries against the filesystem

use std::io::Read;

use super::{metadata_to_json, tokens_to_json, CliError};
use crate::{Diagnostics, Engine, FsSource};

/// Picks the query text from the `--query` argument or piped input.
///
/// An argument always wins and `input` is then never read, so a caller that
/// keeps stdin open cannot stall the run. Piped input is only read when no
/// argument was given; blank input counts as no query.
pub fn resolve_query(
    query: Option<String>,
    piped: bool,
    mut input: impl Read,
) -> Result<String, CliError> {
    match query {
        Some(query) => {
            if piped {
                tracing::warn!("ignoring piped input, the query was given as a parameter");
            }
            Ok(query)
        }
        None if piped => {
            let mut buffer = String::new();
            input.read_to_string(&mut buffer)?;
            if buffer.trim().is_empty() {
                return Err(CliError::NoInput);
            }
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}

/// Options for running a query
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// The DQL query to execute
    pub query: String,
    /// Include the token dump in the result
    pub show_tokens: bool,
    /// Include every document's metadata in the result
    pub show_metadata: bool,
}

/// Result of a query run
#[derive(Debug)]
pub struct RunResult {
    /// Rendered query result
    pub output: String,
    /// Token dump, if requested
    pub tokens: Option<serde_json::Value>,
    /// One `{"path", "metadata"}` object per loaded document, if requested
    pub metadata: Option<serde_json::Value>,
}

/// Execute a query against files on disk
pub fn run_query(options: &RunOptions) -> Result<RunResult, CliError> {
    let engine = Engine::new(FsSource::new()).with_diagnostics(Diagnostics {
        emit_tokens: options.show_tokens,
        emit_metadata: options.show_metadata,
    });

    let execution = engine.execute(options.query.trim())?;

    let metadata = options.show_metadata.then(|| {
        serde_json::Value::Array(
            execution
                .metadata
                .iter()
                .map(|doc| {
                    serde_json::json!({
                        "path": doc.path.display().to_string(),
                        "metadata": metadata_to_json(&doc.metadata),
                    })
                })
                .collect(),
        )
    });

    Ok(RunResult {
        output: execution.output,
        tokens: execution.tokens.as_deref().map(tokens_to_json),
        metadata,
    })
}
