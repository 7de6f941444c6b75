//! CLI support for dql-lang
//!
//! Provides programmatic access to the `dql` command so other tools can run
//! queries and get the same diagnostics the binary prints.

mod convert;
mod run;

pub use convert::{metadata_to_json, tokens_to_json};
pub use run::{resolve_query, run_query, RunOptions, RunResult};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Lexing, parsing or execution failed
    #[error("Error: {0}")]
    Query(#[from] crate::QueryError),

    /// Diagnostics could not be serialized
    #[error("Cannot serialize diagnostics: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Neither `--query` nor piped input
    #[error("No query provided. Use -q or --query, or pipe the query to stdin.")]
    NoInput,
}
