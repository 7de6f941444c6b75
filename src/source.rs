//! Where documents come from.
//!
//! The engine never touches the filesystem directly; it goes through a
//! [`DocumentSource`], so embedders can serve documents from anywhere.
//! [`FsSource`] is the filesystem implementation used by the CLI.

use std::borrow::Cow;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::{Captures, Regex};

use crate::engine::ExecError;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)\}|\$(\w+)").expect("valid env var pattern"));

/// Size and timestamps of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub created: DateTime<Local>,
    pub modified: DateTime<Local>,
}

/// Provider of documents for the engine.
pub trait DocumentSource {
    /// Resolves one `FROM` entry to document paths, in a stable order.
    ///
    /// A file resolves to itself, a directory to the markdown files below it.
    fn resolve(&self, source: &str) -> Result<Vec<PathBuf>, ExecError>;

    /// Lines of a document, without line terminators.
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, ExecError>;

    fn stat(&self, path: &Path) -> Result<FileStat, ExecError>;
}

/// Documents on the local filesystem.
///
/// `~` and `$VAR` / `${VAR}` in sources are expanded before lookup and
/// directories are walked recursively for `*.md` files, entries of each
/// directory in name order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl FsSource {
    pub fn new() -> Self {
        FsSource
    }
}

impl DocumentSource for FsSource {
    fn resolve(&self, source: &str) -> Result<Vec<PathBuf>, ExecError> {
        let path = PathBuf::from(expand_path(source).as_ref());
        let metadata = fs::metadata(&path).map_err(|e| ExecError::path(&path, e))?;

        if metadata.is_dir() {
            let mut found = vec![];
            walk_markdown(&path, &mut found)?;
            tracing::debug!(source, documents = found.len(), "resolved directory");
            Ok(found)
        } else {
            Ok(vec![path])
        }
    }

    fn read_lines(&self, path: &Path) -> Result<Vec<String>, ExecError> {
        let bytes = fs::read(path).map_err(|e| ExecError::read(path, e))?;
        Ok(String::from_utf8_lossy(&bytes)
            .lines()
            .map(String::from)
            .collect())
    }

    fn stat(&self, path: &Path) -> Result<FileStat, ExecError> {
        let metadata = fs::metadata(path).map_err(|e| ExecError::read(path, e))?;
        let modified: DateTime<Local> = metadata
            .modified()
            .map_err(|e| ExecError::read(path, e))?
            .into();
        // Not every platform records a creation time.
        let created = metadata.created().map(DateTime::from).unwrap_or(modified);

        Ok(FileStat {
            size: metadata.len(),
            created,
            modified,
        })
    }
}

fn walk_markdown(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), ExecError> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| ExecError::path(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ExecError::path(dir, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| ExecError::path(&path, e))?;
        if file_type.is_dir() {
            walk_markdown(&path, found)?;
        } else if entry.file_name().to_string_lossy().ends_with(".md") {
            found.push(path);
        }
    }
    Ok(())
}

/// Expands a leading `~` and environment variable references.
///
/// Unset variables expand to nothing.
pub fn expand_path(source: &str) -> Cow<'_, str> {
    let source: Cow<'_, str> = match source.strip_prefix('~') {
        Some(rest) => match env::var("HOME") {
            Ok(home) => Cow::Owned(format!("{}{}", home, rest)),
            Err(_) => Cow::Borrowed(source),
        },
        None => Cow::Borrowed(source),
    };

    if !source.contains('$') {
        return source;
    }

    let expanded = ENV_VAR.replace_all(&source, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        env::var(name).unwrap_or_default()
    });
    Cow::Owned(expanded.into_owned())
}
