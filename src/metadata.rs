//! Front matter, inline `key:: value` annotations and file-derived keys.
//!
//! ```text
//! ---
//! title: "Weekly review"
//! priority: 2
//! ---
//! status:: open
//! **Owner**:: Jane
//! [due:: 2024-05-01] | [reviewed:: false]
//! Call Bob [phone:: 555-0100] about the [next step:: invoice]
//! ```

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::source::FileStat;
use crate::value::{Metadata, MetadataValue};

static BARE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+\s*::").expect("valid inline key pattern"));

const FRONT_MATTER_FENCE: &str = "---";

/// Splits a document into its front matter lines and its body.
///
/// Front matter only exists when the very first line is `---` and a later
/// line is `---` as well; otherwise the whole document is body.
pub fn split_front_matter(lines: &[String]) -> (&[String], &[String]) {
    if lines.first().map(String::as_str) != Some(FRONT_MATTER_FENCE) {
        return (&[], lines);
    }
    match lines[1..].iter().position(|l| l == FRONT_MATTER_FENCE) {
        Some(offset) => {
            let end = offset + 1;
            (&lines[1..end], &lines[end + 1..])
        }
        None => (&[], lines),
    }
}

/// Body lines of a document, front matter removed.
pub fn strip_front_matter(lines: &[String]) -> &[String] {
    split_front_matter(lines).1
}

/// Reads front matter and inline annotations of a document.
///
/// File-derived keys are not included; see [`add_file_metadata`].
pub fn extract_metadata(lines: &[String]) -> Metadata {
    let mut metadata = Metadata::new();
    let (front_matter, body) = split_front_matter(lines);

    for line in front_matter {
        parse_front_matter_line(line, &mut metadata);
    }
    for line in body {
        parse_inline_line(line.trim(), &mut metadata);
    }

    metadata
}

fn parse_front_matter_line(line: &str, metadata: &mut Metadata) {
    let Some((key, value)) = line.split_once(':') else {
        return;
    };
    let key = key.trim().to_lowercase();
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    metadata.insert(&key, MetadataValue::coerce(value));
}

/// Applies the first inline annotation form that matches `line`.
fn parse_inline_line(line: &str, metadata: &mut Metadata) {
    if !line.contains("::") {
        return;
    }

    if BARE_KEY.is_match(line) {
        parse_inline_pair(line, metadata);
    } else if line.starts_with("**") {
        parse_inline_pair(line.trim_matches(|c| c == '*' || c == ' '), metadata);
    } else if line.starts_with('[') {
        let inner = line.trim_matches(|c| c == '[' || c == ']' || c == ' ');
        for part in inner.split("] | [") {
            parse_inline_pair(part, metadata);
        }
    } else if line.contains('[') {
        let mut rest = line;
        while rest.contains('[') && rest.contains("::") {
            let Some(end) = rest.find(']') else {
                break;
            };
            let Some(start) = rest[..end].rfind('[') else {
                break;
            };
            parse_inline_pair(&rest[start + 1..end], metadata);
            rest = &rest[end + 1..];
        }
    }
}

fn parse_inline_pair(pair: &str, metadata: &mut Metadata) {
    let Some((key, value)) = pair.split_once("::") else {
        return;
    };
    let key = key
        .trim_matches('*')
        .trim()
        .to_lowercase()
        .replace(' ', "-");
    metadata.insert(&key, MetadataValue::coerce(value.trim()));
}

/// Injects the `file.*` keys, replacing any user key of the same name.
pub fn add_file_metadata(metadata: &mut Metadata, path: &Path, stat: &FileStat) {
    let display = path.display().to_string();
    let name = file_name(path);
    let folder = path
        .parent()
        .map(file_name)
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| ".".to_string());
    // Assumes a two-character extension such as `.md`.
    let char_count = name.chars().count();
    let shortname: String = name.chars().take(char_count.saturating_sub(3)).collect();

    metadata.insert("file.folder", folder);
    metadata.insert("file.path", display.clone());
    metadata.insert("file.name", name.clone());
    metadata.insert("file.shortname", shortname);
    metadata.insert("file.link", format!("[{}]({})", name, display));
    metadata.insert(
        "file.size",
        MetadataValue::Integer(i64::try_from(stat.size).unwrap_or(i64::MAX)),
    );
    metadata.insert("file.ctime", stat.created.to_rfc3339());
    metadata.insert("file.cday", stat.created.format("%Y-%m-%d").to_string());
    metadata.insert("file.mtime", stat.modified.to_rfc3339());
    metadata.insert("file.mday", stat.modified.format("%Y-%m-%d").to_string());
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
