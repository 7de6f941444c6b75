use std::collections::HashMap;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::{
    ast::{Direction, Query, QueryKind, Token},
    evaluator::Evaluator,
    lexer::Lexer,
    loader::{file_name, ContentUnit, DocumentMetadata, Loader},
    natural::natural_cmp,
    output::{render_groups, Table},
    parser::{ParseError, Parser},
    source::DocumentSource,
};

/// Errors raised while running a parsed query.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Cannot resolve path '{path}': {source}")]
    PathResolution { path: String, source: io::Error },

    #[error("Cannot read '{path}': {source}")]
    Read { path: String, source: io::Error },

    #[error("Unsupported unit kind for extraction: {0}")]
    UnsupportedUnitKind(QueryKind),
}

impl ExecError {
    pub fn path(path: &Path, source: io::Error) -> Self {
        ExecError::PathResolution {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn read(path: &Path, source: io::Error) -> Self {
        ExecError::Read {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Any error of the query pipeline.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Failed to parse query: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to execute query: {0}")]
    Exec(#[from] ExecError),
}

/// Side-channel output requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Keep the lexed token stream
    pub emit_tokens: bool,
    /// Keep the metadata of every loaded document
    pub emit_metadata: bool,
}

/// Result of running a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// The rendered result
    pub output: String,
    /// Lexed tokens, when [`Diagnostics::emit_tokens`] is set
    pub tokens: Option<Vec<Token>>,
    /// Per-document metadata, when [`Diagnostics::emit_metadata`] is set
    pub metadata: Vec<DocumentMetadata>,
}

/// Runs DQL queries against a [`DocumentSource`].
///
/// # Examples
///
/// ```no_run
/// use dql_lang::{Engine, FsSource};
///
/// let engine = Engine::new(FsSource::new());
/// let execution = engine.execute(r#"TASK FROM "todo.md" WHERE NOT CHECKED"#).unwrap();
/// println!("{}", execution.output);
/// ```
pub struct Engine<S: DocumentSource> {
    source: S,
    diagnostics: Diagnostics,
}

impl<S: DocumentSource> Engine<S> {
    pub fn new(source: S) -> Self {
        Engine {
            source,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Lexes, parses and runs a query.
    pub fn execute(&self, input: &str) -> Result<Execution, QueryError> {
        let mut parser = Parser::new(Lexer::new(input))?;
        let tokens = self
            .diagnostics
            .emit_tokens
            .then(|| parser.tokens().to_vec());
        let query = parser.parse_query()?;

        let mut loader = Loader::new(&self.source, self.diagnostics.emit_metadata);
        let output = self.run_with(&query, &mut loader)?;

        Ok(Execution {
            output,
            tokens,
            metadata: loader.into_recorded(),
        })
    }

    /// Runs an already parsed query and returns the rendered result.
    pub fn run(&self, query: &Query) -> Result<String, ExecError> {
        let mut loader = Loader::new(&self.source, false);
        self.run_with(query, &mut loader)
    }

    fn run_with(&self, query: &Query, loader: &mut Loader<'_, S>) -> Result<String, ExecError> {
        if query.kind.is_table() {
            self.run_table(query, loader)
        } else {
            self.run_units(query, loader)
        }
    }

    fn run_table(&self, query: &Query, loader: &mut Loader<'_, S>) -> Result<String, ExecError> {
        let with_file = query.kind == QueryKind::Table;

        let mut headers = vec![];
        if with_file {
            headers.push("File".to_string());
        }
        headers.extend(query.columns.iter().map(|c| c.alias.clone()));
        let mut table = Table::new(headers);

        for path in loader.resolve_all(&query.sources)? {
            let metadata = loader.load_metadata(&path)?;
            if !Evaluator::new("", &metadata).matches_clause(query.where_clause.as_ref()) {
                continue;
            }

            let mut row = vec![];
            if with_file {
                row.push(file_name(&path));
            }
            row.extend(
                query
                    .columns
                    .iter()
                    .map(|c| metadata.text(&c.name).unwrap_or_default()),
            );
            table.push_row(row);
        }

        let keys: Vec<(usize, Direction)> = query
            .sorts
            .iter()
            .filter_map(|spec| {
                let field = spec.field.as_deref()?;
                column_index(query, field).map(|index| (index, spec.direction))
            })
            .collect();
        table.sort_rows(&keys);

        Ok(table.render())
    }

    fn run_units(&self, query: &Query, loader: &mut Loader<'_, S>) -> Result<String, ExecError> {
        let mut units = loader.load_units(&query.sources, query.kind)?;

        if let Some(spec) = query.sorts.last() {
            match spec.direction {
                Direction::Asc => units.sort_by(|a, b| natural_cmp(&a.text, &b.text)),
                Direction::Desc => units.sort_by(|a, b| natural_cmp(&b.text, &a.text)),
            }
        }

        units.retain(|unit| {
            Evaluator::new(&unit.text, &unit.metadata).matches_clause(query.where_clause.as_ref())
        });

        if let Some(field) = &query.group_by {
            let groups = group_units(&units, field, query.limit, query.group_limit);
            return Ok(render_groups(&groups, query.kind));
        }

        if let Some(limit) = query.limit {
            units.truncate(limit);
        }
        Ok(units
            .iter()
            .map(|unit| unit.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Row index of a sort field: the `File` cell or a column by name or alias.
fn column_index(query: &Query, field: &str) -> Option<usize> {
    let offset = usize::from(query.kind == QueryKind::Table);
    if offset == 1 && field.eq_ignore_ascii_case("file") {
        return Some(0);
    }
    query
        .columns
        .iter()
        .position(|c| c.name.eq_ignore_ascii_case(field) || c.alias.eq_ignore_ascii_case(field))
        .map(|i| i + offset)
}

/// Buckets units by the value of `field`, `Unknown` when missing.
///
/// With a positive `limit` each bucket holds at most that many units. Buckets
/// come back in natural order of their key, cut to `group_limit`.
fn group_units<'u>(
    units: &'u [ContentUnit],
    field: &str,
    limit: Option<usize>,
    group_limit: Option<usize>,
) -> Vec<(String, Vec<&'u str>)> {
    let mut buckets: HashMap<String, Vec<&str>> = HashMap::new();

    for unit in units {
        let key = unit
            .metadata
            .text(field)
            .unwrap_or_else(|| "Unknown".to_string());
        let bucket = buckets.entry(key).or_default();
        if limit.is_some_and(|l| l > 0 && bucket.len() >= l) {
            continue;
        }
        bucket.push(&unit.text);
    }

    let mut groups: Vec<_> = buckets.into_iter().collect();
    groups.sort_by(|(a, _), (b, _)| natural_cmp(a, b));
    if let Some(max) = group_limit {
        groups.truncate(max);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Metadata;
    use std::rc::Rc;

    fn unit(text: &str, owner: Option<&str>) -> ContentUnit {
        let mut metadata = Metadata::new();
        if let Some(owner) = owner {
            metadata.insert("owner", owner);
        }
        ContentUnit {
            text: text.to_string(),
            metadata: Rc::new(metadata),
        }
    }

    #[test]
    fn test_group_limit_caps_each_bucket() {
        let units = vec![
            unit("a1", Some("ann")),
            unit("a2", Some("ann")),
            unit("a3", Some("ann")),
            unit("b1", Some("bob")),
            unit("x1", None),
        ];
        let groups = group_units(&units, "owner", Some(2), None);
        assert_eq!(
            groups,
            vec![
                ("Unknown".to_string(), vec!["x1"]),
                ("ann".to_string(), vec!["a1", "a2"]),
                ("bob".to_string(), vec!["b1"]),
            ]
        );
    }

    #[test]
    fn test_group_count_limits_buckets() {
        let units = vec![
            unit("1", Some("item10")),
            unit("2", Some("item2")),
            unit("3", Some("item1")),
        ];
        let groups = group_units(&units, "owner", Some(0), Some(2));
        let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["item1", "item2"]);
    }
}
