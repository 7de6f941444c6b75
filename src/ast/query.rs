use std::fmt;

use crate::ast::WhereClause;

/// What a query extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// One `- name.md` line per document
    List,
    /// Checkbox task lines
    Task,
    /// Paragraph lines (lists, headings and code removed)
    Paragraph,
    /// Numbered list items
    OrderedList,
    /// Dash list items
    UnorderedList,
    /// Fenced code blocks
    FencedCode,
    /// Metadata table with a leading `File` column
    Table,
    /// Metadata table without the `File` column
    TableNoId,
}

impl QueryKind {
    /// Maps a unit keyword (already upper-cased by the lexer) to its kind.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "LIST" => Some(QueryKind::List),
            "TASK" => Some(QueryKind::Task),
            "PARAGRAPH" => Some(QueryKind::Paragraph),
            "ORDEREDLIST" => Some(QueryKind::OrderedList),
            "UNORDEREDLIST" => Some(QueryKind::UnorderedList),
            "FENCEDCODE" => Some(QueryKind::FencedCode),
            _ => None,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, QueryKind::Table | QueryKind::TableNoId)
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryKind::List => "LIST",
            QueryKind::Task => "TASK",
            QueryKind::Paragraph => "PARAGRAPH",
            QueryKind::OrderedList => "ORDEREDLIST",
            QueryKind::UnorderedList => "UNORDEREDLIST",
            QueryKind::FencedCode => "FENCEDCODE",
            QueryKind::Table => "TABLE",
            QueryKind::TableNoId => "TABLE NO ID",
        };
        f.write_str(name)
    }
}

/// Selected table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Metadata key the cells are read from
    pub name: String,
    /// Header text (defaults to `name`)
    pub alias: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Column {
            alias: name.clone(),
            name,
        }
    }

    pub fn with_alias(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            alias: alias.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One `SORT` key.
///
/// Table queries always carry a field; the other kinds sort on the unit text
/// and leave `field` empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: Option<String>,
    pub direction: Direction,
}

/// Complete parsed query.
///
/// # Example
/// ```text
/// TASK FROM "todo.md" WHERE NOT CHECKED SORT DESC GROUP BY 2 [project] LIMIT 5
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub kind: QueryKind,

    /// Table columns, in declaration order
    pub columns: Vec<Column>,

    /// `FROM` entries in the order written (duplicates are kept)
    pub sources: Vec<String>,

    pub where_clause: Option<WhereClause>,

    pub sorts: Vec<SortSpec>,

    /// Metadata field of `GROUP BY`
    pub group_by: Option<String>,

    /// Maximum number of groups rendered
    pub group_limit: Option<usize>,

    /// Maximum number of items; per group when `group_by` is set
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(kind: QueryKind) -> Self {
        Query {
            kind,
            columns: vec![],
            sources: vec![],
            where_clause: None,
            sorts: vec![],
            group_by: None,
            group_limit: None,
            limit: None,
        }
    }
}
