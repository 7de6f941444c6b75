pub mod ast;
pub mod cli;
pub mod engine;
pub mod evaluator;
pub mod extract;
pub mod lexer;
pub mod loader;
pub mod metadata;
pub mod natural;
pub mod output;
pub mod parser;
pub mod source;
pub mod value;

pub use ast::{Query, QueryKind, Token, TokenKind};
pub use engine::{Diagnostics, Engine, ExecError, Execution, QueryError};
pub use evaluator::Evaluator;
pub use lexer::{LexError, Lexer};
pub use loader::{ContentUnit, DocumentMetadata};
pub use parser::{ParseError, Parser};
pub use source::{DocumentSource, FileStat, FsSource};
pub use value::{Metadata, MetadataValue};

/// Lexes and parses a query.
///
/// # Examples
///
/// ```
/// let query = dql_lang::parse(r#"LIST FROM "notes/" LIMIT 3"#).unwrap();
/// assert_eq!(query.sources, vec!["notes/"]);
/// assert_eq!(query.limit, Some(3));
/// ```
pub fn parse(input: &str) -> Result<Query, ParseError> {
    Parser::new(Lexer::new(input))?.parse_query()
}
