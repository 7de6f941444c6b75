//! # DQL - Abstract Syntax Tree
//!
//! This module defines the tokens and the query tree of DQL, a small query
//! language for pulling structured content out of markdown notes.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[query]** - Query kind, columns, sources, sort keys, grouping and limit
//! - **[condition]** - `WHERE` conditions and how they combine
//!
//! ## Quick Start
//!
//! ```text
//! TASK FROM "projects/" WHERE NOT CHECKED AND [status] IS "active"
//! ```
//!
//! This query returns every open task of every note under `projects/` whose
//! front matter (or inline `status:: active` annotation) marks it active.
//!
//! ## Query Shape
//!
//! ```text
//! <kind> [columns] FROM <sources> [WHERE ...] [SORT ...] [GROUP BY [n] [field]] [LIMIT n]
//! ```
//!
//! Clauses are optional except `FROM` and must appear in this order.
//!
//! ### Query kinds
//!
//! - `LIST` - one line per document
//! - `TASK`, `PARAGRAPH`, `ORDEREDLIST`, `UNORDEREDLIST`, `FENCEDCODE` -
//!   structural units of the documents
//! - `TABLE` / `TABLE NO ID` - metadata table, with or without the file column
//!
//! ## Examples
//!
//! ### Metadata table
//!
//! ```text
//! TABLE title AS "Title", due FROM "todos/" SORT [due] DESC
//! ```
//!
//! ### Grouped list items
//!
//! ```text
//! UNORDEREDLIST FROM "journal/" WHERE CONTAINS "idea" GROUP BY [file.name] LIMIT 3
//! ```
pub mod condition;
pub mod query;
pub mod tokens;

pub use condition::{Combinator, Condition, Predicate, WhereClause};
pub use query::{Column, Direction, Query, QueryKind, SortSpec};
pub use tokens::{Token, TokenKind};
