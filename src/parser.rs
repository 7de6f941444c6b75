use thiserror::Error;

use crate::{
    ast::{
        Column, Combinator, Condition, Direction, Predicate, Query, QueryKind, SortSpec, Token,
        TokenKind, WhereClause,
    },
    lexer::{LexError, Lexer},
};

/// Errors raised while turning query text into a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Syntax error: {0}")]
    Lex(#[from] LexError),

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Unsupported query type: {0}")]
    UnsupportedQueryType(String),

    #[error("Missing clause: {0}")]
    MissingClause(String),

    #[error("Invalid numeric literal: {0}")]
    InvalidNumericLiteral(String),
}

/// Condition being assembled while scanning a `WHERE` clause.
#[derive(Default)]
struct PendingCondition {
    negated: bool,
    field: Option<String>,
    predicate: Option<Predicate>,
}

impl PendingCondition {
    fn is_started(&self) -> bool {
        self.negated || self.field.is_some() || self.predicate.is_some()
    }
}

/// Single-pass parser over the lexed token stream.
///
/// The parser only moves forward; every clause is recognized by the token it
/// starts with.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Result<Self, ParseError> {
        Ok(Self::from_tokens(lexer.tokenize()?))
    }

    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::eof());
        }
        Parser {
            tokens,
            position: 0,
        }
    }

    /// The full token stream, `Eof` included.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn current(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.position + offset)
    }

    /// Moves to the next token; the parser never moves past `Eof`.
    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Parse a complete query
    pub fn parse_query(&mut self) -> Result<Query, ParseError> {
        let mut query = Query::new(self.parse_kind()?);

        if query.kind.is_table() {
            query.columns = self.parse_columns()?;
        }

        query.sources = self.parse_sources()?;

        if self.current().is_keyword("WHERE") {
            self.advance();
            query.where_clause = Some(self.parse_conditions()?);
        }

        if self.check(TokenKind::Sort) {
            self.advance();
            query.sorts = self.parse_sorts(query.kind, &query.columns)?;
        }

        if self.check(TokenKind::Group) {
            if query.kind.is_table() {
                return Err(ParseError::Syntax(format!(
                    "GROUP BY is not supported for {} queries",
                    query.kind
                )));
            }
            self.advance();
            self.parse_group_by(&mut query)?;
        }

        if self.current().is_keyword("LIMIT") {
            self.advance();
            query.limit = Some(self.parse_count("LIMIT")?);
        }

        if !self.check(TokenKind::Eof) {
            return Err(ParseError::Syntax(format!(
                "unexpected {} after end of query",
                self.current()
            )));
        }

        Ok(query)
    }

    fn parse_kind(&mut self) -> Result<QueryKind, ParseError> {
        let token = self.current().clone();
        let kind = match token.kind {
            TokenKind::Table => {
                let no_id = self.peek(1).is_some_and(|t| t.is_identifier("NO"))
                    && self.peek(2).is_some_and(|t| t.is_identifier("ID"));
                if no_id {
                    self.advance();
                    self.advance();
                    QueryKind::TableNoId
                } else {
                    QueryKind::Table
                }
            }
            TokenKind::TableNoId => QueryKind::TableNoId,
            TokenKind::Keyword => QueryKind::from_keyword(&token.text)
                .ok_or(ParseError::UnsupportedQueryType(token.text))?,
            _ => {
                return Err(ParseError::Syntax(format!(
                    "expected valid query type, got {}",
                    token
                )));
            }
        };
        self.advance();
        Ok(kind)
    }

    /// `name [AS "alias"], ...` up to the `FROM` keyword.
    fn parse_columns(&mut self) -> Result<Vec<Column>, ParseError> {
        let mut columns = vec![];

        while !self.check(TokenKind::Keyword) && !self.check(TokenKind::Eof) {
            match self.current().kind {
                TokenKind::Identifier => {
                    let name = self.current().text.clone();
                    self.advance();

                    if self.check(TokenKind::As) {
                        self.advance();
                        if !self.check(TokenKind::String) {
                            return Err(ParseError::Syntax(format!(
                                "expected column alias, got {}",
                                self.current()
                            )));
                        }
                        columns.push(Column::with_alias(name, self.current().text.clone()));
                        self.advance();
                    } else {
                        columns.push(Column::new(name));
                    }
                }
                TokenKind::Comma => self.advance(),
                _ => {
                    return Err(ParseError::Syntax(format!(
                        "expected column name or comma, got {}",
                        self.current()
                    )));
                }
            }
        }

        Ok(columns)
    }

    fn parse_sources(&mut self) -> Result<Vec<String>, ParseError> {
        if !self.current().is_keyword("FROM") {
            return Err(ParseError::MissingClause(format!(
                "expected FROM, got {}",
                self.current()
            )));
        }
        self.advance();

        let mut sources = vec![];
        while !matches!(
            self.current().kind,
            TokenKind::Keyword | TokenKind::Group | TokenKind::Sort | TokenKind::Eof
        ) {
            if self.check(TokenKind::String) {
                sources.push(self.current().text.clone());
            }
            self.advance();
        }

        if sources.is_empty() {
            return Err(ParseError::MissingClause(
                "expected at least one source after FROM".to_string(),
            ));
        }
        Ok(sources)
    }

    /// Flat condition list: `[NOT] [[field]] (CONTAINS|IS) "value"` or
    /// `[NOT] CHECKED`, joined by `AND` / `OR`.
    fn parse_conditions(&mut self) -> Result<WhereClause, ParseError> {
        let mut clause = WhereClause::default();
        let mut pending = PendingCondition::default();
        let mut combinator = Combinator::And;

        loop {
            let token = self.current().clone();
            match token.kind {
                TokenKind::Eof | TokenKind::Group | TokenKind::Sort => break,
                TokenKind::Keyword if token.text == "LIMIT" => break,
                TokenKind::Keyword if token.text == "CHECKED" => {
                    let done = std::mem::take(&mut pending);
                    clause.conditions.push(Condition {
                        negated: done.negated,
                        field: done.field,
                        predicate: Predicate::Checked,
                        operand: None,
                        combinator,
                    });
                    combinator = Combinator::And;
                }
                TokenKind::Not => pending.negated = true,
                TokenKind::Metadata => pending.field = Some(token.text),
                TokenKind::Function => {
                    pending.predicate = Some(if token.text == "IS" {
                        Predicate::Is
                    } else {
                        Predicate::Contains
                    });
                }
                TokenKind::String | TokenKind::Number => {
                    let done = std::mem::take(&mut pending);
                    let predicate = done.predicate.ok_or_else(|| {
                        ParseError::Syntax(format!("expected CONTAINS or IS before {}", token))
                    })?;
                    clause.conditions.push(Condition {
                        negated: done.negated,
                        field: done.field,
                        predicate,
                        operand: Some(token.text),
                        combinator,
                    });
                    combinator = Combinator::And;
                }
                TokenKind::LogicalOp => {
                    combinator = if token.text == "OR" {
                        Combinator::Or
                    } else {
                        Combinator::And
                    };
                }
                _ => {
                    return Err(ParseError::Syntax(format!(
                        "unexpected {} in WHERE clause",
                        token
                    )));
                }
            }
            self.advance();
        }

        if pending.is_started() {
            return Err(ParseError::Syntax(
                "incomplete condition at end of WHERE clause".to_string(),
            ));
        }
        Ok(clause)
    }

    fn parse_sorts(
        &mut self,
        kind: QueryKind,
        columns: &[Column],
    ) -> Result<Vec<SortSpec>, ParseError> {
        let mut groups: Vec<Vec<Token>> = vec![];
        let mut group = vec![];
        let mut saw_comma = false;

        while !matches!(self.current().kind, TokenKind::Group | TokenKind::Eof)
            && !self.current().is_keyword("LIMIT")
        {
            if self.check(TokenKind::Comma) {
                groups.push(std::mem::take(&mut group));
                saw_comma = true;
            } else {
                group.push(self.current().clone());
            }
            self.advance();
        }
        if !group.is_empty() || saw_comma {
            groups.push(group);
        }

        if kind.is_table() {
            if groups.is_empty() {
                return Err(ParseError::Syntax("expected sort field after SORT".to_string()));
            }
            groups
                .iter()
                .map(|group| table_sort_spec(group, kind, columns))
                .collect()
        } else {
            // Content is sorted as a whole, only the last direction counts.
            let mut direction = Direction::Asc;
            for group in &groups {
                direction = content_sort_direction(group, kind)?;
            }
            Ok(vec![SortSpec {
                field: None,
                direction,
            }])
        }
    }

    /// `BY [n] [field]`, with `GROUP` already consumed.
    fn parse_group_by(&mut self, query: &mut Query) -> Result<(), ParseError> {
        if !self.check(TokenKind::By) {
            return Err(ParseError::MissingClause(format!(
                "expected BY after GROUP, got {}",
                self.current()
            )));
        }
        self.advance();

        if self.check(TokenKind::Number) {
            let count = self.parse_count("GROUP BY")?;
            query.group_limit = (count > 0).then_some(count);
        }

        if !self.check(TokenKind::Metadata) {
            return Err(ParseError::MissingClause(format!(
                "expected metadata field after GROUP BY, got {}",
                self.current()
            )));
        }
        query.group_by = Some(self.current().text.clone());
        self.advance();
        Ok(())
    }

    fn parse_count(&mut self, clause: &str) -> Result<usize, ParseError> {
        if !self.check(TokenKind::Number) {
            return Err(ParseError::InvalidNumericLiteral(format!(
                "{} expects a number, got {}",
                clause,
                self.current()
            )));
        }
        let text = &self.current().text;
        let count = text.parse::<usize>().map_err(|_| {
            ParseError::InvalidNumericLiteral(format!(
                "{} value {} must be a non-negative integer",
                clause, text
            ))
        })?;
        self.advance();
        Ok(count)
    }
}

fn sort_direction(token: &Token) -> Option<Direction> {
    if token.is_identifier("ASC") {
        Some(Direction::Asc)
    } else if token.is_identifier("DESC") {
        Some(Direction::Desc)
    } else {
        None
    }
}

fn table_sort_spec(
    group: &[Token],
    kind: QueryKind,
    columns: &[Column],
) -> Result<SortSpec, ParseError> {
    let (field, direction) = match group {
        [] => return Err(ParseError::Syntax("expected sort field".to_string())),
        [first, ..] if sort_direction(first).is_some() => {
            return Err(ParseError::Syntax(format!(
                "sort direction {} given without a field",
                first
            )));
        }
        [field] if field.kind == TokenKind::Metadata => (field, Direction::Asc),
        [field, dir] if field.kind == TokenKind::Metadata => match sort_direction(dir) {
            Some(direction) => (field, direction),
            None => {
                return Err(ParseError::Syntax(format!(
                    "expected ASC or DESC, got {}",
                    dir
                )));
            }
        },
        [first, ..] => {
            return Err(ParseError::Syntax(format!(
                "expected [field] [ASC|DESC] in SORT, got {}",
                first
            )));
        }
    };

    let name = &field.text;
    let is_file = kind == QueryKind::Table && name.eq_ignore_ascii_case("file");
    let is_column = columns
        .iter()
        .any(|c| c.name.eq_ignore_ascii_case(name) || c.alias.eq_ignore_ascii_case(name));
    if !is_file && !is_column {
        return Err(ParseError::Syntax(format!(
            "sort field {} is not a selected column",
            field
        )));
    }

    Ok(SortSpec {
        field: Some(name.clone()),
        direction,
    })
}

fn content_sort_direction(group: &[Token], kind: QueryKind) -> Result<Direction, ParseError> {
    match group {
        [] => Ok(Direction::Asc),
        [token] => sort_direction(token).ok_or_else(|| {
            if token.kind == TokenKind::Metadata {
                ParseError::Syntax(format!("SORT on {} queries takes no field, got {}", kind, token))
            } else {
                ParseError::Syntax(format!("expected ASC or DESC, got {}", token))
            }
        }),
        [_, extra, ..] => Err(ParseError::Syntax(format!(
            "unexpected {} in SORT clause",
            extra
        ))),
    }
}
