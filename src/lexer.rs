use std::collections::VecDeque;

use thiserror::Error;

use crate::ast::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unterminated string: missing closing quote after \"{0}")]
    UnterminatedString(String),
}

/// Word-based tokenizer.
///
/// The query is split on whitespace up front, with a trailing comma split off
/// into its own word, so classification never has to splice the word list.
pub struct Lexer {
    words: Vec<String>,
    position: usize,
    /// Tokens already classified but not yet handed out
    pending: VecDeque<Token>,
    /// A `FROM` keyword has been seen
    in_sources: bool,
    /// `WHERE` or `SORT` came after `FROM`, bare words are identifiers again
    sources_closed: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            words: split_words(input),
            position: 0,
            pending: VecDeque::new(),
            in_sources: false,
            sources_closed: false,
        }
    }

    fn current_word(&self) -> Option<&str> {
        self.words.get(self.position).map(String::as_str)
    }

    fn peek_word(&self, offset: usize) -> Option<&str> {
        self.words.get(self.position + offset).map(String::as_str)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Reads a quoted string that may span several words.
    fn read_string(&mut self) -> Result<String, LexError> {
        let first = self.current_word().unwrap_or_default();
        let closed = first.len() > 1 && first.ends_with('"');
        let mut result = first[1..].to_string();
        self.advance();

        if closed {
            result.pop();
            return Ok(result);
        }

        while let Some(word) = self.current_word() {
            result.push(' ');
            if let Some(stripped) = word.strip_suffix('"') {
                result.push_str(stripped);
                self.advance();
                return Ok(result);
            }
            result.push_str(word);
            self.advance();
        }

        Err(LexError::UnterminatedString(result))
    }

    /// Recognizes `TABLE NO ID` right after the `TABLE` word.
    fn at_no_id_phrase(&self) -> bool {
        matches!(
            (self.peek_word(1), self.peek_word(2)),
            (Some(no), Some(id)) if no.eq_ignore_ascii_case("NO") && id.eq_ignore_ascii_case("ID")
        )
    }

    fn keyword(&mut self, kind: TokenKind, text: &str) -> Token {
        self.advance();
        Token::new(kind, text)
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if let Some(token) = self.pending.pop_front() {
            return Ok(token);
        }

        let Some(word) = self.current_word() else {
            return Ok(Token::eof());
        };

        if word.starts_with('"') {
            let text = self.read_string()?;
            return Ok(Token::new(TokenKind::String, text));
        }

        if word.len() >= 2 && word.starts_with('[') && word.ends_with(']') {
            let field = word[1..word.len() - 1].to_string();
            self.advance();
            return Ok(Token::new(TokenKind::Metadata, field));
        }

        let upper = word.to_uppercase();
        let token = match upper.as_str() {
            "TABLE" => {
                if self.at_no_id_phrase() {
                    self.position += 2;
                    self.pending.push_back(Token::new(TokenKind::Identifier, "NO"));
                    self.pending.push_back(Token::new(TokenKind::Identifier, "ID"));
                }
                self.keyword(TokenKind::Table, "TABLE")
            }
            "TABLE_NO_ID" => {
                tracing::warn!("'TABLE_NO_ID' is deprecated, use 'TABLE NO ID' instead");
                self.keyword(TokenKind::TableNoId, "TABLE_NO_ID")
            }
            "AS" => self.keyword(TokenKind::As, "AS"),
            "LIST" | "TASK" | "PARAGRAPH" | "ORDEREDLIST" | "UNORDEREDLIST" | "FENCEDCODE"
            | "LIMIT" | "CHECKED" => self.keyword(TokenKind::Keyword, &upper),
            "FROM" => {
                self.in_sources = true;
                self.keyword(TokenKind::Keyword, "FROM")
            }
            "WHERE" => {
                self.sources_closed = true;
                self.keyword(TokenKind::Keyword, "WHERE")
            }
            "SORT" => {
                self.sources_closed = true;
                self.keyword(TokenKind::Sort, "SORT")
            }
            "GROUP" => self.keyword(TokenKind::Group, "GROUP"),
            "BY" => self.keyword(TokenKind::By, "BY"),
            "," => self.keyword(TokenKind::Comma, ","),
            "CONTAINS" | "IS" => self.keyword(TokenKind::Function, &upper),
            "NOT" => self.keyword(TokenKind::Not, "NOT"),
            "AND" | "OR" => self.keyword(TokenKind::LogicalOp, &upper),
            _ => {
                let word = word.to_string();
                self.advance();
                if word.parse::<i64>().is_ok() {
                    Token::new(TokenKind::Number, word)
                } else if self.in_sources && !self.sources_closed {
                    Token::new(TokenKind::String, word)
                } else {
                    Token::new(TokenKind::Identifier, word)
                }
            }
        };

        Ok(token)
    }

    /// Lexes the whole input, ending with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = vec![];
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tracing::trace!(kind = %token.kind, text = %token.text, "token");
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

/// First pass: whitespace split with trailing commas as separate words.
fn split_words(input: &str) -> Vec<String> {
    let mut words = vec![];
    for word in input.split_whitespace() {
        match word.strip_suffix(',') {
            Some(stem) if !stem.is_empty() => {
                words.push(stem.to_string());
                words.push(",".to_string());
            }
            _ => words.push(word.to_string()),
        }
    }
    words
}
