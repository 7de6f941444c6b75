use std::fmt;

/// Kind of a lexical token.
///
/// The lexer works on whitespace-separated words, so every token keeps the
/// text it was produced from (see [`Token`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Query kinds plus the reserved words `FROM`, `WHERE`, `LIMIT` and
    /// `CHECKED`
    ///
    /// # Examples
    /// ```text
    /// TASK
    /// FROM
    /// CHECKED
    /// ```
    Keyword,

    /// Column names, sort directions and any other bare word outside the
    /// source list
    ///
    /// # Examples
    /// ```text
    /// file.path
    /// DESC
    /// ```
    Identifier,

    /// Predicate functions used in `WHERE`
    ///
    /// # Examples
    /// ```text
    /// CONTAINS
    /// IS
    /// ```
    Function,

    /// Negation of the next condition
    Not,

    /// `AND` / `OR`
    LogicalOp,

    /// Quoted text, or a bare word in source position (between `FROM` and
    /// `WHERE`/`SORT`)
    ///
    /// # Examples
    /// ```text
    /// "John Doe"
    /// notes/
    /// ```
    String,

    /// Base-10 integer literal
    Number,

    /// Separator in column and sort lists
    Comma,

    /// End of input
    Eof,

    /// Start of a table query
    Table,

    /// Deprecated single-word `TABLE_NO_ID`; use `TABLE NO ID` instead.
    TableNoId,

    /// Column alias marker
    ///
    /// # Examples
    /// ```text
    /// title AS "Title"
    /// ```
    As,

    /// Metadata field reference, carrying the bracket interior
    ///
    /// # Examples
    /// ```text
    /// [author]
    /// [file.name]
    /// ```
    Metadata,

    /// `GROUP`
    Group,

    /// `BY`
    By,

    /// `SORT`
    Sort,
}

impl TokenKind {
    /// Stable name used in token dumps.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Function => "FUNCTION",
            TokenKind::Not => "NOT",
            TokenKind::LogicalOp => "LOGICAL_OP",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Comma => "COMMA",
            TokenKind::Eof => "EOF",
            TokenKind::Table => "TABLE",
            TokenKind::TableNoId => "TABLE_NO_ID",
            TokenKind::As => "AS",
            TokenKind::Metadata => "METADATA",
            TokenKind::Group => "GROUP",
            TokenKind::By => "BY",
            TokenKind::Sort => "SORT",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexical token: its kind and the text it carries.
///
/// Keywords carry their upper-cased spelling, strings carry the unquoted
/// text and metadata tokens carry the field name without brackets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
        }
    }

    pub fn eof() -> Self {
        Token::new(TokenKind::Eof, "")
    }

    /// True for a `Keyword` token spelled `word`.
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    /// True for an `Identifier` token spelled `word`, ignoring case.
    pub fn is_identifier(&self, word: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text.eq_ignore_ascii_case(word)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("end of input"),
            TokenKind::String => write!(f, "\"{}\"", self.text),
            TokenKind::Metadata => write!(f, "[{}]", self.text),
            _ => f.write_str(&self.text),
        }
    }
}
