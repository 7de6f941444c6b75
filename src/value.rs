use std::collections::BTreeMap;
use std::fmt;

/// A metadata value read from front matter, an inline annotation or the file
/// itself.
///
/// Raw text is coerced on the way in: base-10 integers first, then boolean
/// words, and anything else stays a string.
///
/// # Examples
///
/// ```
/// use dql_lang::MetadataValue;
///
/// assert_eq!(MetadataValue::coerce("42"), MetadataValue::Integer(42));
/// assert_eq!(MetadataValue::coerce("True"), MetadataValue::Boolean(true));
/// assert_eq!(MetadataValue::coerce("1"), MetadataValue::Integer(1));
/// assert_eq!(
///     MetadataValue::coerce("John Doe"),
///     MetadataValue::String("John Doe".to_string())
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl MetadataValue {
    pub fn coerce(raw: &str) -> Self {
        if let Ok(n) = raw.parse::<i64>() {
            return MetadataValue::Integer(n);
        }
        match raw {
            "t" | "T" | "true" | "TRUE" | "True" => MetadataValue::Boolean(true),
            "f" | "F" | "false" | "FALSE" | "False" => MetadataValue::Boolean(false),
            _ => MetadataValue::String(raw.to_string()),
        }
    }
}

/// Used for display, `WHERE` comparisons and table cells alike.
impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => f.write_str(s),
            MetadataValue::Integer(n) => write!(f, "{}", n),
            MetadataValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::String(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::String(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        MetadataValue::Integer(n)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Boolean(b)
    }
}

/// Metadata of one document.
///
/// Keys are stored lowercase and looked up case-insensitively; a later write
/// to the same key replaces the earlier value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    entries: BTreeMap<String, MetadataValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<MetadataValue>) {
        self.entries.insert(key.to_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(&key.to_lowercase())
    }

    /// Stringified value of `key`, if present.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(MetadataValue::to_string)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
