//! Token and metadata -> JSON conversion utilities

use crate::{Metadata, MetadataValue, Token};

/// Convert a token stream to a JSON array of `{"kind", "text"}` objects
pub fn tokens_to_json(tokens: &[Token]) -> serde_json::Value {
    serde_json::Value::Array(
        tokens
            .iter()
            .map(|t| serde_json::json!({ "kind": t.kind.as_str(), "text": t.text }))
            .collect(),
    )
}

/// Convert document metadata to a JSON object, keeping value types
pub fn metadata_to_json(metadata: &Metadata) -> serde_json::Value {
    serde_json::Value::Object(
        metadata
            .iter()
            .map(|(k, v)| (k.to_string(), value_to_json(v)))
            .collect(),
    )
}

fn value_to_json(v: &MetadataValue) -> serde_json::Value {
    match v {
        MetadataValue::String(s) => serde_json::Value::String(s.clone()),
        MetadataValue::Integer(i) => serde_json::Value::Number((*i).into()),
        MetadataValue::Boolean(b) => serde_json::Value::Bool(*b),
    }
}
