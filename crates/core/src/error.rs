//! Codec error types

use thiserror::Error;

/// Errors raised while encoding or decoding a single field
#[derive(Debug, Error)]
pub enum CodecError {
    /// Error from the underlying JSON engine, passed through as-is
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A codec received a JSON token it cannot read
    #[error("invalid type: expected {expected}, found {found}")]
    TypeMismatch {
        /// What the codec reads
        expected: &'static str,
        /// The JSON type that was present
        found: &'static str,
    },
}

impl CodecError {
    /// Build a type mismatch for the given JSON token
    pub fn mismatch(expected: &'static str, found: &serde_json::Value) -> Self {
        CodecError::TypeMismatch {
            expected,
            found: json_type_name(found),
        }
    }
}

/// Name of a JSON token's type, for error messages
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
