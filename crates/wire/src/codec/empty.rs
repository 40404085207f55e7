//! Empty-collection encoders
//!
//! Clients that index into a field unconditionally cannot handle `null`.
//! These encoders write `{}` or `[]` for a nil field and hand every other
//! value to the encoder they wrap.

use std::sync::Arc;

use serde_json::{Map, Value};
use tagjson_core::{CodecError, Slot};

use super::ValEncoder;

/// Literal written in place of `null`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyLiteral {
    /// `{}`
    Object,
    /// `[]`
    Array,
}

impl EmptyLiteral {
    /// The literal as JSON text
    pub const fn as_str(&self) -> &'static str {
        match self {
            EmptyLiteral::Object => "{}",
            EmptyLiteral::Array => "[]",
        }
    }

    /// The literal as a JSON token
    pub fn to_value(&self) -> Value {
        match self {
            EmptyLiteral::Object => Value::Object(Map::new()),
            EmptyLiteral::Array => Value::Array(Vec::new()),
        }
    }
}

/// Writes an empty literal for nil fields, delegates otherwise
///
/// `is_empty` always comes from the wrapped encoder, so `omitempty`
/// behaves exactly as it did before wrapping.
pub struct EmptyCollectionEncoder {
    literal: EmptyLiteral,
    fallback: Arc<dyn ValEncoder>,
}

impl EmptyCollectionEncoder {
    /// `{}` for a nil pointer or interface
    pub fn object(fallback: Arc<dyn ValEncoder>) -> Self {
        Self {
            literal: EmptyLiteral::Object,
            fallback,
        }
    }

    /// `[]` for a nil slice
    pub fn array(fallback: Arc<dyn ValEncoder>) -> Self {
        Self {
            literal: EmptyLiteral::Array,
            fallback,
        }
    }

    /// Which literal this encoder writes
    pub fn literal(&self) -> EmptyLiteral {
        self.literal
    }
}

impl ValEncoder for EmptyCollectionEncoder {
    fn name(&self) -> &'static str {
        match self.literal {
            EmptyLiteral::Object => "emptyobject",
            EmptyLiteral::Array => "emptyarray",
        }
    }

    fn encode(&self, slot: &dyn Slot) -> Result<Value, CodecError> {
        if slot.is_nil() {
            return Ok(self.literal.to_value());
        }
        self.fallback.encode(slot)
    }

    fn is_empty(&self, slot: &dyn Slot) -> bool {
        self.fallback.is_empty(slot)
    }
}

impl std::fmt::Debug for EmptyCollectionEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmptyCollectionEncoder")
            .field("literal", &self.literal)
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DefaultCodec;
    use serde_json::json;

    fn object() -> EmptyCollectionEncoder {
        EmptyCollectionEncoder::object(Arc::new(DefaultCodec))
    }

    fn array() -> EmptyCollectionEncoder {
        EmptyCollectionEncoder::array(Arc::new(DefaultCodec))
    }

    #[test]
    fn test_literal_text() {
        assert_eq!(EmptyLiteral::Object.as_str(), "{}");
        assert_eq!(EmptyLiteral::Array.as_str(), "[]");
        assert_eq!(
            serde_json::to_string(&EmptyLiteral::Object.to_value()).unwrap(),
            "{}"
        );
        assert_eq!(
            serde_json::to_string(&EmptyLiteral::Array.to_value()).unwrap(),
            "[]"
        );
    }

    #[test]
    fn test_nil_pointer_writes_object() {
        let field: Option<Box<String>> = None;
        assert_eq!(object().encode(&field).unwrap(), json!({}));
    }

    #[test]
    fn test_null_interface_writes_object() {
        assert_eq!(object().encode(&Value::Null).unwrap(), json!({}));
    }

    #[test]
    fn test_present_pointer_delegates() {
        let field = Some(Box::new("x".to_string()));
        assert_eq!(object().encode(&field).unwrap(), json!("x"));
    }

    #[test]
    fn test_nil_slice_writes_array() {
        let field: Option<Vec<String>> = None;
        assert_eq!(array().encode(&field).unwrap(), json!([]));
    }

    #[test]
    fn test_present_slice_delegates() {
        let field = Some(vec!["a".to_string()]);
        assert_eq!(array().encode(&field).unwrap(), json!(["a"]));
    }

    #[test]
    fn test_is_empty_unchanged_by_wrapping() {
        let nil: Option<Vec<String>> = None;
        let empty: Option<Vec<String>> = Some(Vec::new());

        for slot in [&nil as &dyn Slot, &empty as &dyn Slot] {
            assert_eq!(array().is_empty(slot), DefaultCodec.is_empty(slot));
            assert_eq!(object().is_empty(slot), DefaultCodec.is_empty(slot));
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(object().name(), "emptyobject");
        assert_eq!(array().name(), "emptyarray");
        assert_eq!(array().literal(), EmptyLiteral::Array);
    }
}
