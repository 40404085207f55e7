//! Hex-array codec for collections of int64
//!
//! Every element goes through the integer hex rule, so `[0, 255, -1]` is
//! written as `["0","00000000000000ff","ffffffffffffffff"]`. A nil
//! collection is written as `[]`.
//!
//! Reading keeps only the string elements that parse; anything else is
//! dropped rather than zeroed, so the decoded length can be shorter than
//! the input array.
//!
//! Collections without a direct `i64` view (`Vec<Box<i64>>`, say) go
//! through their serde form: elements are read from and written to plain
//! JSON numbers around the hex step.

use std::sync::Arc;

use serde_json::Value;
use tagjson_core::{CodecError, Kind, Slot};
use tracing::warn;

use super::hex::{format_hex, parse_hex};
use super::{ValDecoder, ValEncoder};

/// Encoder and decoder for a slice or array of int64
pub struct HexArrayCodec {
    fallback: Arc<dyn ValEncoder>,
}

impl HexArrayCodec {
    /// Wrap the encoder the field had before
    pub fn new(fallback: Arc<dyn ValEncoder>) -> Self {
        Self { fallback }
    }
}

impl ValEncoder for HexArrayCodec {
    fn name(&self) -> &'static str {
        "hexarray"
    }

    fn encode(&self, slot: &dyn Slot) -> Result<Value, CodecError> {
        if slot.is_nil() {
            return Ok(Value::Array(Vec::new()));
        }
        let strings: Vec<String> = match slot.int64_seq() {
            Some(values) => values.iter().map(|value| format_hex(*value)).collect(),
            None => match elements_of(slot) {
                Some(values) => values.into_iter().map(format_hex).collect(),
                None => {
                    warn!(kind = %slot.kind(), "no int64 elements, using fallback encoder");
                    return self.fallback.encode(slot);
                }
            },
        };
        match serde_json::to_value(&strings) {
            Ok(encoded) => Ok(encoded),
            Err(err) => {
                warn!(error = %err, "hex array encoding failed, using fallback encoder");
                self.fallback.encode(slot)
            }
        }
    }

    fn is_empty(&self, slot: &dyn Slot) -> bool {
        self.fallback.is_empty(slot)
    }
}

impl ValDecoder for HexArrayCodec {
    fn name(&self) -> &'static str {
        "hexarray"
    }

    fn decode(&self, slot: &mut dyn Slot, value: Value) -> Result<(), CodecError> {
        let items = match value {
            Value::Array(items) => items,
            Value::Null => {
                slot.set_nil();
                return Ok(());
            }
            other => return Err(CodecError::mismatch("array of hex strings", &other)),
        };
        let values: Vec<i64> = items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(parse_hex)
            .collect();
        if slot.set_int64_seq(values.clone()) {
            return Ok(());
        }
        let mut numbers: Vec<Value> = values.into_iter().map(Value::from).collect();
        if slot.kind() == Kind::Array {
            // fixed arrays keep their length: zero-fill or drop the surplus
            let len = match slot.to_json()? {
                Value::Array(current) => current.len(),
                _ => numbers.len(),
            };
            numbers.resize(len, Value::from(0i64));
        }
        slot.from_json(Value::Array(numbers))?;
        Ok(())
    }
}

/// Elements of a non-nil int64 collection, read through its serde form
fn elements_of(slot: &dyn Slot) -> Option<Vec<i64>> {
    match slot.to_json().ok()? {
        Value::Array(items) => items.iter().map(Value::as_i64).collect(),
        _ => None,
    }
}

impl std::fmt::Debug for HexArrayCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HexArrayCodec")
            .field("fallback", &self.fallback.name())
            .finish()
    }
}
