//! Integer hex codec
//!
//! An int64 is written as a JSON string:
//!
//! | Value | Wire |
//! |-------|------|
//! | `0` | `"0"` |
//! | `255` | `"00000000000000ff"` |
//! | `-1` | `"ffffffffffffffff"` |
//!
//! Reading goes by length: up to 16 characters is base-16, anything longer
//! is base-10 (legacy IDs stored as decimal strings). Unparseable input
//! reads as zero.

use serde_json::Value;
use tagjson_core::{CodecError, Slot};

use super::{ValDecoder, ValEncoder};

/// Width of a non-zero encoded value
pub const HEX_WIDTH: usize = 16;

/// `"0"` for zero, otherwise the 64-bit word as 16 lowercase hex digits
pub fn format_hex(value: i64) -> String {
    if value == 0 {
        "0".to_string()
    } else {
        format!("{:016x}", value)
    }
}

/// Parse by the length rule; `None` if the text is not a number
pub fn parse_hex(text: &str) -> Option<i64> {
    if text.len() > HEX_WIDTH {
        return text.parse::<i64>().ok();
    }
    // As a word first so the full 64-bit pattern (`ffff...`) maps to negatives.
    u64::from_str_radix(text, 16)
        .map(|word| word as i64)
        .or_else(|_| i64::from_str_radix(text, 16))
        .ok()
}

/// [`parse_hex`] with zero on failure
pub fn decode_hex(text: &str) -> i64 {
    parse_hex(text).unwrap_or(0)
}

/// Encoder and decoder for a `hexstring` int64 field
#[derive(Debug, Default, Clone, Copy)]
pub struct HexStringCodec;

impl ValEncoder for HexStringCodec {
    fn name(&self) -> &'static str {
        "hexstring"
    }

    fn encode(&self, slot: &dyn Slot) -> Result<Value, CodecError> {
        Ok(match slot.int64() {
            Some(value) => Value::String(format_hex(value)),
            None => Value::Null,
        })
    }

    fn is_empty(&self, slot: &dyn Slot) -> bool {
        slot.int64().map_or(true, |value| value == 0)
    }
}

impl ValDecoder for HexStringCodec {
    fn name(&self) -> &'static str {
        "hexstring"
    }

    fn decode(&self, slot: &mut dyn Slot, value: Value) -> Result<(), CodecError> {
        let text = match value {
            Value::String(text) => text,
            // null reads as the empty string
            Value::Null => String::new(),
            other => return Err(CodecError::mismatch("hex string", &other)),
        };
        slot.set_int64(decode_hex(&text));
        Ok(())
    }
}

/// Serde `with` module for the same wire form outside a descriptor
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Row {
///     #[serde(with = "tagjson::hexstring")]
///     id: i64,
/// }
/// ```
pub mod hexstring {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{decode_hex, format_hex};

    /// Write `value` as a hex string
    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_hex(*value))
    }

    /// Read a hex (or long decimal) string; `null` and bad text read as zero
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        Ok(text.map_or(0, |text| decode_hex(&text)))
    }
}
