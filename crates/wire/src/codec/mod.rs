//! Field codecs
//!
//! A codec reads one field through its [`Slot`] and produces (or consumes) a
//! JSON token. Descriptors start every field on [`DefaultCodec`]; extensions
//! swap or wrap codecs per field:
//!
//! - [`HexStringCodec`]: int64 as `"0"` or 16 hex digits
//! - [`EmptyCollectionEncoder`]: nil pointer/collection as `{}` or `[]`
//! - [`HexArrayCodec`]: collection of int64 as an array of hex strings
//!
//! Wrapping codecs own an `Arc` to the codec they replace and delegate every
//! case they do not handle to it.

mod empty;
mod hex;
mod hex_array;

pub use empty::{EmptyCollectionEncoder, EmptyLiteral};
pub use hex::{decode_hex, format_hex, hexstring, parse_hex, HexStringCodec, HEX_WIDTH};
pub use hex_array::HexArrayCodec;

use serde_json::Value;
use tagjson_core::{CodecError, Slot};

/// Encoding half of a codec
pub trait ValEncoder: Send + Sync {
    /// Short name, for logs and introspection
    fn name(&self) -> &'static str;

    /// Encode the field to a JSON token
    fn encode(&self, slot: &dyn Slot) -> Result<Value, CodecError>;

    /// Whether `omitempty` drops the field
    fn is_empty(&self, slot: &dyn Slot) -> bool;
}

/// Decoding half of a codec
pub trait ValDecoder: Send + Sync {
    /// Short name, for logs and introspection
    fn name(&self) -> &'static str;

    /// Decode a JSON token into the field
    fn decode(&self, slot: &mut dyn Slot, value: Value) -> Result<(), CodecError>;
}

/// Plain serde encoding of the field's own type
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCodec;

impl ValEncoder for DefaultCodec {
    fn name(&self) -> &'static str {
        "default"
    }

    fn encode(&self, slot: &dyn Slot) -> Result<Value, CodecError> {
        Ok(slot.to_json()?)
    }

    fn is_empty(&self, slot: &dyn Slot) -> bool {
        slot.is_zero()
    }
}

impl ValDecoder for DefaultCodec {
    fn name(&self) -> &'static str {
        "default"
    }

    fn decode(&self, slot: &mut dyn Slot, value: Value) -> Result<(), CodecError> {
        Ok(slot.from_json(value)?)
    }
}
