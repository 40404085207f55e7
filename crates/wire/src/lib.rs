//! Tag-driven JSON encoding for tagjson
//!
//! This crate layers three field behaviors on top of serde_json, chosen per
//! struct field from its declared kind and tag:
//!
//! | Field | Tag | Wire |
//! |-------|-----|------|
//! | `i64` | `hexstring` | `"0"` or 16 lowercase hex digits |
//! | `Option<T>` / `Value` | `emptyobject` | `{}` when nil |
//! | `Vec<i64>` / `[i64; N]` | any | array of hex strings, `[]` when nil |
//! | other `Vec<T>` / `[T; N]` | `emptyarray` | `[]` when nil |
//!
//! Decoding accepts hex for strings up to 16 characters and decimal beyond.
//! Unparseable strings read as zero, or are dropped from arrays.
//!
//! ## Examples
//!
//! ```
//! use tagjson_wire::{json_struct, Engine};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Item {
//!     id: i64,
//!     tags: Option<Vec<String>>,
//! }
//!
//! json_struct!(Item {
//!     id => "id,hexstring",
//!     tags => "tags,emptyarray",
//! });
//!
//! let engine = Engine::standard();
//! let json = engine.marshal_to_string(&Item { id: 255, tags: None }).unwrap();
//! assert_eq!(json, r#"{"id":"00000000000000ff","tags":[]}"#);
//!
//! let mut item = Item::default();
//! engine.unmarshal(br#"{"id":"12345678901234567"}"#, &mut item).unwrap();
//! assert_eq!(item.id, 12_345_678_901_234_567);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod extension;
pub mod indent;
mod macros;

pub use codec::{
    decode_hex, format_hex, hexstring, parse_hex, DefaultCodec, EmptyCollectionEncoder,
    EmptyLiteral, HexArrayCodec, HexStringCodec, ValDecoder, ValEncoder, HEX_WIDTH,
};
pub use descriptor::{
    deserialize_struct, serialize_struct, Binding, DecodeFieldError, Field, FieldMeta,
    JsonStruct, StructDescriptor, TypedDescriptor,
};
pub use engine::{global, Config, Decoder, Encoder, Engine};
pub use error::{Error, Result};
pub use extension::{Extension, TagExtension};
pub use tagjson_core::{json_type_name, CodecError, FieldType, Kind, Slot, Tag};

#[doc(hidden)]
pub mod __private {
    pub use serde;
}
