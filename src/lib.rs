//! # tagjson
//!
//! JSON with a few tag-driven field encodings, on top of serde_json.
//!
//! Declare a struct's fields with [`json_struct!`] and annotate the tags:
//!
//! - `hexstring` on an `i64`: written as `"0"` or 16 lowercase hex digits,
//!   read back from hex (up to 16 characters) or decimal (longer).
//! - `emptyobject` on an `Option<T>` or `serde_json::Value`: `{}` instead
//!   of `null` when nil.
//! - `emptyarray` on a `Vec<T>`, `[T; N]`, or `Option<Vec<T>>`: `[]`
//!   instead of `null` when nil.
//!
//! Collections of `i64` are always written as arrays of hex strings.
//!
//! ## Quick Start
//!
//! ```
//! use tagjson::json_struct;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Account {
//!     id: i64,
//!     owner: Option<Box<Account>>,
//!     roles: Option<Vec<String>>,
//!     members: Vec<i64>,
//! }
//!
//! json_struct!(Account {
//!     id => "id,hexstring",
//!     owner => "owner,emptyobject",
//!     roles => "roles,emptyarray",
//!     members => "members,omitempty",
//! });
//!
//! let account = Account { id: 255, ..Default::default() };
//! let json = tagjson::marshal_to_string(&account).unwrap();
//! assert_eq!(json, r#"{"id":"00000000000000ff","owner":{},"roles":[]}"#);
//!
//! let mut back = Account::default();
//! tagjson::unmarshal(br#"{"id":"ff","members":["0","x","10"]}"#, &mut back).unwrap();
//! assert_eq!(back.id, 255);
//! assert_eq!(back.members, vec![0, 16]);
//! ```
//!
//! Every function here uses one process-wide [`Engine`]. Build a separate
//! engine with [`Config`] for stricter key matching.

#![warn(missing_docs)]

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use tagjson_core::{json_type_name, CodecError, FieldType, Kind, Slot, Tag};
pub use tagjson_wire::{
    decode_hex, deserialize_struct, format_hex, hexstring, json_struct, parse_hex,
    serialize_struct, Config, Decoder, DefaultCodec, EmptyCollectionEncoder, EmptyLiteral,
    Encoder, Engine, Error, Extension, Field, HexArrayCodec, HexStringCodec, JsonStruct, Result,
    TagExtension, ValDecoder, ValEncoder,
};

/// The process-wide engine behind the functions in this crate
pub fn engine() -> &'static Engine {
    tagjson_wire::global()
}

/// Encode `value` as compact JSON
pub fn marshal<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    engine().marshal(value)
}

/// Encode `value` as a compact JSON string
pub fn marshal_to_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    engine().marshal_to_string(value)
}

/// Encode `value` with one element per line
///
/// Lines after the first start with `prefix` followed by one `indent` per
/// nesting level.
pub fn marshal_indent<T: Serialize + ?Sized>(
    value: &T,
    prefix: &str,
    indent: &str,
) -> Result<Vec<u8>> {
    engine().marshal_indent(value, prefix, indent)
}

/// Decode the JSON object in `data` onto `dest`
///
/// Only the fields present in `data` are written. Absent fields keep their
/// values and a `null` document leaves `dest` as it was.
pub fn unmarshal<S: JsonStruct>(data: &[u8], dest: &mut S) -> Result<()> {
    engine().unmarshal(data, dest)
}

/// Decode `data` as a new value of any deserializable type
pub fn from_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    engine().from_slice(data)
}

/// Stream encoder: one JSON document per line
pub fn new_encoder<W: Write>(writer: W) -> Encoder<W> {
    engine().new_encoder(writer)
}

/// Stream decoder over whitespace-separated JSON documents
pub fn new_decoder<R: Read>(reader: R) -> Decoder<R> {
    engine().new_decoder(reader)
}
