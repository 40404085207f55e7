//! Field model for tagjson
//!
//! This crate defines what the codec layer knows about a struct field:
//!
//! - [`Kind`]: the declared shape of the field's type
//! - [`Tag`]: the serialization tag with its keywords
//! - [`FieldType`] / [`Slot`]: static and type-erased access to the field
//! - [`CodecError`]: errors a field codec can raise

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod field;
pub mod kind;
pub mod tag;

pub use error::{json_type_name, CodecError};
pub use field::{FieldType, Slot};
pub use kind::Kind;
pub use tag::Tag;
