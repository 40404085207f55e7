//! Struct descriptors
//!
//! A struct opts in by listing its fields (usually through `json_struct!`).
//! The first time an engine meets the type it builds a [`TypedDescriptor`]:
//!
//! 1. Every field is bound to [`DefaultCodec`] for both directions.
//! 2. The engine's extensions run in registration order and may rebind or
//!    wrap codecs per field.
//! 3. The result is cached by `TypeId` and never changes again.
//!
//! Encoding and decoding then walk the cached bindings. Nothing about a
//! field is re-examined per value.

use std::fmt;
use std::sync::Arc;

use serde::de::Error as _;
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::{Map, Value};
use tagjson_core::{CodecError, FieldType, Kind, Slot, Tag};
use tracing::debug;

use crate::codec::{DefaultCodec, ValDecoder, ValEncoder};
use crate::engine::{Config, Engine};
use crate::extension::Extension;

/// A struct whose JSON form is driven by tagged field declarations
pub trait JsonStruct: Default + Send + Sync + 'static {
    /// Field declarations, in wire order
    fn fields() -> Vec<Field<Self>>;
}

/// One declared field: identifier, tag, and accessors
pub struct Field<S> {
    ident: &'static str,
    tag: &'static str,
    kind: Kind,
    elem_kind: Kind,
    accessor: Box<dyn Accessor<S>>,
}

impl<S: 'static> Field<S> {
    /// Declare a field from its accessor pair
    ///
    /// The field's kind and element kind are taken from its Rust type.
    pub fn new<F: FieldType>(
        ident: &'static str,
        tag: &'static str,
        get: fn(&S) -> &F,
        get_mut: fn(&mut S) -> &mut F,
    ) -> Self {
        Self {
            ident,
            tag,
            kind: F::KIND,
            elem_kind: F::ELEM_KIND,
            accessor: Box::new(Typed { get, get_mut }),
        }
    }
}

trait Accessor<S>: Send + Sync {
    fn get<'a>(&self, owner: &'a S) -> &'a dyn Slot;
    fn get_mut<'a>(&self, owner: &'a mut S) -> &'a mut dyn Slot;
}

struct Typed<S, F> {
    get: fn(&S) -> &F,
    get_mut: fn(&mut S) -> &mut F,
}

impl<S, F: FieldType> Accessor<S> for Typed<S, F> {
    fn get<'a>(&self, owner: &'a S) -> &'a dyn Slot {
        (self.get)(owner)
    }

    fn get_mut<'a>(&self, owner: &'a mut S) -> &'a mut dyn Slot {
        (self.get_mut)(owner)
    }
}

/// What an extension can see about a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    /// Rust identifier
    pub ident: &'static str,
    /// JSON key
    pub name: String,
    /// Declared tag
    pub tag: Tag,
    /// Declared kind
    pub kind: Kind,
    /// Element kind, for collections
    pub elem_kind: Kind,
}

/// A field with its current codec pair
pub struct Binding {
    /// Field metadata
    pub field: FieldMeta,
    /// Encoder used for this field
    pub encoder: Arc<dyn ValEncoder>,
    /// Decoder used for this field
    pub decoder: Arc<dyn ValDecoder>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("field", &self.field)
            .field("encoder", &self.encoder.name())
            .field("decoder", &self.decoder.name())
            .finish()
    }
}

/// The field table of one struct type
///
/// Extensions get `&mut` access to the bindings but cannot add, remove, or
/// reorder them.
#[derive(Debug)]
pub struct StructDescriptor {
    type_name: &'static str,
    bindings: Vec<Binding>,
}

impl StructDescriptor {
    /// Rust type name of the struct
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All bindings, in wire order
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// All bindings, for rebinding codecs
    pub fn bindings_mut(&mut self) -> &mut [Binding] {
        &mut self.bindings
    }

    /// Binding by JSON key
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|binding| binding.field.name == name)
    }

    fn position(&self, key: &str, case_sensitive: bool) -> Option<usize> {
        let exact = self.bindings.iter().position(|b| b.field.name == key);
        if exact.is_some() || case_sensitive {
            return exact;
        }
        self.bindings
            .iter()
            .position(|b| b.field.name.eq_ignore_ascii_case(key))
    }
}

/// A descriptor together with the accessors for type `S`
pub struct TypedDescriptor<S> {
    descriptor: StructDescriptor,
    accessors: Vec<Box<dyn Accessor<S>>>,
}

impl<S: JsonStruct> TypedDescriptor<S> {
    /// Build the field table and run `extensions` over it
    pub fn build(extensions: &[Arc<dyn Extension>]) -> Self {
        let type_name = std::any::type_name::<S>();
        let default_codec = Arc::new(DefaultCodec);

        let mut bindings = Vec::new();
        let mut accessors = Vec::new();
        for field in S::fields() {
            let tag = Tag::new(field.tag);
            if tag.is_skipped() {
                debug!(type_name, field = field.ident, "field skipped by tag");
                continue;
            }
            let name = tag.name().unwrap_or(field.ident).to_string();
            bindings.push(Binding {
                field: FieldMeta {
                    ident: field.ident,
                    name,
                    tag,
                    kind: field.kind,
                    elem_kind: field.elem_kind,
                },
                encoder: default_codec.clone(),
                decoder: default_codec.clone(),
            });
            accessors.push(field.accessor);
        }

        let mut descriptor = StructDescriptor {
            type_name,
            bindings,
        };
        for extension in extensions {
            extension.update_struct_descriptor(&mut descriptor);
        }
        debug!(
            type_name,
            fields = descriptor.bindings.len(),
            "struct descriptor built"
        );

        Self {
            descriptor,
            accessors,
        }
    }

    /// The finished field table
    pub fn descriptor(&self) -> &StructDescriptor {
        &self.descriptor
    }

    /// Write `value` as a JSON object, fields in declaration order
    pub fn serialize<Ser: Serializer>(
        &self,
        value: &S,
        serializer: Ser,
    ) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (binding, accessor) in self.descriptor.bindings.iter().zip(&self.accessors) {
            let slot = accessor.get(value);
            if binding.field.tag.omit_empty() && binding.encoder.is_empty(slot) {
                continue;
            }
            let encoded = binding.encoder.encode(slot).map_err(Ser::Error::custom)?;
            map.serialize_entry(binding.field.name.as_str(), &encoded)?;
        }
        map.end()
    }

    /// Apply the members of `object` to `target`
    ///
    /// Keys match exactly first, then ASCII case-insensitively unless the
    /// config is case sensitive. Unknown keys are ignored unless the config
    /// disallows them. Missing keys leave the target untouched.
    pub fn decode(
        &self,
        target: &mut S,
        object: Map<String, Value>,
        config: &Config,
    ) -> Result<(), DecodeFieldError> {
        for (key, value) in object {
            let index = match self.descriptor.position(&key, config.case_sensitive) {
                Some(index) => index,
                None if config.disallow_unknown_fields => {
                    return Err(DecodeFieldError::UnknownField {
                        type_name: self.descriptor.type_name,
                        key,
                    });
                }
                None => continue,
            };
            let binding = &self.descriptor.bindings[index];
            let slot = self.accessors[index].get_mut(target);
            binding
                .decoder
                .decode(slot, value)
                .map_err(|source| DecodeFieldError::Field {
                    field: binding.field.name.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}

/// Failure applying a JSON object to a tagged struct
#[derive(Debug, thiserror::Error)]
pub enum DecodeFieldError {
    /// Key with no matching field while unknown fields are disallowed
    #[error("unknown field `{key}` for {type_name}")]
    UnknownField {
        /// Struct being decoded
        type_name: &'static str,
        /// Offending key
        key: String,
    },

    /// A field's decoder failed
    #[error("field `{field}`: {source}")]
    Field {
        /// JSON key of the field
        field: String,
        /// Codec failure
        #[source]
        source: CodecError,
    },
}

/// `Serialize` body for a tagged struct, using the engine in scope
pub fn serialize_struct<S, Ser>(value: &S, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
where
    S: JsonStruct,
    Ser: Serializer,
{
    Engine::current().descriptor::<S>().serialize(value, serializer)
}

/// `Deserialize` body for a tagged struct, using the engine in scope
///
/// `null` yields `S::default()`; any token other than an object is an error.
pub fn deserialize_struct<'de, S, D>(deserializer: D) -> Result<S, D::Error>
where
    S: JsonStruct,
    D: Deserializer<'de>,
{
    let engine = Engine::current();
    let mut target = S::default();
    match Value::deserialize(deserializer)? {
        Value::Object(object) => engine
            .descriptor::<S>()
            .decode(&mut target, object, engine.config())
            .map_err(D::Error::custom)?,
        Value::Null => {}
        other => return Err(D::Error::custom(CodecError::mismatch("object", &other))),
    }
    Ok(target)
}
