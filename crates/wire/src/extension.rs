//! Descriptor extensions
//!
//! An extension runs once per struct type, when the engine first builds the
//! type's descriptor, and rewrites codec bindings in place.

use std::sync::Arc;

use tagjson_core::tag::{EMPTYARRAY, EMPTYOBJECT, HEXSTRING};
use tagjson_core::Kind;
use tracing::debug;

use crate::codec::{EmptyCollectionEncoder, HexArrayCodec, HexStringCodec};
use crate::descriptor::{Binding, StructDescriptor};

/// Hook run over every newly built struct descriptor
pub trait Extension: Send + Sync {
    /// Rebind codecs on `descriptor`
    fn update_struct_descriptor(&self, descriptor: &mut StructDescriptor);
}

/// Binds codecs from the `hexstring`, `emptyobject` and `emptyarray` tag
/// markers
///
/// Per field, by declared kind:
///
/// - int64 tagged `hexstring`: [`HexStringCodec`] both ways
/// - pointer or interface tagged `emptyobject`: nil encodes as `{}`
/// - slice or array of int64, tagged or not: [`HexArrayCodec`] both ways
/// - any other slice or array tagged `emptyarray`: nil encodes as `[]`
///
/// Markers are found anywhere in the raw tag text. Other kinds are left on
/// whatever codec they already have.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagExtension;

impl TagExtension {
    fn update_binding(type_name: &'static str, binding: &mut Binding) {
        let field = &binding.field;
        let tag = &field.tag;
        match field.kind {
            Kind::Int64 => {
                if tag.contains(HEXSTRING) {
                    debug!(type_name, field = %field.name, kind = %field.kind, "binding hexstring codec");
                    let codec = Arc::new(HexStringCodec);
                    binding.encoder = codec.clone();
                    binding.decoder = codec;
                }
            }
            Kind::Pointer | Kind::Interface => {
                if tag.contains(EMPTYOBJECT) {
                    debug!(type_name, field = %field.name, kind = %field.kind, "binding emptyobject encoder");
                    binding.encoder =
                        Arc::new(EmptyCollectionEncoder::object(binding.encoder.clone()));
                }
            }
            Kind::Slice | Kind::Array => {
                if field.elem_kind == Kind::Int64 {
                    debug!(type_name, field = %field.name, kind = %field.kind, "binding hexarray codec");
                    let codec = Arc::new(HexArrayCodec::new(binding.encoder.clone()));
                    binding.encoder = codec.clone();
                    binding.decoder = codec;
                } else if tag.contains(EMPTYARRAY) {
                    debug!(type_name, field = %field.name, kind = %field.kind, "binding emptyarray encoder");
                    binding.encoder =
                        Arc::new(EmptyCollectionEncoder::array(binding.encoder.clone()));
                }
            }
            Kind::Other => {}
        }
    }
}

impl Extension for TagExtension {
    fn update_struct_descriptor(&self, descriptor: &mut StructDescriptor) {
        let type_name = descriptor.type_name();
        for binding in descriptor.bindings_mut() {
            Self::update_binding(type_name, binding);
        }
    }
}
