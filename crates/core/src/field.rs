//! Field types and erased field slots
//!
//! A struct descriptor never sees concrete field types. Each field is
//! reached through an accessor that returns a `&dyn Slot`, and codecs read
//! and write the field only through that interface:
//!
//! - `int64` / `set_int64` for the hex string codec
//! - `int64_seq` / `set_int64_seq` for the hex array codec
//! - `is_nil` for the empty-collection codecs
//! - `to_json` / `from_json` for the default serde path
//!
//! [`FieldType`] carries the static side (declared kind, element kind) and is
//! implemented for the std types a tagged struct can hold. [`Slot`] is
//! blanket-implemented for every `FieldType`.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kind::Kind;

/// A Rust type usable as a field of a tagged struct
///
/// Every hook has a default suited to an opaque scalar (`Kind::Other`,
/// never nil, never zero), so structs declared with `json_struct!` get an
/// empty impl.
pub trait FieldType: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Declared kind of the field
    const KIND: Kind = Kind::Other;

    /// Kind of the elements, for collections
    const ELEM_KIND: Kind = Kind::Other;

    /// Null reference (`None`, `Value::Null`)
    fn is_nil(&self) -> bool {
        false
    }

    /// Zero value for `omitempty`
    fn is_zero(&self) -> bool {
        false
    }

    /// The value, if this is an int64
    fn int64(&self) -> Option<i64> {
        None
    }

    /// Store an int64; `false` if this is not an int64
    fn set_int64(&mut self, _value: i64) -> bool {
        false
    }

    /// The elements, if this is a non-nil collection of int64
    fn int64_seq(&self) -> Option<&[i64]> {
        None
    }

    /// Replace the elements of a collection of int64
    fn set_int64_seq(&mut self, _values: Vec<i64>) -> bool {
        false
    }

    /// Reset to nil, or to the zero value when the type cannot be nil
    fn set_nil(&mut self) {
        *self = Self::default();
    }
}

/// Type-erased location of one field
pub trait Slot: Send + Sync {
    /// Declared kind
    fn kind(&self) -> Kind;

    /// Element kind, for collections
    fn elem_kind(&self) -> Kind;

    /// Null reference
    fn is_nil(&self) -> bool;

    /// Zero value for `omitempty`
    fn is_zero(&self) -> bool;

    /// The value, if this is an int64
    fn int64(&self) -> Option<i64>;

    /// Store an int64
    fn set_int64(&mut self, value: i64) -> bool;

    /// The elements, if this is a non-nil collection of int64
    fn int64_seq(&self) -> Option<&[i64]>;

    /// Replace the elements of a collection of int64
    fn set_int64_seq(&mut self, values: Vec<i64>) -> bool;

    /// Reset to nil
    fn set_nil(&mut self);

    /// Default serde encoding of the field
    fn to_json(&self) -> serde_json::Result<Value>;

    /// Default serde decoding into the field
    fn from_json(&mut self, value: Value) -> serde_json::Result<()>;
}

impl<T: FieldType> Slot for T {
    fn kind(&self) -> Kind {
        T::KIND
    }

    fn elem_kind(&self) -> Kind {
        T::ELEM_KIND
    }

    fn is_nil(&self) -> bool {
        FieldType::is_nil(self)
    }

    fn is_zero(&self) -> bool {
        FieldType::is_zero(self)
    }

    fn int64(&self) -> Option<i64> {
        FieldType::int64(self)
    }

    fn set_int64(&mut self, value: i64) -> bool {
        FieldType::set_int64(self, value)
    }

    fn int64_seq(&self) -> Option<&[i64]> {
        FieldType::int64_seq(self)
    }

    fn set_int64_seq(&mut self, values: Vec<i64>) -> bool {
        FieldType::set_int64_seq(self, values)
    }

    fn set_nil(&mut self) {
        FieldType::set_nil(self)
    }

    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn from_json(&mut self, value: Value) -> serde_json::Result<()> {
        *self = T::deserialize(value)?;
        Ok(())
    }
}

// ============================================================================
// Scalars
// ============================================================================

impl FieldType for i64 {
    const KIND: Kind = Kind::Int64;

    fn is_zero(&self) -> bool {
        *self == 0
    }

    fn int64(&self) -> Option<i64> {
        Some(*self)
    }

    fn set_int64(&mut self, value: i64) -> bool {
        *self = value;
        true
    }
}

macro_rules! scalar_field {
    ($($ty:ty => $zero:expr),* $(,)?) => {
        $(
            impl FieldType for $ty {
                fn is_zero(&self) -> bool {
                    *self == $zero
                }
            }
        )*
    };
}

scalar_field! {
    bool => false,
    i8 => 0,
    i16 => 0,
    i32 => 0,
    isize => 0,
    u8 => 0,
    u16 => 0,
    u32 => 0,
    u64 => 0,
    usize => 0,
    f32 => 0.0,
    f64 => 0.0,
}

impl FieldType for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl FieldType for Value {
    const KIND: Kind = Kind::Interface;

    fn is_nil(&self) -> bool {
        self.is_null()
    }

    fn is_zero(&self) -> bool {
        self.is_null()
    }
}

// ============================================================================
// References
// ============================================================================

impl<T: FieldType> FieldType for Option<T> {
    // An optional collection is a nullable collection, not a pointer.
    const KIND: Kind = match T::KIND {
        Kind::Slice | Kind::Array => Kind::Slice,
        _ => Kind::Pointer,
    };
    const ELEM_KIND: Kind = T::ELEM_KIND;

    fn is_nil(&self) -> bool {
        self.is_none()
    }

    // A present collection is still zero when it has no elements.
    fn is_zero(&self) -> bool {
        match self {
            None => true,
            Some(inner) => Self::KIND == Kind::Slice && FieldType::is_zero(inner),
        }
    }

    fn int64_seq(&self) -> Option<&[i64]> {
        self.as_ref().and_then(|inner| FieldType::int64_seq(inner))
    }

    fn set_int64_seq(&mut self, values: Vec<i64>) -> bool {
        FieldType::set_int64_seq(self.get_or_insert_with(T::default), values)
    }

    fn set_nil(&mut self) {
        *self = None;
    }
}

impl<T: FieldType> FieldType for Box<T> {
    const KIND: Kind = T::KIND;
    const ELEM_KIND: Kind = T::ELEM_KIND;

    fn is_nil(&self) -> bool {
        FieldType::is_nil(&**self)
    }

    fn is_zero(&self) -> bool {
        FieldType::is_zero(&**self)
    }

    fn int64(&self) -> Option<i64> {
        FieldType::int64(&**self)
    }

    fn set_int64(&mut self, value: i64) -> bool {
        FieldType::set_int64(&mut **self, value)
    }

    fn int64_seq(&self) -> Option<&[i64]> {
        FieldType::int64_seq(&**self)
    }

    fn set_int64_seq(&mut self, values: Vec<i64>) -> bool {
        FieldType::set_int64_seq(&mut **self, values)
    }

    fn set_nil(&mut self) {
        FieldType::set_nil(&mut **self)
    }
}

// ============================================================================
// Collections
// ============================================================================

impl<T: FieldType> FieldType for Vec<T> {
    const KIND: Kind = Kind::Slice;
    const ELEM_KIND: Kind = T::KIND;

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn int64_seq(&self) -> Option<&[i64]> {
        (self as &dyn Any)
            .downcast_ref::<Vec<i64>>()
            .map(Vec::as_slice)
    }

    fn set_int64_seq(&mut self, values: Vec<i64>) -> bool {
        match (self as &mut dyn Any).downcast_mut::<Vec<i64>>() {
            Some(vec) => {
                *vec = values;
                true
            }
            None => false,
        }
    }
}

impl<T: FieldType, const N: usize> FieldType for [T; N]
where
    [T; N]: Default + Serialize + DeserializeOwned,
{
    const KIND: Kind = Kind::Array;
    const ELEM_KIND: Kind = T::KIND;

    fn is_zero(&self) -> bool {
        N == 0
    }

    fn int64_seq(&self) -> Option<&[i64]> {
        (self as &dyn Any)
            .downcast_ref::<[i64; N]>()
            .map(|array| array.as_slice())
    }

    /// Copies the leading `N` values and zeroes whatever is left.
    fn set_int64_seq(&mut self, values: Vec<i64>) -> bool {
        match (self as &mut dyn Any).downcast_mut::<[i64; N]>() {
            Some(array) => {
                for (i, slot) in array.iter_mut().enumerate() {
                    *slot = values.get(i).copied().unwrap_or(0);
                }
                true
            }
            None => false,
        }
    }
}

impl<T: FieldType> FieldType for HashMap<String, T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: FieldType> FieldType for BTreeMap<String, T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
