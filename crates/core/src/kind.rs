//! Declared field kinds
//!
//! Every field registered with a struct descriptor reports the shape of its
//! Rust type as one of six kinds. The extension decides which codec to bind
//! from the kind (and, for collections, the element kind) plus the field tag.
//!
//! ## The Six Kinds
//!
//! | Kind | Rust types | Can be nil |
//! |------|------------|------------|
//! | Int64 | `i64` | no |
//! | Pointer | `Option<T>` | yes |
//! | Interface | `serde_json::Value` | yes (`Null`) |
//! | Slice | `Vec<T>`, `Option<Vec<T>>` | only when optional |
//! | Array | `[T; N]` | no |
//! | Other | everything else | no |

/// The declared kind of a struct field
///
/// Used by extensions to classify fields. `Box<T>` is transparent and
/// reports the kind of `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Signed 64-bit integer
    Int64,

    /// Nullable reference to another value
    Pointer,

    /// Dynamically typed value
    Interface,

    /// Growable collection
    Slice,

    /// Fixed-length collection
    Array,

    /// Anything the extension does not classify
    Other,
}

impl Kind {
    /// All kinds (for iteration)
    pub const ALL: [Kind; 6] = [
        Kind::Int64,
        Kind::Pointer,
        Kind::Interface,
        Kind::Slice,
        Kind::Array,
        Kind::Other,
    ];

    /// Lowercase name, as it appears in logs
    pub const fn name(&self) -> &'static str {
        match self {
            Kind::Int64 => "int64",
            Kind::Pointer => "ptr",
            Kind::Interface => "interface",
            Kind::Slice => "slice",
            Kind::Array => "array",
            Kind::Other => "other",
        }
    }

    /// Slice or array
    pub const fn is_collection(&self) -> bool {
        matches!(self, Kind::Slice | Kind::Array)
    }

    /// Pointer or interface
    pub const fn is_reference(&self) -> bool {
        matches!(self, Kind::Pointer | Kind::Interface)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_unique() {
        use std::collections::HashSet;

        let names: HashSet<_> = Kind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), Kind::ALL.len());
    }

    #[test]
    fn test_kind_is_collection() {
        assert!(Kind::Slice.is_collection());
        assert!(Kind::Array.is_collection());

        assert!(!Kind::Int64.is_collection());
        assert!(!Kind::Pointer.is_collection());
        assert!(!Kind::Interface.is_collection());
        assert!(!Kind::Other.is_collection());
    }

    #[test]
    fn test_kind_is_reference() {
        assert!(Kind::Pointer.is_reference());
        assert!(Kind::Interface.is_reference());

        assert!(!Kind::Int64.is_reference());
        assert!(!Kind::Slice.is_reference());
        assert!(!Kind::Array.is_reference());
        assert!(!Kind::Other.is_reference());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(format!("{}", Kind::Int64), "int64");
        assert_eq!(format!("{}", Kind::Pointer), "ptr");
        assert_eq!(format!("{}", Kind::Slice), "slice");
    }
}
