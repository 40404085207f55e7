//! `json_struct!` declaration macro

/// Declare the tagged fields of a struct
///
/// Generates the [`JsonStruct`](crate::JsonStruct) field table plus
/// `Serialize`, `Deserialize` and [`FieldType`](crate::FieldType) impls, so
/// the struct can be marshalled on its own or nested in another tagged
/// struct. The struct must implement `Default`.
///
/// Fields are listed as `ident => "tag"`, in wire order. Fields left out of
/// the list are neither encoded nor decoded.
///
/// ```ignore
/// #[derive(Debug, Default)]
/// struct Node {
///     id: i64,
///     parent: Option<Box<Node>>,
///     children: Option<Vec<i64>>,
///     labels: Option<Vec<String>>,
/// }
///
/// tagjson::json_struct!(Node {
///     id => "id,hexstring",
///     parent => "parent,omitempty,emptyobject",
///     children => "children",
///     labels => "labels,emptyarray",
/// });
/// ```
#[macro_export]
macro_rules! json_struct {
    ($ty:ty { $($field:ident => $tag:expr),* $(,)? }) => {
        impl $crate::JsonStruct for $ty {
            fn fields() -> ::std::vec::Vec<$crate::Field<Self>> {
                ::std::vec![
                    $(
                        $crate::Field::<Self>::new(
                            ::std::stringify!($field),
                            $tag,
                            |value| &value.$field,
                            |value| &mut value.$field,
                        ),
                    )*
                ]
            }
        }

        impl $crate::FieldType for $ty {}

        impl $crate::__private::serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                $crate::serialize_struct(self, serializer)
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                $crate::deserialize_struct(deserializer)
            }
        }
    };
}
