//! Namespace-keyed tagged unions.
//!
//! The realtime API encodes "exactly one of several alternatives" as a JSON
//! object whose *keys* are fully-qualified type names:
//!
//! ```json
//! { "com.linkedin.voyager.messaging.event.MessageEvent": { "body": "hi" } }
//! ```
//!
//! A record with one optional field per known alternative is declared with
//! [`tagged_union!`](crate::tagged_union). The macro only emits the wire-key
//! table; decoding and encoding are done here, once, for every such record.
//!
//! Decoding is permissive: every known key that carries a non-null value fills
//! its field, unknown keys are dropped, and nothing checks that only one key is
//! populated.

use serde::de::Error as _;
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::{Map, Value};

#[doc(hidden)]
pub mod __private {
    pub use serde;
    pub use serde_json;
}

/// Decodes a variant's JSON value into the matching field of `T`.
pub type DecodeFn<T> = fn(&mut T, Value) -> Result<(), serde_json::Error>;
/// Encodes the matching field of `T`, or `None` when the field is empty.
pub type EncodeFn<T> = fn(&T) -> Option<Result<Value, serde_json::Error>>;

/// One row of a tagged union's wire-key table.
pub struct Variant<T: 'static> {
    /// Fully-qualified namespace used as the JSON key.
    pub key: &'static str,
    pub decode: DecodeFn<T>,
    pub encode: EncodeFn<T>,
    pub is_set: fn(&T) -> bool,
}

/// A record whose alternatives are selected by namespace key.
pub trait TaggedUnion: Default + Sized + 'static {
    /// Wire-key table, in declaration order.
    const VARIANTS: &'static [Variant<Self>];

    /// Wire keys of the populated alternatives, in table order.
    fn populated_keys(&self) -> Vec<&'static str> {
        Self::VARIANTS
            .iter()
            .filter(|variant| (variant.is_set)(self))
            .map(|variant| variant.key)
            .collect()
    }

    /// True when no alternative is populated.
    fn is_empty(&self) -> bool {
        !Self::VARIANTS.iter().any(|variant| (variant.is_set)(self))
    }
}

/// Decodes a JSON object into `T` using `T`'s wire-key table.
pub fn decode_object<T: TaggedUnion>(mut object: Map<String, Value>) -> Result<T, serde_json::Error> {
    let mut target = T::default();
    for variant in T::VARIANTS {
        match object.remove(variant.key) {
            None | Some(Value::Null) => {}
            Some(value) => (variant.decode)(&mut target, value)?,
        }
    }
    Ok(target)
}

/// Decodes any JSON value into `T`. `null` yields an empty record.
pub fn decode<T: TaggedUnion>(value: Value) -> Result<T, serde_json::Error> {
    match value {
        Value::Object(object) => decode_object(object),
        Value::Null => Ok(T::default()),
        other => Err(<serde_json::Error as serde::de::Error>::custom(format!(
            "expected a namespace-keyed object, found {other}"
        ))),
    }
}

/// Encodes `value` as an object with one member per populated alternative.
pub fn encode<T: TaggedUnion>(value: &T) -> Result<Value, serde_json::Error> {
    let mut object = Map::new();
    for variant in T::VARIANTS {
        if let Some(encoded) = (variant.encode)(value) {
            object.insert(variant.key.to_string(), encoded?);
        }
    }
    Ok(Value::Object(object))
}

/// `Deserialize` body shared by every [`tagged_union!`](crate::tagged_union) record.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TaggedUnion,
{
    let object = Map::<String, Value>::deserialize(deserializer)?;
    decode_object(object).map_err(D::Error::custom)
}

/// `Serialize` body shared by every [`tagged_union!`](crate::tagged_union) record.
pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: TaggedUnion,
{
    let mut map = serializer.serialize_map(None)?;
    for variant in T::VARIANTS {
        if let Some(encoded) = (variant.encode)(value) {
            let encoded = encoded.map_err(S::Error::custom)?;
            map.serialize_entry(variant.key, &encoded)?;
        }
    }
    map.end()
}

/// Declares a namespace-keyed tagged union.
///
/// ```rust,ignore
/// tagged_union! {
///     /// Content of a conversation event.
///     pub struct EventContent {
///         "com.linkedin.voyager.messaging.event.MessageEvent" => message_event: MessageEvent,
///     }
/// }
/// ```
///
/// Each entry becomes a `pub` field of type `Option<T>`. The record derives
/// `Debug`, `Clone`, `Default` and `PartialEq` and implements
/// [`TaggedUnion`], `Serialize` and `Deserialize`.
#[macro_export]
macro_rules! tagged_union {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $key:literal => $field:ident : $ty:ty
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: ::std::option::Option<$ty>,
            )+
        }

        impl $crate::tagged::TaggedUnion for $name {
            const VARIANTS: &'static [$crate::tagged::Variant<Self>] = &[
                $(
                    $crate::tagged::Variant {
                        key: $key,
                        decode: |target: &mut $name,
                                 value: $crate::tagged::__private::serde_json::Value|
                         -> ::std::result::Result<(), $crate::tagged::__private::serde_json::Error> {
                            target.$field = ::std::option::Option::Some(
                                $crate::tagged::__private::serde_json::from_value(value)?,
                            );
                            ::std::result::Result::Ok(())
                        },
                        encode: |source: &$name| {
                            source
                                .$field
                                .as_ref()
                                .map($crate::tagged::__private::serde_json::to_value)
                        },
                        is_set: |source: &$name| source.$field.is_some(),
                    },
                )+
            ];
        }

        impl<'de> $crate::tagged::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::tagged::__private::serde::Deserializer<'de>,
            {
                $crate::tagged::deserialize(deserializer)
            }
        }

        impl $crate::tagged::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::tagged::__private::serde::Serializer,
            {
                $crate::tagged::serialize(self, serializer)
            }
        }
    };
}
