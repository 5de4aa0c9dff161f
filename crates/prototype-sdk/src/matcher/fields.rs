//! Field names a serde type deserializes, read without a value.

use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::forward_to_deserialize_any;

/// Deserializer that records the field list serde hands to
/// `deserialize_struct`, then stops.
struct FieldNames<'a> {
    fields: &'a mut Option<&'static [&'static str]>,
}

impl<'de> Deserializer<'de> for FieldNames<'_> {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("not a plain struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        *self.fields = Some(fields);
        Err(de::Error::custom("field names recorded"))
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

/// Returns the keys a derived struct deserializes, after renames.
///
/// `None` for types serde does not drive through `deserialize_struct`, which
/// includes structs with flattened fields.
pub(crate) fn struct_fields<S: DeserializeOwned>() -> Option<&'static [&'static str]> {
    let mut fields = None;
    match S::deserialize(FieldNames {
        fields: &mut fields,
    }) {
        Ok(_) => None,
        Err(_) => fields,
    }
}
