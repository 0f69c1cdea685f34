//! This module connects [`Value`] trees to serde.
//!
//! Any self-describing serde format can be buffered into a `Value` (through
//! its `Deserialize` impl), and any `Deserialize` type can be decoded from a
//! borrowed `&Value` (through its `Deserializer` impl).
//!
//! [`Isolated`](crate::Isolated) buffers its subtree into a `Buffered`
//! instead, which keeps repeated map keys, so that the decode it attempts
//! against the buffer fails exactly where decoding straight from the
//! format would.

use crate::util::{mismatch, DecodeError, DecodeResult};
use crate::value::{Value, ValueMap};
use serde::de::value::{MapDeserializer, SeqDeserializer};
use serde::de::{
    self, Deserialize, DeserializeSeed, Deserializer, EnumAccess, Expected, IntoDeserializer,
    MapAccess, SeqAccess, Unexpected, VariantAccess, Visitor,
};
use serde::forward_to_deserialize_any;
use std::convert::TryFrom;
use std::fmt;

/// Decode a `Deserialize` type from a borrowed `Value`.
pub fn from_value<'a, T: Deserialize<'a>>(value: &'a Value) -> DecodeResult<T> {
    T::deserialize(value)
}

impl de::Error for DecodeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DecodeError::Custom(msg.to_string())
    }

    fn invalid_type(unexp: Unexpected, exp: &dyn Expected) -> Self {
        match unexp {
            Unexpected::Unit | Unexpected::Option => DecodeError::ValueNull,
            _ => mismatch(exp.to_string()),
        }
    }

    fn invalid_value(_unexp: Unexpected, exp: &dyn Expected) -> Self {
        mismatch(exp.to_string())
    }

    fn invalid_length(len: usize, exp: &dyn Expected) -> Self {
        mismatch(format!("{} (got {} elements)", exp, len))
    }

    fn unknown_variant(variant: &str, _expected: &'static [&'static str]) -> Self {
        DecodeError::UnknownEnumerant(variant.to_string())
    }

    fn missing_field(field: &'static str) -> Self {
        DecodeError::nested(field, DecodeError::ValueAbsent)
    }
}

/// A subtree buffered from a serde format.
///
/// Unlike `Value::Map`, a buffered map keeps every entry in document order,
/// repeated keys included, so a type decoded from the buffer sees exactly
/// what the format produced.
pub(crate) enum Buffered {
    Leaf(Value),
    Seq(Vec<Buffered>),
    Map(Vec<(Buffered, Buffered)>),
}

impl Buffered {
    /// Collapse into a `Value`.  Of repeated map keys, the last one wins.
    pub(crate) fn into_value(self) -> Value {
        match self {
            Buffered::Leaf(value) => value,
            Buffered::Seq(items) => {
                Value::Array(items.into_iter().map(Buffered::into_value).collect())
            }
            Buffered::Map(entries) => {
                let map: ValueMap = entries
                    .into_iter()
                    .map(|(k, v)| (k.into_value(), v.into_value()))
                    .collect();
                Value::Map(map)
            }
        }
    }
}

struct BufferVisitor;

impl<'de> Visitor<'de> for BufferVisitor {
    type Value = Buffered;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any value")
    }

    fn visit_bool<E>(self, b: bool) -> Result<Buffered, E> {
        Ok(Buffered::Leaf(Value::Bool(b)))
    }

    fn visit_i64<E>(self, i: i64) -> Result<Buffered, E> {
        Ok(Buffered::Leaf(Value::Integer(i.into())))
    }

    fn visit_u64<E>(self, u: u64) -> Result<Buffered, E> {
        Ok(Buffered::Leaf(Value::Integer(u.into())))
    }

    fn visit_i128<E>(self, i: i128) -> Result<Buffered, E> {
        Ok(Buffered::Leaf(Value::Integer(i)))
    }

    fn visit_u128<E: de::Error>(self, u: u128) -> Result<Buffered, E> {
        i128::try_from(u)
            .map(|i| Buffered::Leaf(Value::Integer(i)))
            .map_err(|_| E::custom(format!("integer {} out of range", u)))
    }

    fn visit_f64<E>(self, f: f64) -> Result<Buffered, E> {
        Ok(Buffered::Leaf(Value::from_float(f)))
    }

    fn visit_str<E>(self, s: &str) -> Result<Buffered, E> {
        Ok(Buffered::Leaf(Value::text(s)))
    }

    fn visit_string<E>(self, s: String) -> Result<Buffered, E> {
        Ok(Buffered::Leaf(Value::Text(s)))
    }

    fn visit_bytes<E>(self, b: &[u8]) -> Result<Buffered, E> {
        Ok(Buffered::Leaf(Value::Bytes(b.to_vec())))
    }

    fn visit_byte_buf<E>(self, b: Vec<u8>) -> Result<Buffered, E> {
        Ok(Buffered::Leaf(Value::Bytes(b)))
    }

    fn visit_none<E>(self) -> Result<Buffered, E> {
        Ok(Buffered::Leaf(Value::Null))
    }

    fn visit_unit<E>(self) -> Result<Buffered, E> {
        Ok(Buffered::Leaf(Value::Null))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Buffered, D::Error> {
        Buffered::deserialize(deserializer)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Buffered, D::Error> {
        Buffered::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Buffered, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Buffered::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Buffered, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(entry) = access.next_entry()? {
            entries.push(entry);
        }
        Ok(Buffered::Map(entries))
    }
}

impl<'de> Deserialize<'de> for Buffered {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Buffered, D::Error> {
        deserializer.deserialize_any(BufferVisitor)
    }
}

/// Repeated map keys are collapsed; the last entry wins.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
        Buffered::deserialize(deserializer).map(Buffered::into_value)
    }
}

impl<'de> IntoDeserializer<'de, DecodeError> for &'de Buffered {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

impl<'de> Deserializer<'de> for &'de Buffered {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        match self {
            Buffered::Leaf(value) => value.deserialize_any(visitor),
            Buffered::Seq(items) => {
                let mut seq: SeqDeserializer<_, DecodeError> = SeqDeserializer::new(items.iter());
                let result = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(result)
            }
            Buffered::Map(entries) => {
                let mut map: MapDeserializer<'de, _, DecodeError> =
                    MapDeserializer::new(entries.iter().map(|(k, v)| (k, v)));
                let result = visitor.visit_map(&mut map)?;
                map.end()?;
                Ok(result)
            }
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        match self {
            Buffered::Leaf(Value::Null) => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DecodeResult<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> DecodeResult<V::Value> {
        match self {
            Buffered::Leaf(value) => value.deserialize_enum(name, variants, visitor),
            Buffered::Map(entries) if entries.len() == 1 => match &entries[0] {
                (Buffered::Leaf(Value::Text(tag)), value) => {
                    visitor.visit_enum(EnumRef { tag, value })
                }
                _ => Err(mismatch("text enum tag")),
            },
            _ => Err(mismatch("enum")),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

impl<'de> VariantAccess<'de> for &'de Buffered {
    type Error = DecodeError;

    fn unit_variant(self) -> DecodeResult<()> {
        match self {
            Buffered::Leaf(Value::Null) => Ok(()),
            _ => Err(mismatch("unit variant")),
        }
    }

    fn newtype_variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> DecodeResult<S::Value> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> DecodeResult<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> DecodeResult<V::Value> {
        self.deserialize_map(visitor)
    }
}

impl<'de> IntoDeserializer<'de, DecodeError> for &'de Value {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

impl<'de> Deserializer<'de> for &'de Value {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        match self {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Integer(i) => {
                if let Ok(u) = u64::try_from(*i) {
                    visitor.visit_u64(u)
                } else if let Ok(n) = i64::try_from(*i) {
                    visitor.visit_i64(n)
                } else {
                    visitor.visit_i128(*i)
                }
            }
            Value::Float(fl) => visitor.visit_f64(fl.0),
            Value::Bytes(b) => visitor.visit_borrowed_bytes(b),
            Value::Text(s) => visitor.visit_borrowed_str(s),
            Value::Array(a) => {
                let mut seq: SeqDeserializer<_, DecodeError> = SeqDeserializer::new(a.iter());
                let result = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(result)
            }
            Value::Map(m) => {
                let mut map: MapDeserializer<'de, _, DecodeError> = MapDeserializer::new(m.iter());
                let result = visitor.visit_map(&mut map)?;
                map.end()?;
                Ok(result)
            }
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        match self {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DecodeResult<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    // Enums are either a bare tag (`"A"`) or a single-entry map (`{"B": ...}`).
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> DecodeResult<V::Value> {
        match self {
            Value::Text(tag) => {
                let tag: de::value::StrDeserializer<DecodeError> = tag.as_str().into_deserializer();
                visitor.visit_enum(tag)
            }
            Value::Map(m) if m.len() == 1 => {
                let (variant, value) = m.iter().next().ok_or(DecodeError::ValueAbsent)?;
                match variant {
                    Value::Text(tag) => visitor.visit_enum(EnumRef { tag, value }),
                    _ => Err(mismatch("text enum tag")),
                }
            }
            Value::Null => Err(DecodeError::ValueNull),
            _ => Err(mismatch("enum")),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

struct EnumRef<'de, V> {
    tag: &'de str,
    value: V,
}

impl<'de, V: VariantAccess<'de, Error = DecodeError>> EnumAccess<'de> for EnumRef<'de, V> {
    type Error = DecodeError;
    type Variant = V;

    fn variant_seed<S: DeserializeSeed<'de>>(
        self,
        seed: S,
    ) -> DecodeResult<(S::Value, Self::Variant)> {
        let tag: de::value::BorrowedStrDeserializer<'de, DecodeError> =
            de::value::BorrowedStrDeserializer::new(self.tag);
        let variant = seed.deserialize(tag)?;
        Ok((variant, self.value))
    }
}

impl<'de> VariantAccess<'de> for &'de Value {
    type Error = DecodeError;

    fn unit_variant(self) -> DecodeResult<()> {
        match self {
            Value::Null => Ok(()),
            _ => Err(mismatch("unit variant")),
        }
    }

    fn newtype_variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> DecodeResult<S::Value> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> DecodeResult<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> DecodeResult<V::Value> {
        self.deserialize_map(visitor)
    }
}
