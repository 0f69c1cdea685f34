//! This module contains the `Decode` and `Encode` traits, and their
//! implementations for common types.
//!
//! `Decode` is strict: any mismatch is an error, and the error propagates
//! to the caller.  The only way to stop that propagation is to wrap a type
//! in [`Isolated`](crate::Isolated).

use crate::context::{Context, SilentContext};
use crate::util::{mismatch, DecodeError, DecodeResult};
use crate::value::{Value, ValueMap};
use std::collections::BTreeMap;
use std::convert::TryFrom;

/// A type that can be decoded from a [`Value`].
///
/// Implementations of structured types should usually go through
/// [`Fields`](crate::Fields), which handles the key lookups and attaches
/// field names to errors.
pub trait Decode: Sized {
    /// Decode `value`, reporting absorbed failures to `ctx`.
    fn decode(value: &Value, ctx: &dyn Context) -> DecodeResult<Self>;
}

/// A type that can be encoded into a [`Value`].
pub trait Encode {
    /// Produce the canonical encoding of `self`.
    fn encode(&self) -> Value;
}

/// Decode a value with a [`SilentContext`].
pub fn decode<T: Decode>(value: &Value) -> DecodeResult<T> {
    T::decode(value, &SilentContext)
}

/// Decode a value, reporting absorbed failures to `ctx`.
pub fn decode_with<T: Decode>(value: &Value, ctx: &dyn Context) -> DecodeResult<T> {
    T::decode(value, ctx)
}

/// Encode a value.
pub fn encode<T: Encode + ?Sized>(t: &T) -> Value {
    t.encode()
}

// Null gets its own error; anything else is a plain mismatch.
pub(crate) fn unexpected(value: &Value, expected: &str) -> DecodeError {
    match value {
        Value::Null => DecodeError::ValueNull,
        _ => mismatch(format!("{} (got {})", expected, value.kind_name())),
    }
}

/// Decode a text tag into one of a fixed set of values.
///
/// A tag that isn't in `known` is an `UnknownEnumerant` error.
///
/// ```
/// use failsafe_decode::{decode_enumerant, DecodeError, Value};
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Light { Red, Green }
/// const LIGHTS: &[(&str, Light)] = &[("RED", Light::Red), ("GREEN", Light::Green)];
///
/// assert_eq!(decode_enumerant(&Value::text("RED"), LIGHTS), Ok(Light::Red));
/// assert_eq!(
///     decode_enumerant(&Value::text("BLUE"), LIGHTS),
///     Err(DecodeError::UnknownEnumerant("BLUE".into()))
/// );
/// ```
pub fn decode_enumerant<T: Copy>(value: &Value, known: &[(&str, T)]) -> DecodeResult<T> {
    match value {
        Value::Text(tag) => known
            .iter()
            .find(|(name, _)| *name == tag.as_str())
            .map(|(_, t)| *t)
            .ok_or_else(|| DecodeError::UnknownEnumerant(tag.clone())),
        _ => Err(unexpected(value, "text")),
    }
}

impl Decode for Value {
    fn decode(value: &Value, _ctx: &dyn Context) -> DecodeResult<Self> {
        Ok(value.clone())
    }
}

impl Encode for Value {
    fn encode(&self) -> Value {
        self.clone()
    }
}

impl Decode for bool {
    fn decode(value: &Value, _ctx: &dyn Context) -> DecodeResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(unexpected(value, "bool")),
        }
    }
}

impl Encode for bool {
    fn encode(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! integer_impls {
    ($($t:ty)*) => {$(
        impl Decode for $t {
            fn decode(value: &Value, _ctx: &dyn Context) -> DecodeResult<Self> {
                match value {
                    Value::Integer(i) => {
                        <$t>::try_from(*i).map_err(|_| mismatch(stringify!($t)))
                    }
                    _ => Err(unexpected(value, stringify!($t))),
                }
            }
        }

        impl Encode for $t {
            fn encode(&self) -> Value {
                Value::Integer(*self as i128)
            }
        }
    )*};
}

integer_impls! { i8 i16 i32 i64 i128 u8 u16 u32 u64 isize usize }

// Integers are accepted where a float is wanted, the same way JSON does.
impl Decode for f64 {
    fn decode(value: &Value, _ctx: &dyn Context) -> DecodeResult<Self> {
        match value {
            Value::Float(f) => Ok(f.0),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) => Ok(*i as f64),
            _ => Err(unexpected(value, "float")),
        }
    }
}

impl Encode for f64 {
    fn encode(&self) -> Value {
        Value::from_float(*self)
    }
}

impl Decode for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn decode(value: &Value, ctx: &dyn Context) -> DecodeResult<Self> {
        f64::decode(value, ctx).map(|f| f as f32)
    }
}

impl Encode for f32 {
    fn encode(&self) -> Value {
        Value::from_float(*self)
    }
}

impl Decode for String {
    fn decode(value: &Value, _ctx: &dyn Context) -> DecodeResult<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            _ => Err(unexpected(value, "text")),
        }
    }
}

impl Encode for String {
    fn encode(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl Encode for str {
    fn encode(&self) -> Value {
        Value::text(self)
    }
}

/// A byte string.
///
/// Decodes from a native byte string, or from base64 text (which is how
/// byte strings are written into JSON).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteBuf(pub Vec<u8>);

impl Decode for ByteBuf {
    fn decode(value: &Value, _ctx: &dyn Context) -> DecodeResult<Self> {
        match value {
            Value::Bytes(b) => Ok(ByteBuf(b.clone())),
            Value::Text(t) => base64::decode(t)
                .map(ByteBuf)
                .map_err(|e| DecodeError::ValueError(format!("base64: {}", e))),
            _ => Err(unexpected(value, "bytes")),
        }
    }
}

impl Encode for ByteBuf {
    fn encode(&self) -> Value {
        Value::Bytes(self.0.clone())
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(value: &Value, ctx: &dyn Context) -> DecodeResult<Self> {
        match value {
            Value::Array(a) => a
                .iter()
                .enumerate()
                .map(|(i, v)| T::decode(v, ctx).map_err(|e| DecodeError::nested(i.to_string(), e)))
                .collect(),
            _ => Err(unexpected(value, "array")),
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self) -> Value {
        Value::Array(self.iter().map(Encode::encode).collect())
    }
}

impl<T: Decode> Decode for BTreeMap<String, T> {
    fn decode(value: &Value, ctx: &dyn Context) -> DecodeResult<Self> {
        match value {
            Value::Map(m) => m
                .iter()
                .map(|(k, v)| {
                    let key = match k {
                        Value::Text(key) => key,
                        _ => return Err(mismatch("text map key")),
                    };
                    let v = T::decode(v, ctx).map_err(|e| DecodeError::nested(key.as_str(), e))?;
                    Ok((key.clone(), v))
                })
                .collect(),
            _ => Err(unexpected(value, "map")),
        }
    }
}

impl<T: Encode> Encode for BTreeMap<String, T> {
    fn encode(&self) -> Value {
        let map: ValueMap = self
            .iter()
            .map(|(k, v)| (Value::text(k.as_str()), v.encode()))
            .collect();
        Value::Map(map)
    }
}

/// `Option` is the strict optional: null decodes to `None`, but any other
/// failure is still an error.
impl<T: Decode> Decode for Option<T> {
    fn decode(value: &Value, ctx: &dyn Context) -> DecodeResult<Self> {
        match value {
            Value::Null => Ok(None),
            _ => T::decode(value, ctx).map(Some),
        }
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self) -> Value {
        match self {
            Some(t) => t.encode(),
            None => Value::Null,
        }
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(value: &Value, ctx: &dyn Context) -> DecodeResult<Self> {
        T::decode(value, ctx).map(Box::new)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self) -> Value {
        self.as_ref().encode()
    }
}
