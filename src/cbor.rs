//! This module implements conversions from, and to, [`serde_cbor::Value`].
//!
//! Decoding requires converting data to a generic type [`Value`].

#![cfg(feature = "serde_cbor")]

use crate::context::{Context, SilentContext};
use crate::decode::{Decode, Encode};
use crate::util::{DecodeError, DecodeResult};
use crate::value::Value;
use serde_cbor::Value as CBOR_Value;
use std::convert::TryFrom;

// These conversions seem obvious and pointless, but over time they may
// diverge.  CBOR's data model is a superset of Value's, except for tags,
// which are dropped in favor of their content.
impl TryFrom<&CBOR_Value> for Value {
    type Error = DecodeError;

    fn try_from(value: &CBOR_Value) -> Result<Self, Self::Error> {
        let result = match value {
            CBOR_Value::Null => Value::Null,
            CBOR_Value::Bool(b) => Value::Bool(*b),
            CBOR_Value::Integer(i) => Value::Integer(*i),
            CBOR_Value::Float(f) => Value::from_float(*f),
            CBOR_Value::Bytes(b) => Value::Bytes(b.clone()),
            CBOR_Value::Text(t) => Value::Text(t.clone()),
            CBOR_Value::Array(a) => {
                let array: Result<_, _> = a.iter().map(Value::try_from).collect();
                Value::Array(array?)
            }
            CBOR_Value::Map(m) => {
                let map: Result<_, DecodeError> = m
                    .iter()
                    .map(|(k, v)| Ok((Value::try_from(k)?, Value::try_from(v)?)))
                    .collect();
                Value::Map(map?)
            }
            CBOR_Value::Tag(_, inner) => Value::try_from(inner.as_ref())?,
            _ => {
                return Err(DecodeError::ValueError(
                    "can't handle hidden cbor Value".into(),
                ))
            }
        };
        Ok(result)
    }
}

// A variant that consumes the CBOR Value.
impl TryFrom<CBOR_Value> for Value {
    type Error = DecodeError;

    fn try_from(value: CBOR_Value) -> Result<Self, Self::Error> {
        Value::try_from(&value)
    }
}

impl From<&Value> for CBOR_Value {
    fn from(value: &Value) -> CBOR_Value {
        match value {
            Value::Null => CBOR_Value::Null,
            Value::Bool(b) => CBOR_Value::Bool(*b),
            Value::Integer(i) => CBOR_Value::Integer(*i),
            Value::Float(f) => CBOR_Value::Float(f.0),
            Value::Bytes(b) => CBOR_Value::Bytes(b.clone()),
            Value::Text(t) => CBOR_Value::Text(t.clone()),
            Value::Array(a) => CBOR_Value::Array(a.iter().map(CBOR_Value::from).collect()),
            Value::Map(m) => CBOR_Value::Map(
                m.iter()
                    .map(|(k, v)| (CBOR_Value::from(k), CBOR_Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Decode already-parsed CBOR data.
pub fn decode_cbor<T: Decode>(value: &CBOR_Value) -> DecodeResult<T> {
    decode_cbor_with(value, &SilentContext)
}

/// Decode already-parsed CBOR data, reporting absorbed failures to `ctx`.
pub fn decode_cbor_with<T: Decode>(value: &CBOR_Value, ctx: &dyn Context) -> DecodeResult<T> {
    let value = Value::try_from(value)?;
    T::decode(&value, ctx)
}

/// Decode CBOR-encoded bytes.
pub fn decode_cbor_bytes<T: Decode>(cbor: &[u8]) -> DecodeResult<T> {
    let cbor_value: CBOR_Value = serde_cbor::from_slice(cbor)
        .map_err(|e| DecodeError::ValueError(format!("cbor parsing failed: {}", e)))?;
    decode_cbor(&cbor_value)
}

/// Encode a value as a CBOR tree.
pub fn encode_cbor<T: Encode + ?Sized>(t: &T) -> CBOR_Value {
    CBOR_Value::from(&t.encode())
}

/// Encode a value as CBOR bytes.
pub fn encode_cbor_bytes<T: Encode + ?Sized>(t: &T) -> DecodeResult<Vec<u8>> {
    serde_cbor::to_vec(&encode_cbor(t))
        .map_err(|e| DecodeError::ValueError(format!("cbor encoding failed: {}", e)))
}

#[test]
fn test_cbor_tags_are_unwrapped() {
    let tagged = CBOR_Value::Tag(1, Box::new(CBOR_Value::Integer(1_600_000_000)));
    assert_eq!(Value::try_from(&tagged), Ok(Value::Integer(1_600_000_000)));
}
