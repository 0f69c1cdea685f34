//! This module implements decoding from, and encoding to, [`serde_json::Value`].
//!
//! # Examples
//!
//! ```
//! use failsafe_decode::{decode_json_str, Isolated};
//!
//! let n: Isolated<u32> = decode_json_str("43").unwrap();
//! assert_eq!(n, Isolated::present(43));
//!
//! let n: Isolated<u32> = decode_json_str(r#""forty three""#).unwrap();
//! assert!(n.is_absent());
//! ```
//!

#![cfg(feature = "serde_json")]

use crate::context::{Context, SilentContext};
use crate::decode::{Decode, Encode};
use crate::util::{DecodeError, DecodeResult};
use crate::value::Value;
use serde_json::Value as JSON_Value;
use std::collections::BTreeMap;
use std::convert::TryFrom;

// Convert JSON `Value`s to the local `Value` type that the decode code
// uses.

impl TryFrom<&JSON_Value> for Value {
    type Error = DecodeError;

    fn try_from(value: &JSON_Value) -> Result<Self, Self::Error> {
        let result = match value {
            JSON_Value::Null => Value::Null,
            JSON_Value::Bool(b) => Value::Bool(*b),
            JSON_Value::Number(num) => {
                if let Some(u) = num.as_u64() {
                    Value::Integer(u as i128)
                } else if let Some(i) = num.as_i64() {
                    Value::Integer(i as i128)
                } else if let Some(f) = num.as_f64() {
                    Value::from_float(f)
                } else {
                    return Err(DecodeError::ValueError(
                        "JSON Value::Number conversion failure".into(),
                    ));
                }
            }
            JSON_Value::String(t) => Value::Text(t.clone()),
            JSON_Value::Array(a) => {
                let array: Result<_, _> = a.iter().map(Value::try_from).collect();
                Value::Array(array?)
            }
            JSON_Value::Object(m) => {
                type MapTree = BTreeMap<Value, Value>;
                let map: Result<MapTree, _> = m
                    .iter()
                    .map(|(k, v)| {
                        // An iterator returning a 2-tuple can be used as (key, value)
                        // when building a new map.
                        Ok((Value::Text(k.clone()), Value::try_from(v)?))
                    })
                    .collect();
                Value::Map(map?)
            }
        };
        Ok(result)
    }
}

#[test]
fn test_json_number_behavior() {
    // Ensures that our JSON decoder tracks number types precisely, and
    // doesn't, say, allow floating-point values to become integers.
    // serde_json does sometimes permit as_f64 to work on integers, which is
    // why try_from has to test u64, then i64, then f64.

    let json_value: JSON_Value = serde_json::from_str("1").unwrap();
    assert!(json_value.as_u64().is_some());

    let json_value: JSON_Value = serde_json::from_str("-1").unwrap();
    assert!(json_value.as_u64().is_none());
    assert!(json_value.as_i64().is_some());

    let json_value: JSON_Value = serde_json::from_str("1.0").unwrap();
    assert!(json_value.as_u64().is_none());
    assert!(json_value.as_i64().is_none());
    assert!(json_value.as_f64().is_some());

    assert_eq!(Value::try_from(&json_value), Ok(Value::from_float(1.0)));
}

// A variant that consumes the JSON Value.
impl TryFrom<JSON_Value> for Value {
    type Error = DecodeError;

    fn try_from(value: JSON_Value) -> Result<Self, Self::Error> {
        Value::try_from(&value)
    }
}

// JSON has no byte strings, no non-string map keys, and no NaN; those are
// written as base64 text, as the key's display form, and as null.
// Integers outside the i64/u64 range (CBOR allows them) are written as
// floats, so they read back as `Value::Float` and lose precision.
impl From<&Value> for JSON_Value {
    fn from(value: &Value) -> JSON_Value {
        match value {
            Value::Null => JSON_Value::Null,
            Value::Bool(b) => JSON_Value::Bool(*b),
            Value::Integer(i) => {
                if let Ok(u) = u64::try_from(*i) {
                    JSON_Value::from(u)
                } else if let Ok(n) = i64::try_from(*i) {
                    JSON_Value::from(n)
                } else {
                    #[allow(clippy::cast_precision_loss)]
                    let f = *i as f64;
                    JSON_Value::from(f)
                }
            }
            Value::Float(f) => serde_json::Number::from_f64(f.0)
                .map(JSON_Value::Number)
                .unwrap_or(JSON_Value::Null),
            Value::Bytes(b) => JSON_Value::String(base64::encode(b)),
            Value::Text(t) => JSON_Value::String(t.clone()),
            Value::Array(a) => JSON_Value::Array(a.iter().map(JSON_Value::from).collect()),
            Value::Map(m) => JSON_Value::Object(
                m.iter()
                    .map(|(k, v)| {
                        let key = match k {
                            Value::Text(t) => t.clone(),
                            other => other.to_string(),
                        };
                        (key, JSON_Value::from(v))
                    })
                    .collect(),
            ),
        }
    }
}

/// Decode already-parsed JSON data.
pub fn decode_json<T: Decode>(value: &JSON_Value) -> DecodeResult<T> {
    decode_json_with(value, &SilentContext)
}

/// Decode already-parsed JSON data, reporting absorbed failures to `ctx`.
pub fn decode_json_with<T: Decode>(value: &JSON_Value, ctx: &dyn Context) -> DecodeResult<T> {
    let value = Value::try_from(value)?;
    T::decode(&value, ctx)
}

/// Decode JSON text.
pub fn decode_json_str<T: Decode>(json: &str) -> DecodeResult<T> {
    // Deserialize the JSON text
    let json_value: JSON_Value =
        serde_json::from_str(json).map_err(|e| DecodeError::ValueError(format!("{}", e)))?;
    decode_json(&json_value)
}

/// Decode JSON bytes.
pub fn decode_json_slice<T: Decode>(json: &[u8]) -> DecodeResult<T> {
    let json_value: JSON_Value =
        serde_json::from_slice(json).map_err(|e| DecodeError::ValueError(format!("{}", e)))?;
    decode_json(&json_value)
}

/// Encode a value as a JSON tree.
pub fn encode_json<T: Encode + ?Sized>(t: &T) -> JSON_Value {
    JSON_Value::from(&t.encode())
}

/// Encode a value as JSON text.
pub fn encode_json_string<T: Encode + ?Sized>(t: &T) -> String {
    encode_json(t).to_string()
}

#[test]
fn test_json_encode_bytes_and_keys() {
    let mut m = BTreeMap::new();
    m.insert(Value::Integer(1), Value::Bytes(vec![1, 2, 3]));
    let json = JSON_Value::from(&Value::Map(m));
    assert_eq!(json.to_string(), r#"{"1":"AQID"}"#);
}

#[test]
fn test_json_encode_wide_integer() {
    let wide = Value::Integer(i128::from(i64::MIN) - 1);
    let json = JSON_Value::from(&wide);
    assert!(json.is_f64());
    let back = Value::try_from(&json).unwrap();
    assert_eq!(back.kind_name(), "float");
}
