//! This module declares a generic Value enum: the fragment tree that all
//! decoding operates on.

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;

use float_ord::FloatOrd;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// `Value` represents one node of a parsed document.
///
/// To decode a new format, write conversions from that format's own value
/// type into `Value`.  See the [`json`] module for an example.
///
/// [`json`]: crate::json
///
#[derive(Clone, Eq, Ord, PartialEq, PartialOrd)]
#[allow(missing_docs)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i128),
    Float(FloatOrd<f64>),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<Value>),
    Map(BTreeMap<Value, Value>),
}

/// The map type used by [`Value::Map`].
pub type ValueMap = BTreeMap<Value, Value>;

// FloatOrd doesn't implement Debug, so we have to do all the work by hand.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(x) => x.fmt(f),
            Value::Integer(x) => x.fmt(f),
            Value::Float(x) => x.0.fmt(f),
            Value::Bytes(x) => write!(f, "h'{}'", hex::encode(x)),
            Value::Text(x) => x.fmt(f),
            Value::Array(x) => x.fmt(f),
            Value::Map(x) => x.fmt(f),
        }
    }
}

// A compact, JSON-like rendering used in error messages.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl.0),
            Value::Bytes(b) => write!(f, "h'{}'", hex::encode(b)),
            Value::Text(s) => write!(f, "\"{}\"", escape8259::escape(s)),
            Value::Array(a) => {
                write!(f, "[")?;
                for (i, v) in a.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:{}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

// Only exists so implementers don't need to use/see float_ord::FloatOrd
impl Value {
    /// Create a `Value::Float`.
    pub fn from_float<F: Into<f64>>(f: F) -> Value {
        Value::Float(FloatOrd(f.into()))
    }

    /// Create a `Value::Text`.
    pub fn text<S: Into<String>>(s: S) -> Value {
        Value::Text(s.into())
    }

    /// Returns true for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Look up a text key in a `Value::Map`.
    ///
    /// Returns `None` if the key is absent, or if `self` isn't a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            // BTreeMap lookups need an owned Value to compare against.
            Value::Map(m) => m.get(&Value::text(key)),
            _ => None,
        }
    }

    /// A short name for the kind of this value, used in mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => {
                // Most formats can't handle i128, so use the narrowest fit.
                if let Ok(u) = u64::try_from(*i) {
                    serializer.serialize_u64(u)
                } else if let Ok(n) = i64::try_from(*i) {
                    serializer.serialize_i64(n)
                } else {
                    serializer.serialize_i128(*i)
                }
            }
            Value::Float(fl) => serializer.serialize_f64(fl.0),
            Value::Bytes(b) => serializer.serialize_bytes(b),
            Value::Text(t) => serializer.serialize_str(t),
            Value::Array(a) => {
                let mut seq = serializer.serialize_seq(Some(a.len()))?;
                for v in a {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Value::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}
