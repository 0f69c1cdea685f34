//! This module contains keyed field access for decoding structured types,
//! and the matching builder for encoding them.
//!
//! A `Decode` implementation for a struct creates a [`Fields`] over its
//! fragment, then pulls each field out with one of three rules:
//!
//! - [`required`](Fields::required): the key must exist and decode.
//! - [`optional`](Fields::optional): a missing key or null is `None`; any
//!   other failure is an error.
//! - [`isolated`](Fields::isolated): never fails.  A missing key, a null, or
//!   any decode failure all produce an absent slot.
//!
//! Errors from `required` and `optional` are wrapped in
//! [`DecodeError::Nested`] so that the full key path is visible.

use crate::context::Context;
use crate::decode::{unexpected, Decode, Encode};
use crate::isolated::Isolated;
use crate::util::{DecodeError, DecodeResult};
use crate::value::{Value, ValueMap};

/// Keyed access to the entries of a map fragment.
pub struct Fields<'a> {
    map: &'a ValueMap,
    ctx: &'a dyn Context,
}

impl<'a> Fields<'a> {
    /// Start decoding the fields of `value`, which must be a map.
    pub fn new(value: &'a Value, ctx: &'a dyn Context) -> DecodeResult<Fields<'a>> {
        match value {
            Value::Map(map) => Ok(Fields { map, ctx }),
            _ => Err(unexpected(value, "map")),
        }
    }

    /// The raw fragment stored under `key`.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(&Value::text(key))
    }

    /// Returns true if `key` exists, whatever its value is.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Decode a field that must be present and valid.
    pub fn required<T: Decode>(&self, key: &str) -> DecodeResult<T> {
        let value = self
            .get(key)
            .ok_or_else(|| DecodeError::nested(key, DecodeError::ValueAbsent))?;
        T::decode(value, self.ctx).map_err(|e| DecodeError::nested(key, e))
    }

    /// Decode a field that may be missing or null.
    pub fn optional<T: Decode>(&self, key: &str) -> DecodeResult<Option<T>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::decode(value, self.ctx)
                .map(Some)
                .map_err(|e| DecodeError::nested(key, e)),
        }
    }

    /// Decode a fault-isolated field.
    ///
    /// A missing key is handled the same as a key whose value fails to
    /// decode: both produce an absent slot.
    pub fn isolated<T: Decode>(&self, key: &str) -> Isolated<T> {
        Isolated::from_keyed_fragment(Some(key), self.get(key), self.ctx)
    }
}

/// A builder for encoding a struct as a map.
///
/// ```
/// use failsafe_decode::{FieldMap, Isolated, Value};
///
/// let value = FieldMap::new()
///     .insert("code", "OK")
///     .insert("result", &Isolated::<u32>::absent())
///     .into_value();
/// assert_eq!(value.get("code"), Some(&Value::text("OK")));
/// assert_eq!(value.get("result"), Some(&Value::Null));
/// ```
#[derive(Debug, Default)]
pub struct FieldMap {
    map: ValueMap,
}

impl FieldMap {
    /// Create an empty FieldMap.
    pub fn new() -> FieldMap {
        FieldMap::default()
    }

    /// Add a field.
    pub fn insert<T: Encode + ?Sized>(mut self, key: &str, value: &T) -> FieldMap {
        self.map.insert(Value::text(key), value.encode());
        self
    }

    /// Finish, producing a `Value::Map`.
    pub fn into_value(self) -> Value {
        Value::Map(self.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SilentContext;

    fn doc() -> Value {
        FieldMap::new()
            .insert("a", &1u32)
            .insert("b", &Value::Null)
            .insert("c", "three")
            .into_value()
    }

    #[test]
    fn required_fields() {
        let doc = doc();
        let fields = Fields::new(&doc, &SilentContext).unwrap();
        assert_eq!(fields.required::<u32>("a"), Ok(1));
        assert_eq!(
            fields.required::<u32>("z").unwrap_err().to_string(),
            "z: ValueAbsent"
        );
        assert_eq!(
            fields.required::<u32>("b").unwrap_err().to_string(),
            "b: ValueNull"
        );
        assert_eq!(
            fields.required::<u32>("c").unwrap_err().to_string(),
            "c: Mismatch(expected u32 (got text))"
        );
    }

    #[test]
    fn optional_fields() {
        let doc = doc();
        let fields = Fields::new(&doc, &SilentContext).unwrap();
        assert_eq!(fields.optional::<u32>("a"), Ok(Some(1)));
        assert_eq!(fields.optional::<u32>("b"), Ok(None));
        assert_eq!(fields.optional::<u32>("z"), Ok(None));
        assert!(fields.optional::<u32>("c").is_err());
    }

    #[test]
    fn isolated_fields() {
        let doc = doc();
        let fields = Fields::new(&doc, &SilentContext).unwrap();
        assert_eq!(fields.isolated::<u32>("a"), Isolated::present(1));
        assert!(fields.isolated::<u32>("b").is_absent());
        assert!(fields.isolated::<u32>("c").is_absent());
        assert!(fields.isolated::<u32>("z").is_absent());
        assert!(fields.contains("b"));
        assert!(!fields.contains("z"));
    }

    #[test]
    fn not_a_map() {
        assert_eq!(
            Fields::new(&Value::Array(vec![]), &SilentContext).err(),
            Some(crate::util::mismatch("map (got array)"))
        );
        assert_eq!(
            Fields::new(&Value::Null, &SilentContext).err(),
            Some(DecodeError::ValueNull)
        );
    }
}
