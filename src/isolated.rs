//! This module defines [`Isolated`], the fault-isolating slot.
//!
//! An `Isolated<T>` holds either a successfully decoded `T`, or nothing.
//! Decoding one never fails: if `T` can't be decoded from the fragment,
//! for any reason and at any depth inside `T`, the slot is simply absent.
//! Failures stop at the nearest enclosing `Isolated`, so siblings and
//! ancestors of a bad fragment decode normally.
//!
//! # Examples
//!
//! ```
//! # #[cfg(feature = "serde_json")]
//! # {
//! use failsafe_decode::{decode_json_str, Decode, DecodeResult, Context, Fields, Isolated, Value};
//!
//! #[derive(Debug, PartialEq)]
//! struct Reading {
//!     text: String,
//!     number: i64,
//! }
//!
//! impl Decode for Reading {
//!     fn decode(value: &Value, ctx: &dyn Context) -> DecodeResult<Self> {
//!         let fields = Fields::new(value, ctx)?;
//!         Ok(Reading {
//!             text: fields.required("text")?,
//!             number: fields.required("number")?,
//!         })
//!     }
//! }
//!
//! let slot: Isolated<Reading> = decode_json_str(r#"{"text": "abc"}"#).unwrap();
//! assert!(slot.is_absent());
//! # }
//! ```

use crate::context::Context;
use crate::de::Buffered;
use crate::decode::{Decode, Encode};
use crate::util::DecodeError;
use crate::value::Value;
use serde::de::{DeserializeOwned, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// A value of type `T` that is either present, or absent because it could
/// not be decoded.
///
/// There is no failure state: every fragment, including a missing one,
/// produces some `Isolated<T>`.  Once constructed the slot is never
/// modified.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Isolated<T> {
    value: Option<T>,
}

impl<T> Default for Isolated<T> {
    fn default() -> Self {
        Isolated::absent()
    }
}

impl<T> Isolated<T> {
    /// A slot holding `value`.
    pub fn present(value: T) -> Self {
        Isolated { value: Some(value) }
    }

    /// An empty slot.
    pub fn absent() -> Self {
        Isolated { value: None }
    }

    #[allow(missing_docs)]
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    #[allow(missing_docs)]
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    /// Borrow the value, if present.
    pub fn as_ref(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Borrow the slot as an `Option`.
    pub fn as_option(&self) -> &Option<T> {
        &self.value
    }

    /// Unwrap the slot into an `Option`.
    pub fn into_inner(self) -> Option<T> {
        self.value
    }
}

impl<T: Decode> Isolated<T> {
    /// Attempt to decode `fragment` as a `T`.
    ///
    /// `None` means the fragment doesn't exist at all (e.g. a missing key);
    /// it produces an absent slot, exactly like a fragment that fails to
    /// decode.  A null fragment is always absent, even when `T` itself
    /// would accept null.
    pub fn from_fragment(fragment: Option<&Value>, ctx: &dyn Context) -> Self {
        Isolated::from_keyed_fragment(None, fragment, ctx)
    }

    pub(crate) fn from_keyed_fragment(
        key: Option<&str>,
        fragment: Option<&Value>,
        ctx: &dyn Context,
    ) -> Self {
        let result = match fragment {
            Some(value) if value.is_null() => Err(DecodeError::ValueNull),
            Some(value) => T::decode(value, ctx),
            None => Err(DecodeError::ValueAbsent),
        };
        match result {
            Ok(t) => Isolated::present(t),
            Err(e) => {
                ctx.absorbed(key, &e);
                Isolated::absent()
            }
        }
    }
}

impl<T> From<Option<T>> for Isolated<T> {
    fn from(value: Option<T>) -> Self {
        Isolated { value }
    }
}

impl<T> From<Isolated<T>> for Option<T> {
    fn from(slot: Isolated<T>) -> Self {
        slot.value
    }
}

impl<T: Decode> Decode for Isolated<T> {
    fn decode(value: &Value, ctx: &dyn Context) -> Result<Self, DecodeError> {
        Ok(Isolated::from_fragment(Some(value), ctx))
    }
}

impl<T: Encode> Encode for Isolated<T> {
    fn encode(&self) -> Value {
        match &self.value {
            Some(t) => t.encode(),
            None => Value::Null,
        }
    }
}

impl<T: Serialize> Serialize for Isolated<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.value {
            Some(t) => serializer.serialize_some(t),
            None => serializer.serialize_none(),
        }
    }
}

struct IsolatedVisitor<T>(PhantomData<T>);

impl<'de, T: DeserializeOwned> Visitor<'de> for IsolatedVisitor<T> {
    type Value = Isolated<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any value")
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(Isolated::absent())
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(Isolated::absent())
    }

    // Buffer the whole subtree, then try `T` against the buffer.  The outer
    // deserializer has consumed the subtree either way, so a failure here
    // can't leave it in a half-read state.
    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        let buffered = Buffered::deserialize(deserializer)?;
        Ok(T::deserialize(&buffered).ok().into())
    }
}

/// Deserialize through a self-describing serde format.
///
/// A missing key needs no `#[serde(default)]`: serde's derive asks for an
/// option when a field is missing, and that is reported as absent.
/// Errors in the document syntax itself (e.g. truncated JSON) still
/// propagate, because there is no well-formed fragment to isolate.
impl<'de, T: DeserializeOwned> Deserialize<'de> for Isolated<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_option(IsolatedVisitor(PhantomData))
    }
}

/// A `deserialize_with` helper that isolates a plain `Option<T>` field.
///
/// Unlike an `Isolated<T>` field, a field using this helper must also be
/// marked `#[serde(default)]`, or serde will reject a missing key before the
/// helper ever runs.
///
/// ```
/// # #[cfg(feature = "serde_json")]
/// # {
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Settings {
///     #[serde(default, deserialize_with = "failsafe_decode::isolate")]
///     retries: Option<u8>,
/// }
///
/// let s: Settings = serde_json::from_str(r#"{"retries": "lots"}"#).unwrap();
/// assert_eq!(s.retries, None);
/// let s: Settings = serde_json::from_str(r#"{}"#).unwrap();
/// assert_eq!(s.retries, None);
/// let s: Settings = serde_json::from_str(r#"{"retries": 3}"#).unwrap();
/// assert_eq!(s.retries, Some(3));
/// # }
/// ```
pub fn isolate<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Isolated::<T>::deserialize(deserializer).map(Isolated::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{RecordingContext, SilentContext};
    use crate::util::ErrorKind;

    #[test]
    fn never_fails() {
        let fragments = vec![
            Value::Null,
            Value::Bool(true),
            Value::text("7"),
            Value::Array(vec![]),
            Value::from_float(7.5),
        ];
        for fragment in &fragments {
            let slot: Isolated<u32> = Isolated::from_fragment(Some(fragment), &SilentContext);
            assert!(slot.is_absent(), "{:?}", fragment);
        }
        let slot: Isolated<u32> = Isolated::from_fragment(None, &SilentContext);
        assert!(slot.is_absent());
    }

    #[test]
    fn present_when_valid() {
        let slot: Isolated<u32> = Isolated::from_fragment(Some(&Value::Integer(7)), &SilentContext);
        assert_eq!(slot, Isolated::present(7));
        assert_eq!(slot.as_ref(), Some(&7));
        assert_eq!(slot.encode(), Value::Integer(7));
    }

    #[test]
    fn absent_encodes_as_null() {
        let slot: Isolated<String> = Isolated::default();
        assert_eq!(slot.encode(), Value::Null);
        assert_eq!(Option::<String>::from(slot), None);
    }

    #[test]
    fn recording_context_sees_the_cause() {
        let ctx = RecordingContext::new();
        let _: Isolated<u32> = Isolated::from_fragment(Some(&Value::Null), &ctx);
        let _: Isolated<u32> = Isolated::from_fragment(None, &ctx);
        let _: Isolated<u32> = Isolated::from_fragment(Some(&Value::Integer(1)), &ctx);

        let absorbed = ctx.take();
        let kinds: Vec<ErrorKind> = absorbed.iter().map(|a| a.error.kind()).collect();
        assert_eq!(kinds, vec![ErrorKind::ValueNull, ErrorKind::ValueAbsent]);
        assert!(ctx.take().is_empty());
    }

    #[test]
    fn null_is_absent_even_for_options() {
        let ctx = RecordingContext::new();
        let slot: Isolated<Option<u8>> = Isolated::from_fragment(Some(&Value::Null), &ctx);
        assert!(slot.is_absent());
        let slot: Isolated<Option<u8>> =
            Isolated::from_fragment(Some(&Value::Integer(4)), &ctx);
        assert_eq!(slot, Isolated::present(Some(4)));

        let absorbed = ctx.take();
        assert_eq!(absorbed.len(), 1);
        assert_eq!(absorbed[0].error, DecodeError::ValueNull);
    }
}
