//! This module defines the Context trait.
//!
//! A [`Context`] is used to specify runtime behavior for decoding.
//! Whenever an [`Isolated`](crate::Isolated) field absorbs a failure, it
//! tells the `Context`.  The default [`SilentContext`] ignores this, so an
//! absorbed failure leaves no trace at all; other contexts can be used to
//! find out why a field came back absent.
//!

use crate::util::DecodeError;
use std::cell::RefCell;

/// A Context receives notifications during decoding.
///
/// Right now, that only includes failures absorbed by an isolated field.
/// A `Context` can never change the outcome of a decode.
pub trait Context {
    /// An isolated field decoded to absent because of `err`.
    ///
    /// `key` is the field name, if the field was looked up by key.
    fn absorbed(&self, key: Option<&str>, err: &DecodeError);
}

/// A context that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentContext;

impl Context for SilentContext {
    fn absorbed(&self, _key: Option<&str>, _err: &DecodeError) {}
}

/// A record of one failure that an isolated field absorbed.
#[derive(Debug, Clone, PartialEq)]
pub struct Absorbed {
    /// The field name, if known.
    pub key: Option<String>,
    /// The error that was converted to absence.
    pub error: DecodeError,
}

/// A context that keeps a list of every absorbed failure.
///
/// ```
/// use failsafe_decode::{decode_with, Isolated, RecordingContext, Value};
///
/// let ctx = RecordingContext::new();
/// let slot: Isolated<u32> = decode_with(&Value::text("x"), &ctx).unwrap();
/// assert!(slot.is_absent());
/// assert_eq!(ctx.take().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingContext {
    absorbed: RefCell<Vec<Absorbed>>,
}

impl RecordingContext {
    /// Create an empty RecordingContext.
    pub fn new() -> RecordingContext {
        RecordingContext::default()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<Absorbed> {
        self.absorbed.replace(Vec::new())
    }
}

impl Context for RecordingContext {
    fn absorbed(&self, key: Option<&str>, err: &DecodeError) {
        self.absorbed.borrow_mut().push(Absorbed {
            key: key.map(String::from),
            error: err.clone(),
        });
    }
}

/// A context that emits a `tracing` debug event for every absorbed failure.
#[cfg(feature = "tracing")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingContext;

#[cfg(feature = "tracing")]
impl Context for TracingContext {
    fn absorbed(&self, key: Option<&str>, err: &DecodeError) {
        let kind: &'static str = err.kind().into();
        tracing::debug!(key = key.unwrap_or("-"), kind, error = %err, "isolated field absorbed failure");
    }
}
