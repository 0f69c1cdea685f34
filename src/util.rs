//! This module defines error and result types.
//!

use std::error;
use std::fmt;
use std::result::Result;
use strum_macros::{Display, IntoStaticStr};

/// An error that occurred while decoding a fragment.
///
/// Inside an [`Isolated`] field these errors are absorbed and never reach
/// the caller; everywhere else they propagate normally.
///
/// [`Isolated`]: crate::Isolated
#[rustversion::attr(since(1.40), non_exhaustive)]
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// A required key was missing entirely.
    ValueAbsent,
    /// The value was the document's native null.
    ValueNull,
    /// The value was of an incompatible kind.
    Mismatch(Mismatch),
    /// A text tag that is not one of the known values.
    UnknownEnumerant(String),
    /// A failure somewhere below a keyed field.
    Nested {
        /// The field name.
        key: String,
        /// The failure that happened inside that field.
        source: Box<DecodeError>,
    },
    /// A data value that can't be represented.
    ValueError(String),
    /// A message from a user-supplied serde implementation.
    Custom(String),
}

/// The category of a [`DecodeError`], without any payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, IntoStaticStr)]
#[allow(missing_docs)]
pub enum ErrorKind {
    ValueAbsent,
    ValueNull,
    TypeMismatch,
    UnknownEnumerant,
    NestedFailure,
    ValueError,
    Custom,
}

/// A data mismatch during decoding.
///
/// If the target type wanted an integer and the data contained a string,
/// this is the error that would result.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    expected: String,
}

impl Mismatch {
    /// A description of what the decoder wanted to find.
    pub fn expected(&self) -> &str {
        &self.expected
    }
}

/// Shortcut for creating mismatch errors.
#[doc(hidden)]
pub fn mismatch<E: Into<String>>(expected: E) -> DecodeError {
    DecodeError::Mismatch(Mismatch {
        expected: expected.into(),
    })
}

impl DecodeError {
    /// Attach a field name to an error raised while decoding that field.
    pub fn nested<K: Into<String>>(key: K, err: DecodeError) -> DecodeError {
        DecodeError::Nested {
            key: key.into(),
            source: Box::new(err),
        }
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        use DecodeError::*;
        match self {
            ValueAbsent => ErrorKind::ValueAbsent,
            ValueNull => ErrorKind::ValueNull,
            Mismatch(_) => ErrorKind::TypeMismatch,
            UnknownEnumerant(_) => ErrorKind::UnknownEnumerant,
            Nested { .. } => ErrorKind::NestedFailure,
            ValueError(_) => ErrorKind::ValueError,
            Custom(_) => ErrorKind::Custom,
        }
    }

    /// Follow any `Nested` wrappers down to the error that started it all.
    pub fn root_cause(&self) -> &DecodeError {
        let mut err = self;
        while let DecodeError::Nested { source, .. } = err {
            err = source;
        }
        err
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use DecodeError::*;
        match self {
            ValueAbsent => write!(f, "ValueAbsent"),
            ValueNull => write!(f, "ValueNull"),
            Mismatch(mismatch) => write!(f, "Mismatch(expected {})", mismatch.expected),
            UnknownEnumerant(tag) => write!(f, "UnknownEnumerant({})", tag),
            Nested { key, source } => match source.as_ref() {
                // Render a chain of nested keys as a dotted path.
                Nested { .. } => write!(f, "{}.{}", key, source),
                _ => write!(f, "{}: {}", key, source),
            },
            ValueError(msg) => write!(f, "ValueError({})", msg),
            Custom(msg) => write!(f, "Custom({})", msg),
        }
    }
}

// Standard boilerplate, required so other errors can wrap this one.
impl error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            DecodeError::Nested { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// A decode that produces a `T`.
pub type DecodeResult<T> = Result<T, DecodeError>;
