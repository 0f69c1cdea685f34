//! `failsafe-decode` is a library for decoding structured data into typed
//! values, where individual fields can fail without taking the rest of the
//! document down with them.
//!
//! Any field wrapped in [`Isolated`] becomes a *fault-isolating boundary*.
//! If the field's value is missing, null, the wrong type, an unknown enum
//! tag, or contains a failure anywhere deeper inside it, the field decodes
//! as absent.  Every other field in the document is unaffected.  Fields that
//! aren't wrapped are decoded strictly, and their failures propagate as
//! usual.
//!
//! # Implementation Details
//!
//! - Supports JSON and CBOR encodings, controlled by the `serde_json` and
//!   `serde_cbor` features.
//!
//! - Incoming data is first translated into a generic [`Value`] tree, so
//!   the decoding code is completely agnostic to the serialization format.
//!
//! - Types describe how they are decoded with the [`Decode`] trait, usually
//!   by pulling entries out of a [`Fields`] accessor.  `Isolated<T>` also
//!   implements serde's `Deserialize`, so it can be used directly in
//!   `#[derive(Deserialize)]` structs with any self-describing format.
//!
//! - Decoding code reports absorbed failures to a [`Context`].  The default
//!   [`SilentContext`] discards them, so a failure inside an `Isolated`
//!   field leaves no trace.  [`RecordingContext`] (and `TracingContext`,
//!   with the `tracing` feature) can be used to find out why a field is
//!   absent.
//!
//! # Examples
//!
//! ```
//! # #[cfg(feature = "serde_json")]
//! # {
//! use failsafe_decode::{decode_json_str, Context, Decode, DecodeResult, Fields, Isolated, Value};
//!
//! #[derive(Debug, PartialEq)]
//! struct Reading {
//!     text: String,
//!     number: i64,
//! }
//!
//! #[derive(Debug, PartialEq)]
//! struct Response {
//!     code: String,
//!     result: Isolated<Reading>,
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
//! impl Decode for Response {
//!     fn decode(value: &Value, ctx: &dyn Context) -> DecodeResult<Self> {
//!         let fields = Fields::new(value, ctx)?;
//!         Ok(Response {
//!             code: fields.required("code")?,
//!             result: fields.isolated("result"),
//!         })
//!     }
//! }
//!
//! let json = r#"{"code": "OK", "result": {"text": "abc", "number": 123}}"#;
//! let response: Response = decode_json_str(json).unwrap();
//! assert_eq!(response.result.as_ref().unwrap().number, 123);
//!
//! // `number` is missing, so `result` is absent; `code` is unaffected.
//! let json = r#"{"code": "OK", "result": {"text": "abc"}}"#;
//! let response: Response = decode_json_str(json).unwrap();
//! assert_eq!(response.code, "OK");
//! assert!(response.result.is_absent());
//!
//! // `code` isn't isolated, so a bad `code` fails the whole decode.
//! let json = r#"{"code": 200, "result": null}"#;
//! assert!(decode_json_str::<Response>(json).is_err());
//! # }
//! ```
//!
//! The same thing, using serde:
//!
//! ```
//! # #[cfg(feature = "serde_json")]
//! # {
//! use failsafe_decode::Isolated;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Reading {
//!     text: String,
//!     number: i64,
//! }
//!
//! #[derive(Deserialize)]
//! struct Response {
//!     code: String,
//!     result: Isolated<Reading>,
//! }
//!
//! let json = r#"{"code": "OK", "result": {"text": "abc"}}"#;
//! let response: Response = serde_json::from_str(json).unwrap();
//! assert_eq!(response.code, "OK");
//! assert!(response.result.is_absent());
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![warn(clippy::cast_possible_truncation)]

pub mod context;
pub mod de;
pub mod decode;
pub mod fields;
pub mod isolated;
pub mod util;
pub mod value;

#[doc(inline)]
pub use context::{Absorbed, Context, RecordingContext, SilentContext};
#[cfg(feature = "tracing")]
#[doc(inline)]
pub use context::TracingContext;
#[doc(inline)]
pub use de::from_value;
#[doc(inline)]
pub use decode::{decode, decode_enumerant, decode_with, encode, ByteBuf, Decode, Encode};
#[doc(inline)]
pub use fields::{FieldMap, Fields};
#[doc(inline)]
pub use isolated::{isolate, Isolated};
#[doc(inline)]
pub use util::{DecodeError, DecodeResult, ErrorKind};
#[doc(inline)]
pub use value::Value;

#[cfg(feature = "serde_cbor")]
pub mod cbor;
#[cfg(feature = "serde_cbor")]
#[doc(inline)]
pub use cbor::{decode_cbor, decode_cbor_bytes, decode_cbor_with, encode_cbor, encode_cbor_bytes};

#[cfg(feature = "serde_json")]
pub mod json;
#[cfg(feature = "serde_json")]
#[doc(inline)]
pub use json::{
    decode_json, decode_json_slice, decode_json_str, decode_json_with, encode_json,
    encode_json_string,
};
