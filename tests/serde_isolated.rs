#![cfg(feature = "serde_json")]

use failsafe_decode::{decode_json_str, from_value, isolate, Isolated, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Reading {
    text: String,
    number: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Response {
    code: String,
    result: Isolated<Reading>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
enum Tag {
    KNOWN_TAG,
    OTHER_TAG,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Tagged {
    value: Isolated<Tag>,
}

// Two nested boundaries: `inner` is inside `outer`.
#[derive(Debug, PartialEq, Deserialize)]
struct Leaf {
    count: u8,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Middle {
    name: String,
    inner: Isolated<Leaf>,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Outer {
    id: u32,
    outer: Isolated<Middle>,
    sibling: Isolated<Leaf>,
}

#[test]
fn serde_complete_response() {
    let json = r#"{"code":"OK","result":{"text":"abc","number":123}}"#;
    let response: Response = serde_json::from_str(json).unwrap();
    assert_eq!(
        response.result,
        Isolated::present(Reading {
            text: "abc".into(),
            number: 123
        })
    );
}

#[test]
fn serde_missing_subfield() {
    let json = r#"{"code":"OK","result":{"text":"abc"}}"#;
    let response: Response = serde_json::from_str(json).unwrap();
    assert_eq!(response.code, "OK");
    assert!(response.result.is_absent());
}

#[test]
fn serde_missing_key_needs_no_default() {
    let response: Response = serde_json::from_str(r#"{"code":"OK"}"#).unwrap();
    assert!(response.result.is_absent());

    let a: Tagged = serde_json::from_str("{}").unwrap();
    let b: Tagged = serde_json::from_str(r#"{"value":null}"#).unwrap();
    let c: Tagged = serde_json::from_str(r#"{"value":{"x":[1,2,{"y":null}]}}"#).unwrap();
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn serde_enum_tags() {
    let tagged: Tagged = serde_json::from_str(r#"{"value":"UNKNOWN_TAG"}"#).unwrap();
    assert!(tagged.value.is_absent());

    let tagged: Tagged = serde_json::from_str(r#"{"value":"KNOWN_TAG"}"#).unwrap();
    assert_eq!(tagged.value, Isolated::present(Tag::KNOWN_TAG));
}

#[test]
fn serde_nearest_boundary() {
    // The bad leaf is inside `inner`, so only `inner` is lost.
    let json = r#"{
        "id": 1,
        "outer": {"name": "m", "inner": {"count": 1000}},
        "sibling": {"count": 3}
    }"#;
    let doc: Outer = serde_json::from_str(json).unwrap();
    assert_eq!(doc.id, 1);
    let middle = doc.outer.as_ref().unwrap();
    assert_eq!(middle.name, "m");
    assert!(middle.inner.is_absent());
    assert_eq!(doc.sibling, Isolated::present(Leaf { count: 3 }));

    // A bad strict field in `outer` loses all of `outer`, and nothing else.
    let json = r#"{
        "id": 1,
        "outer": {"name": 5, "inner": {"count": 1}},
        "sibling": {"count": 3}
    }"#;
    let doc: Outer = serde_json::from_str(json).unwrap();
    assert!(doc.outer.is_absent());
    assert_eq!(doc.sibling, Isolated::present(Leaf { count: 3 }));
}

#[test]
fn serde_strict_fields_still_fail() {
    assert!(serde_json::from_str::<Outer>(r#"{"id": "one"}"#).is_err());
    assert!(serde_json::from_str::<Outer>(r#"{"outer": null}"#).is_err());
    // Syntax errors can't be isolated.
    assert!(serde_json::from_str::<Response>(r#"{"code":"OK","result":{"text":}"#).is_err());
}

#[test]
fn serde_repeated_keys() {
    let json = r#"{"text":"a","text":"b","number":1}"#;
    assert!(serde_json::from_str::<Reading>(json).is_err());
    let slot: Isolated<Reading> = serde_json::from_str(json).unwrap();
    assert!(slot.is_absent());

    // The repeat only empties the slot that contains it.
    let json = r#"{"code":"OK","result":{"text":"a","text":"b","number":1}}"#;
    let response: Response = serde_json::from_str(json).unwrap();
    assert_eq!(response.code, "OK");
    assert!(response.result.is_absent());

    let json = r#"{"id":1,"outer":{"name":"m","inner":{"count":1,"count":2}},"sibling":{"count":3}}"#;
    let outer: Outer = serde_json::from_str(json).unwrap();
    let middle = outer.outer.as_ref().unwrap();
    assert_eq!(middle.name, "m");
    assert!(middle.inner.is_absent());
    assert_eq!(outer.sibling, Isolated::present(Leaf { count: 3 }));
}

#[test]
fn null_agrees_across_paths() {
    let native: Isolated<Option<u8>> = decode_json_str("null").unwrap();
    let serde: Isolated<Option<u8>> = serde_json::from_str("null").unwrap();
    assert_eq!(native, serde);
    assert!(native.is_absent());

    let native: Isolated<Option<u8>> = decode_json_str("7").unwrap();
    let serde: Isolated<Option<u8>> = serde_json::from_str("7").unwrap();
    assert_eq!(native, serde);
    assert_eq!(native, Isolated::present(Some(7)));
}

#[test]
fn serde_roundtrip() {
    let json = r#"{"code":"OK","result":{"text":"abc","number":123}}"#;
    let first: Response = serde_json::from_str(json).unwrap();
    let text = serde_json::to_string(&first).unwrap();
    assert_eq!(text, json);
    let second: Response = serde_json::from_str(&text).unwrap();
    assert_eq!(first, second);

    // Absent writes null, and null reads back as absent.
    let first: Response = serde_json::from_str(r#"{"code":"OK","result":7}"#).unwrap();
    let text = serde_json::to_string(&first).unwrap();
    assert_eq!(text, r#"{"code":"OK","result":null}"#);
    let second: Response = serde_json::from_str(&text).unwrap();
    assert_eq!(first, second);
}

#[derive(Debug, Deserialize)]
struct Settings {
    #[serde(default, deserialize_with = "isolate")]
    retries: Option<u8>,
    name: String,
}

#[test]
fn isolate_helper() {
    let s: Settings = serde_json::from_str(r#"{"retries":"many","name":"x"}"#).unwrap();
    assert_eq!(s.retries, None);
    assert_eq!(s.name, "x");
    let s: Settings = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
    assert_eq!(s.retries, None);
    let s: Settings = serde_json::from_str(r#"{"retries":2,"name":"x"}"#).unwrap();
    assert_eq!(s.retries, Some(2));
}

#[test]
fn from_buffered_value() {
    // The same types can be decoded from an already-buffered Value.
    let value: Value = serde_json::from_str(r#"{"code":"OK","result":{"text":"abc"}}"#).unwrap();
    let response: Response = from_value(&value).unwrap();
    assert!(response.result.is_absent());
}

#[cfg(feature = "serde_cbor")]
#[test]
fn serde_cbor_response() {
    #[derive(Serialize)]
    struct Partial {
        text: &'static str,
    }
    #[derive(Serialize)]
    struct Raw {
        code: &'static str,
        result: Partial,
    }

    let raw = Raw {
        code: "OK",
        result: Partial { text: "abc" },
    };
    let bytes = serde_cbor::to_vec(&raw).unwrap();
    let response: Response = serde_cbor::from_slice(&bytes).unwrap();
    assert_eq!(response.code, "OK");
    assert!(response.result.is_absent());
}
