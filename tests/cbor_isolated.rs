#![cfg(feature = "serde_cbor")]

use failsafe_decode::{
    decode_cbor, decode_cbor_bytes, encode_cbor, encode_cbor_bytes, ByteBuf, Context, Decode,
    DecodeResult, Encode, FieldMap, Fields, Isolated, Value,
};
use serde::ser::Serialize;
use serde_cbor::Value as CBOR_Value;

// Create a CBOR Value from anything that's serializable
fn gen_value<T: Serialize>(t: T) -> CBOR_Value {
    serde_cbor::value::to_value(t).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
struct Blob {
    digest: ByteBuf,
    size: Option<u64>,
    label: Isolated<String>,
}

impl Decode for Blob {
    fn decode(value: &Value, ctx: &dyn Context) -> DecodeResult<Self> {
        let fields = Fields::new(value, ctx)?;
        Ok(Blob {
            digest: fields.required("digest")?,
            size: fields.optional("size")?,
            label: fields.isolated("label"),
        })
    }
}

impl Encode for Blob {
    fn encode(&self) -> Value {
        FieldMap::new()
            .insert("digest", &self.digest)
            .insert("size", &self.size)
            .insert("label", &self.label)
            .into_value()
    }
}

#[derive(serde::Serialize)]
struct RawBlob<'a, L: Serialize> {
    #[serde(with = "serde_bytes_shim")]
    digest: &'a [u8],
    size: u64,
    label: L,
}

// serde_cbor writes `&[u8]` as an array unless told otherwise.
mod serde_bytes_shim {
    pub fn serialize<S: serde::Serializer>(b: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bytes(b)
    }
}

#[test]
fn cbor_bytes_and_labels() {
    let raw = RawBlob {
        digest: &[0xde, 0xad],
        size: 2,
        label: "boot",
    };
    let blob: Blob = decode_cbor(&gen_value(&raw)).unwrap();
    assert_eq!(blob.digest, ByteBuf(vec![0xde, 0xad]));
    assert_eq!(blob.size, Some(2));
    assert_eq!(blob.label, Isolated::present("boot".to_string()));

    let raw = RawBlob {
        digest: &[0xde, 0xad],
        size: 2,
        label: 99,
    };
    let blob: Blob = decode_cbor(&gen_value(&raw)).unwrap();
    assert!(blob.label.is_absent());
    assert_eq!(blob.size, Some(2));
}

#[test]
fn cbor_strict_optional() {
    let mut value = FieldMap::new()
        .insert("digest", &ByteBuf(vec![1]))
        .insert("size", "big")
        .into_value();
    // A wrong-typed `size` is an error, because it's only optional, not isolated.
    assert!(Blob::decode(&value, &failsafe_decode::SilentContext).is_err());

    if let Value::Map(m) = &mut value {
        m.remove(&Value::text("size"));
    }
    let blob: Blob = failsafe_decode::decode(&value).unwrap();
    assert_eq!(blob.size, None);
    assert!(blob.label.is_absent());
}

#[test]
fn cbor_roundtrip() {
    let blob = Blob {
        digest: ByteBuf(vec![1, 2, 3]),
        size: Some(3),
        label: Isolated::present("x".into()),
    };
    let bytes = encode_cbor_bytes(&blob).unwrap();
    let decoded: Blob = decode_cbor_bytes(&bytes).unwrap();
    assert_eq!(decoded, blob);

    // Absent encodes as CBOR null, and stays absent.
    let blob = Blob {
        label: Isolated::absent(),
        ..blob
    };
    let cbor = encode_cbor(&blob);
    if let CBOR_Value::Map(m) = &cbor {
        assert_eq!(m.get(&CBOR_Value::Text("label".into())), Some(&CBOR_Value::Null));
    } else {
        panic!("expected a map");
    }
    let decoded: Blob = decode_cbor(&cbor).unwrap();
    assert_eq!(decoded, blob);
}

#[test]
fn cbor_garbage() {
    assert!(decode_cbor_bytes::<Blob>(&[0xff, 0x00]).is_err());
    let slot: Isolated<Blob> = decode_cbor(&gen_value(vec![1, 2, 3])).unwrap();
    assert!(slot.is_absent());
}
