use chrforge_codec::{binary, compact, Envelope, Record, WireValue};
use chrforge_core::models::WireProtocol;
use proptest::prelude::*;

/// Keep only the elements sharing the first element's wire type.
fn homogeneous(items: Vec<WireValue>) -> Vec<WireValue> {
    let Some(first) = items.first().map(WireValue::ttype) else {
        return items;
    };
    items.into_iter().filter(|v| v.ttype() == first).collect()
}

fn leaf() -> impl Strategy<Value = WireValue> {
    prop_oneof![
        any::<bool>().prop_map(WireValue::Bool),
        any::<i8>().prop_map(WireValue::I8),
        any::<i16>().prop_map(WireValue::I16),
        any::<i32>().prop_map(WireValue::I32),
        any::<i64>().prop_map(WireValue::I64),
        any::<f64>().prop_map(WireValue::Double),
        ".{0,24}".prop_map(WireValue::String),
        prop::collection::vec(any::<u8>(), 0..24).prop_map(WireValue::Binary),
    ]
}

fn wire_value() -> impl Strategy<Value = WireValue> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(|v| WireValue::List(homogeneous(v))),
            prop::collection::vec(inner.clone(), 0..6).prop_map(|v| WireValue::Set(homogeneous(v))),
            prop::collection::vec((inner.clone(), inner.clone()), 0..4).prop_map(|entries| {
                let keys = homogeneous(entries.iter().map(|(k, _)| k.clone()).collect());
                let values = homogeneous(entries.iter().map(|(_, v)| v.clone()).collect());
                WireValue::Map(keys.into_iter().zip(values).collect())
            }),
            prop::collection::vec((any::<i16>(), inner), 0..6)
                .prop_map(|fields| WireValue::Struct(fields.into_iter().collect())),
        ]
    })
}

fn record() -> impl Strategy<Value = Record> {
    prop::collection::vec((any::<i16>(), wire_value()), 0..6)
        .prop_map(|fields| fields.into_iter().collect())
}

proptest! {
    #[test]
    fn compact_roundtrip_consumes_all_bytes(value in wire_value()) {
        let bytes = compact::encode(&value).unwrap();
        let (decoded, consumed) = compact::decode(&bytes).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn binary_roundtrip_consumes_all_bytes(value in wire_value()) {
        let bytes = binary::encode(&value).unwrap();
        let (decoded, consumed) = binary::decode(&bytes).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn envelope_roundtrip(
        method in "[a-zA-Z]{1,20}",
        seq in any::<i32>(),
        payload in record(),
    ) {
        let envelope = Envelope::call(method, seq, payload);
        for protocol in [WireProtocol::Compact, WireProtocol::Binary] {
            let bytes = envelope.encode(protocol).unwrap();
            prop_assert_eq!(Envelope::decode(&bytes, protocol).unwrap(), envelope.clone());
        }
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = compact::decode(&bytes);
        let _ = binary::decode(&bytes);
        let _ = Envelope::decode(&bytes, WireProtocol::Compact);
        let _ = Envelope::decode(&bytes, WireProtocol::Binary);
    }

    #[test]
    fn truncation_is_always_an_error(value in wire_value(), cut in any::<prop::sample::Index>()) {
        let bytes = compact::encode(&value).unwrap();
        let at = cut.index(bytes.len());
        prop_assert!(compact::decode(&bytes[..at]).is_err());
    }
}
