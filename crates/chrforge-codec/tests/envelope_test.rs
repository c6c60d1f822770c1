use chrforge_codec::records::TalkException;
use chrforge_codec::{Envelope, MessageType, Record, ThriftRecord, WireValue};
use chrforge_core::errors::DecodeError;
use chrforge_core::models::WireProtocol;
use test_fixtures::golden::{codec_vectors, hex};

fn expected_payload(name: &str) -> Record {
    match name {
        "call_get_server_time" => Record::new(),
        "reply_ping_i64" => Record::new().with(0, 5i64),
        "reply_talk_exception" => {
            Record::new().with(1, TalkException::new(8, "AUTH").to_record())
        }
        other => panic!("no expected payload for golden envelope {other}"),
    }
}

#[test]
fn golden_envelopes_match_in_both_protocols() {
    for vector in codec_vectors().envelopes {
        let message_type = MessageType::from_u8(vector.message_type).unwrap();
        let envelope = Envelope {
            method: vector.method.clone(),
            message_type,
            sequence_id: vector.sequence_id,
            payload: expected_payload(&vector.name),
        };
        for (protocol, bytes) in [
            (WireProtocol::Compact, hex(&vector.compact)),
            (WireProtocol::Binary, hex(&vector.binary)),
        ] {
            assert_eq!(envelope.encode(protocol).unwrap(), bytes, "{} {protocol:?}", vector.name);
            assert_eq!(Envelope::decode(&bytes, protocol).unwrap(), envelope, "{}", vector.name);
        }
    }
}

#[test]
fn call_roundtrips_with_arguments() {
    let args = Record::new()
        .with(1, Record::new().with(1, "refresh-token"))
        .with(2, WireValue::Set(vec!["a".into(), "b".into()]));
    let envelope = Envelope::call("refresh", i32::MAX, args);
    for protocol in [WireProtocol::Compact, WireProtocol::Binary] {
        let bytes = envelope.encode(protocol).unwrap();
        assert_eq!(Envelope::decode(&bytes, protocol).unwrap(), envelope);
    }
}

#[test]
fn wrong_protocol_id_is_rejected() {
    let mut bytes = Envelope::call("ping", 1, Record::new())
        .encode(WireProtocol::Compact)
        .unwrap();
    bytes[0] = 0x81;
    assert_eq!(
        Envelope::decode(&bytes, WireProtocol::Compact),
        Err(DecodeError::BadProtocolId {
            expected: 0x82,
            actual: 0x81
        })
    );
}

#[test]
fn wrong_versions_are_rejected() {
    let mut compact = Envelope::call("ping", 1, Record::new())
        .encode(WireProtocol::Compact)
        .unwrap();
    compact[1] = 0x22; // version 2, call
    assert!(matches!(
        Envelope::decode(&compact, WireProtocol::Compact),
        Err(DecodeError::BadVersion { expected: 1, actual: 2 })
    ));

    let mut binary = Envelope::call("ping", 1, Record::new())
        .encode(WireProtocol::Binary)
        .unwrap();
    binary[1] = 0x02;
    assert!(matches!(
        Envelope::decode(&binary, WireProtocol::Binary),
        Err(DecodeError::BadVersion { .. })
    ));
}

#[test]
fn invalid_message_type_is_rejected() {
    let mut bytes = Envelope::call("ping", 1, Record::new())
        .encode(WireProtocol::Compact)
        .unwrap();
    bytes[1] = 0x01 | (6 << 5);
    assert_eq!(
        Envelope::decode(&bytes, WireProtocol::Compact),
        Err(DecodeError::InvalidMessageType { value: 6 })
    );
}

#[test]
fn trailing_bytes_after_envelope_are_rejected() {
    let mut bytes = Envelope::success("ping", 2, true)
        .encode(WireProtocol::Binary)
        .unwrap();
    bytes.push(0x00);
    assert_eq!(
        Envelope::decode(&bytes, WireProtocol::Binary),
        Err(DecodeError::TrailingBytes { count: 1 })
    );
}

#[test]
fn non_utf8_method_name_is_rejected() {
    let bytes = [0x82, 0x41, 0x01, 0x02, 0xff, 0xfe, 0x00];
    assert_eq!(
        Envelope::decode(&bytes, WireProtocol::Compact),
        Err(DecodeError::InvalidMethodName { offset: 3 })
    );
}

#[test]
fn negative_sequence_ids_survive_compact_varints() {
    let envelope = Envelope::success("ping", -5, 1i32);
    let bytes = envelope.encode(WireProtocol::Compact).unwrap();
    assert_eq!(Envelope::decode(&bytes, WireProtocol::Compact).unwrap().sequence_id, -5);
}
