use std::time::Duration;

use chrforge_codec::records::*;
use chrforge_codec::{decode, encode, Record, ThriftRecord, WireValue};
use chrforge_core::errors::DecodeError;

#[test]
fn talk_exception_reads_code_reason_and_parameters() {
    let record = Record::new()
        .with(1, 35i32)
        .with(2, "TOO_MANY_REQUESTS")
        .with(
            3,
            WireValue::Map(vec![("retryAfterMs".into(), "1500".into())]),
        );
    let exception = TalkException::from_record(record).unwrap();
    assert_eq!(exception.code, 35);
    assert_eq!(exception.reason, "TOO_MANY_REQUESTS");
    assert_eq!(exception.retry_after(), Some(Duration::from_millis(1500)));
}

#[test]
fn retry_after_accepts_seconds_key() {
    let exception = TalkException::new(4, "ABUSE_BLOCK").with_parameter("retry_after", "3");
    assert_eq!(exception.retry_after(), Some(Duration::from_secs(3)));
    assert_eq!(TalkException::new(4, "x").retry_after(), None);
}

#[test]
fn talk_exception_without_code_is_missing_field() {
    let err = TalkException::from_record(Record::new().with(2, "no code")).unwrap_err();
    assert_eq!(
        err,
        DecodeError::MissingField {
            record: "TalkException".into(),
            field: 1
        }
    );
}

#[test]
fn square_exception_reads_struct_extra_info() {
    let record = Record::new()
        .with(1, 4i32)
        .with(2, Record::new().with(1, "detail"))
        .with(3, "throttled")
        .with(9, true);
    let exception = SquareException::from_record(record).unwrap();
    assert_eq!(exception.error_code, 4);
    assert_eq!(exception.reason, "throttled");
    assert_eq!(exception.error_extra_info, Some(Record::new().with(1, "detail")));
    assert_eq!(exception.extras, Record::new().with(9, true));
}

#[test]
fn liff_exception_reads_struct_payload() {
    let record = Record::new()
        .with(1, 3i32)
        .with(2, "consent required")
        .with(3, Record::new().with(1, "scope"));
    let exception = LiffException::from_record(record).unwrap();
    assert_eq!(exception.error_code, 3);
    assert_eq!(exception.message, "consent required");
    assert_eq!(exception.payload, Some(Record::new().with(1, "scope")));

    let err = TalkException::from_record(exception.to_record()).unwrap_err();
    assert!(matches!(err, DecodeError::FieldTypeMismatch { field: 3, .. }));
}

#[test]
fn wrongly_typed_field_is_a_type_mismatch() {
    let err = TalkException::from_record(Record::new().with(1, "eight")).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::FieldTypeMismatch { field: 1, ref expected, ref actual, .. }
            if expected == "i32" && actual == "string"
    ));
}

#[test]
fn unknown_fields_survive_a_typed_roundtrip() {
    let wire: WireValue = Record::new()
        .with(1, "access")
        .with(2, 3600i64)
        .with(4, 1_700_000_000i64)
        .with(5, "refresh")
        .with(42, WireValue::List(vec![7i16.into()]))
        .into();
    let (decoded, _) = decode(&encode(&wire).unwrap()).unwrap();
    let response = RefreshAccessTokenResponse::from_record(decoded.into_record().unwrap()).unwrap();

    assert_eq!(response.access_token, "access");
    assert_eq!(response.duration_until_refresh_secs, Some(3600));
    assert_eq!(response.refresh_token.as_deref(), Some("refresh"));
    assert_eq!(response.extras.ids().collect::<Vec<_>>(), vec![42]);

    assert_eq!(response.to_wire(), wire);
}

#[test]
fn integer_width_is_lenient_for_durations() {
    let record = Record::new().with(1, "tok").with(2, 600i32);
    let response = RefreshAccessTokenResponse::from_record(record).unwrap();
    assert_eq!(response.duration_until_refresh_secs, Some(600));
}

#[test]
fn qr_login_response_nests_token_v3() {
    let record = Record::new()
        .with(
            3,
            Record::new().with(1, "at").with(2, "rt").with(3, 86_400i64),
        )
        .with(4, "u0123456789");
    let response = QrCodeLoginV2Response::from_record(record.clone()).unwrap();
    let token = response.token_v3.as_ref().unwrap();
    assert_eq!(token.access_token, "at");
    assert_eq!(token.refresh_token.as_deref(), Some("rt"));
    assert_eq!(token.duration_until_refresh_secs, Some(86_400));
    assert_eq!(response.mid.as_deref(), Some("u0123456789"));
    assert_eq!(response.to_record(), record);
}

#[test]
fn qr_login_request_field_layout() {
    let request = QrCodeLoginV2Request {
        auth_session_id: "sess".into(),
        system_name: "Chrome_OS".into(),
        model_name: "Chrome".into(),
        auto_login_is_required: true,
    };
    let record = request.to_record();
    assert_eq!(record.ids().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    assert_eq!(record.get(4), Some(&WireValue::Bool(true)));
    assert_eq!(QrCodeLoginV2Request::from_record(record).unwrap(), request);
}

#[test]
fn application_exception_defaults_and_names() {
    let exception = ApplicationException::from_record(Record::new().with(1, "boom")).unwrap();
    assert_eq!(exception.kind, ApplicationException::UNKNOWN);
    assert_eq!(exception.kind_name(), "UNKNOWN");
    assert_eq!(
        ApplicationException::new(ApplicationException::BAD_SEQUENCE_ID, "x").kind_name(),
        "BAD_SEQUENCE_ID"
    );
}
