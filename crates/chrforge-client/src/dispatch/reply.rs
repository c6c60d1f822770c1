//! Turning a decoded reply envelope into a value or a classified error.

use std::time::Duration;

use chrforge_codec::envelope::RESULT_SUCCESS_FIELD;
use chrforge_codec::records::{ApplicationException, LiffException, SquareException, TalkException};
use chrforge_codec::{Envelope, MessageType, Record, ThriftRecord, WireValue};
use chrforge_core::config::ErrorCodeConfig;
use chrforge_core::errors::{
    DecodeError, ErrorCategory, RpcError, CODE_MALFORMED_RESULT, CODE_UNEXPECTED_REPLY,
};
use chrforge_core::traits::TransportResponse;

/// HTTP status the backend uses for throttling.
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Classify a non-2xx HTTP status. 429 is rate limiting, honouring
/// `Retry-After` in seconds; everything else is a transport failure.
pub fn classify_status(response: &TransportResponse) -> RpcError {
    let code = i32::from(response.status);
    if response.status == STATUS_TOO_MANY_REQUESTS {
        let retry_after = response
            .header("retry-after")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        RpcError::rate_limited(code, "HTTP 429 Too Many Requests", retry_after)
    } else {
        RpcError::transport(code, format!("HTTP {}", response.status))
    }
}

/// Interpret a reply envelope already matched to its call by sequence id.
///
/// Field 0 of the result record is the success value. Any other field is a
/// declared exception. A reply with an empty result record answers a void
/// method and yields an empty record.
pub fn interpret(
    method: &str,
    exception_type: Option<&str>,
    envelope: Envelope,
    codes: &ErrorCodeConfig,
) -> Result<WireValue, RpcError> {
    match envelope.message_type {
        MessageType::Reply => {}
        MessageType::Exception => return Err(application_error(envelope)),
        other => {
            return Err(RpcError::protocol(
                CODE_UNEXPECTED_REPLY,
                format!("expected a reply to {method}, got a {other} message"),
            ))
        }
    }
    if envelope.method != method {
        return Err(RpcError::protocol(
            CODE_UNEXPECTED_REPLY,
            format!("reply names method {:?}, call was {method:?}", envelope.method),
        ));
    }

    let mut result = envelope.payload;
    if let Some(value) = result.remove(RESULT_SUCCESS_FIELD) {
        return Ok(value);
    }
    match result.into_iter().next() {
        None => Ok(WireValue::Struct(Default::default())),
        Some((id, WireValue::Struct(record))) => {
            let name = exception_type.unwrap_or(TalkException::NAME);
            match declared(name, record) {
                Ok(declared) => Err(declared_error(declared, codes)),
                Err(e) => Err(RpcError::new(
                    CODE_MALFORMED_RESULT,
                    format!("{name} in result field {id} is malformed: {e}"),
                    ErrorCategory::Unknown,
                )),
            }
        }
        Some((id, other)) => Err(RpcError::protocol(
            CODE_MALFORMED_RESULT,
            format!("result field {id} holds a {} instead of an exception", other.ttype()),
        )),
    }
}

/// The parts of a declared exception that drive classification.
struct Declared {
    code: i32,
    message: String,
    retry_after: Option<Duration>,
}

/// Parse a declared exception with the layout its service uses. Services
/// without a dedicated layout share the `TalkException` one.
fn declared(name: &str, record: Record) -> Result<Declared, DecodeError> {
    if name == SquareException::NAME {
        let e = SquareException::from_record(record)?;
        return Ok(Declared {
            code: e.error_code,
            message: e.reason,
            retry_after: None,
        });
    }
    if name == LiffException::NAME {
        let e = LiffException::from_record(record)?;
        return Ok(Declared {
            code: e.error_code,
            message: e.message,
            retry_after: None,
        });
    }
    let e = TalkException::from_record(record)?;
    Ok(Declared {
        code: e.code,
        retry_after: e.retry_after(),
        message: e.reason,
    })
}

fn declared_error(declared: Declared, codes: &ErrorCodeConfig) -> RpcError {
    RpcError {
        code: declared.code,
        message: declared.message,
        category: codes.classify(declared.code),
        retry_after: declared.retry_after,
    }
}

/// Application exceptions report framework-level failures (unknown method,
/// bad sequence id, internal error); none of them is worth retrying.
fn application_error(envelope: Envelope) -> RpcError {
    match ApplicationException::from_record(envelope.payload) {
        Ok(e) => RpcError::protocol(e.kind, format!("{}: {}", e.kind_name(), e.message)),
        Err(e) => RpcError::protocol(
            CODE_MALFORMED_RESULT,
            format!("malformed application exception for {}: {e}", envelope.method),
        ),
    }
}
