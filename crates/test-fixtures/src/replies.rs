//! Builders for server replies, keyed off the request they answer.

use chrforge_codec::records::{
    ApplicationException, QrCodeLoginV2Response, RefreshAccessTokenResponse, TalkException,
    TokenV3IssueResult,
};
use chrforge_codec::{Envelope, Record, ThriftRecord, WireValue};
use chrforge_core::errors::{ForgeResult, RpcError, CODE_CONNECTION};
use chrforge_core::models::{EndpointRegistry, WireProtocol};
use chrforge_core::traits::{TransportRequest, TransportResponse};

/// Path component of a request URL (`http://host:1/S4` → `/S4`).
pub fn request_path(request: &TransportRequest) -> String {
    let url = request.url.as_str();
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    match without_scheme.find('/') {
        Some(idx) => without_scheme[idx..].to_string(),
        None => "/".to_string(),
    }
}

/// Wire protocol the request was encoded with, per the default registry.
pub fn request_protocol(request: &TransportRequest) -> WireProtocol {
    EndpointRegistry::default().protocol_for(&request_path(request))
}

/// Decode the call envelope inside a request.
///
/// # Panics
/// Panics if the body is not a valid envelope.
pub fn decode_call(request: &TransportRequest) -> Envelope {
    Envelope::decode(&request.body, request_protocol(request))
        .unwrap_or_else(|e| panic!("request body is not a valid envelope: {e}"))
}

/// Access token header sent with a request, if any.
pub fn access_token(request: &TransportRequest) -> Option<String> {
    request.header("x-line-access").map(str::to_string)
}

fn respond(request: &TransportRequest, envelope: Envelope) -> ForgeResult<TransportResponse> {
    let body = envelope
        .encode(request_protocol(request))
        .unwrap_or_else(|e| panic!("reply does not encode: {e}"));
    Ok(TransportResponse::ok(body))
}

/// Successful reply echoing the request's method and sequence id.
pub fn reply_ok(request: &TransportRequest, value: impl Into<WireValue>) -> ForgeResult<TransportResponse> {
    let call = decode_call(request);
    respond(request, Envelope::success(call.method, call.sequence_id, value))
}

/// Successful reply with a forced sequence id.
pub fn reply_with_sequence(
    request: &TransportRequest,
    sequence_id: i32,
    value: impl Into<WireValue>,
) -> ForgeResult<TransportResponse> {
    let call = decode_call(request);
    respond(request, Envelope::success(call.method, sequence_id, value))
}

/// Reply carrying a declared platform exception in result field 1.
pub fn reply_talk_exception(
    request: &TransportRequest,
    exception: TalkException,
) -> ForgeResult<TransportResponse> {
    reply_declared_exception(request, exception.to_record())
}

/// Reply whose result record carries `exception` in field 1, for services
/// whose exception layout differs from `TalkException`.
pub fn reply_declared_exception(
    request: &TransportRequest,
    exception: Record,
) -> ForgeResult<TransportResponse> {
    let call = decode_call(request);
    let result = Record::new().with(1, exception);
    respond(request, Envelope::reply(call.method, call.sequence_id, result))
}

/// Exception-type message carrying an application exception.
pub fn reply_application_exception(
    request: &TransportRequest,
    kind: i32,
    message: &str,
) -> ForgeResult<TransportResponse> {
    let call = decode_call(request);
    let error = ApplicationException::new(kind, message).to_record();
    respond(request, Envelope::exception(call.method, call.sequence_id, error))
}

/// Add a header to a successful response.
pub fn with_header(
    response: ForgeResult<TransportResponse>,
    name: &str,
    value: &str,
) -> ForgeResult<TransportResponse> {
    response.map(|mut r| {
        r.headers.push((name.to_string(), value.to_string()));
        r
    })
}

/// A bare HTTP status with an empty body.
pub fn status(code: u16) -> ForgeResult<TransportResponse> {
    Ok(TransportResponse {
        status: code,
        headers: Vec::new(),
        body: Vec::new(),
    })
}

/// A connection-level failure.
pub fn connection_error() -> ForgeResult<TransportResponse> {
    Err(RpcError::transport(CODE_CONNECTION, "connection reset by peer").into())
}

/// Reply to a token refresh call.
pub fn reply_refresh(
    request: &TransportRequest,
    access_token: &str,
    refresh_token: Option<&str>,
    duration_secs: i64,
) -> ForgeResult<TransportResponse> {
    let response = RefreshAccessTokenResponse {
        access_token: access_token.to_string(),
        duration_until_refresh_secs: Some(duration_secs),
        refresh_token: refresh_token.map(str::to_string),
        ..Default::default()
    };
    reply_ok(request, response.to_wire())
}

/// Reply to a QR login call with a v3 token pair.
pub fn reply_qr_login(
    request: &TransportRequest,
    access_token: &str,
    refresh_token: &str,
    mid: &str,
) -> ForgeResult<TransportResponse> {
    let response = QrCodeLoginV2Response {
        token_v3: Some(TokenV3IssueResult {
            access_token: access_token.to_string(),
            refresh_token: Some(refresh_token.to_string()),
            duration_until_refresh_secs: Some(3600),
            ..Default::default()
        }),
        mid: Some(mid.to_string()),
        ..Default::default()
    };
    reply_ok(request, response.to_wire())
}
