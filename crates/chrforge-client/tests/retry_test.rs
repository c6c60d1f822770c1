use std::sync::Arc;
use std::time::Duration;

use chrforge_client::ForgeClient;
use chrforge_codec::records::{
    ApplicationException, SquareException, TalkException, RETRY_AFTER_MS_KEY,
};
use chrforge_codec::{Record, ThriftRecord, WireValue};
use chrforge_core::config::ForgeConfig;
use chrforge_core::constants::TOKEN_REFRESH_ENDPOINT;
use chrforge_core::errors::{AuthError, ErrorCategory, ForgeError};
use chrforge_core::models::Credential;
use chrforge_core::traits::TransportRequest;
use test_fixtures::config::fast_config;
use test_fixtures::replies::{
    access_token, connection_error, decode_call, reply_application_exception, reply_declared_exception,
    reply_ok,
    reply_refresh, reply_talk_exception, request_path, status, with_header,
};
use test_fixtures::{MemoryCredentialStore, MockTransport};
use tokio::time::Instant;

fn token_config() -> ForgeConfig {
    let mut config = fast_config();
    config.session.verify_method = None;
    config
}

async fn with_token(transport: &MockTransport) -> ForgeClient<MockTransport> {
    let store = Arc::new(MemoryCredentialStore::new());
    let client = ForgeClient::new(token_config(), transport.clone(), store).unwrap();
    client
        .login(Credential::auth_token("user-1", "tok-1"))
        .await
        .unwrap();
    client
}

async fn with_refresh_token(transport: &MockTransport) -> ForgeClient<MockTransport> {
    let store = Arc::new(MemoryCredentialStore::new());
    let client = ForgeClient::new(fast_config(), transport.clone(), store).unwrap();
    client
        .login(Credential::refresh_token("user-1", "rt-1"))
        .await
        .unwrap();
    client
}

fn service_requests(transport: &MockTransport) -> Vec<TransportRequest> {
    transport
        .requests()
        .into_iter()
        .filter(|r| request_path(r) == "/S4")
        .collect()
}

#[tokio::test(start_paused = true)]
async fn transport_failures_are_attempted_at_most_max_retries_plus_one() {
    let transport = MockTransport::new(|_, _| connection_error());
    let client = with_token(&transport).await;

    let start = Instant::now();
    let err = client.call("/S4", "getProfile", Record::new()).await.unwrap_err();
    let elapsed = start.elapsed();

    assert_eq!(err.category(), Some(ErrorCategory::Transport));
    assert_eq!(transport.calls_to("/S4"), 4);
    // 100ms + 200ms + 400ms of backoff.
    assert!(elapsed >= Duration::from_millis(700), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(800), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn transient_failure_recovers_with_fresh_sequence_ids() {
    let transport = MockTransport::new(|req, index| match index {
        0 | 1 => connection_error(),
        _ => reply_ok(req, "profile"),
    });
    let client = with_token(&transport).await;

    let args = Record::new().with(1, "u-1");
    let value = client.call("/S4", "getProfile", args.clone()).await.unwrap();
    assert_eq!(value, WireValue::from("profile"));

    let calls: Vec<_> = service_requests(&transport).iter().map(decode_call).collect();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls.iter().map(|c| c.sequence_id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(calls.iter().all(|c| c.payload == args && c.method == "getProfile"));
}

#[tokio::test(start_paused = true)]
async fn server_errors_are_retried_as_transport_failures() {
    let transport = MockTransport::new(|_, _| status(503));
    let client = with_token(&transport).await;

    let err = client.call("/S4", "getProfile", Record::new()).await.unwrap_err();
    assert_eq!(err.category(), Some(ErrorCategory::Transport));
    assert_eq!(transport.calls_to("/S4"), 4);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_honours_the_server_delay() {
    let transport = MockTransport::new(|req, index| match index {
        0 => reply_talk_exception(
            req,
            TalkException::new(35, "RATE_LIMIT").with_parameter("retry_after", "2"),
        ),
        _ => reply_ok(req, true),
    });
    let client = with_token(&transport).await;

    let start = Instant::now();
    client.call("/S4", "sendMessage", Record::new()).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(transport.calls_to("/S4"), 2);
    assert!(elapsed >= Duration::from_secs(2), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(2_100), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn http_429_uses_the_retry_after_header() {
    let transport = MockTransport::new(|req, index| match index {
        0 => with_header(status(429), "Retry-After", "3"),
        _ => reply_ok(req, true),
    });
    let client = with_token(&transport).await;

    let start = Instant::now();
    client.call("/S4", "sendMessage", Record::new()).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(transport.calls_to("/S4"), 2);
    assert!(elapsed >= Duration::from_secs(3), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(3_100), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn rate_limit_wait_is_capped() {
    let transport = MockTransport::new(|req, index| match index {
        0 => reply_talk_exception(
            req,
            TalkException::new(35, "RATE_LIMIT").with_parameter(RETRY_AFTER_MS_KEY, "600000"),
        ),
        _ => reply_ok(req, true),
    });
    let client = with_token(&transport).await;

    let start = Instant::now();
    client.call("/S4", "sendMessage", Record::new()).await.unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_secs(10), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(10_100), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn rate_limit_without_delay_falls_back_to_backoff() {
    let transport = MockTransport::new(|req, index| match index {
        0 => reply_talk_exception(req, TalkException::new(4, "ABUSE_BLOCK")),
        _ => reply_ok(req, true),
    });
    let client = with_token(&transport).await;

    let start = Instant::now();
    client.call("/S4", "sendMessage", Record::new()).await.unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(100), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(200), "{elapsed:?}");
}

#[tokio::test]
async fn auth_failure_refreshes_then_retries_once() {
    let transport = MockTransport::new(|req, _| match request_path(req).as_str() {
        TOKEN_REFRESH_ENDPOINT => {
            let token = if decode_call(req).sequence_id == 1 { "acc-1" } else { "acc-2" };
            reply_refresh(req, token, Some("rt-2"), 3600)
        }
        _ if access_token(req).as_deref() == Some("acc-1") => {
            reply_talk_exception(req, TalkException::new(119, "MUST_REFRESH_V3_TOKEN"))
        }
        _ => reply_ok(req, "profile"),
    });
    let client = with_refresh_token(&transport).await;

    let value = client.call("/S4", "getProfile", Record::new()).await.unwrap();
    assert_eq!(value, WireValue::from("profile"));

    assert_eq!(transport.calls_to(TOKEN_REFRESH_ENDPOINT), 2);
    let tokens: Vec<_> = service_requests(&transport).iter().map(access_token).collect();
    assert_eq!(tokens, vec![Some("acc-1".to_string()), Some("acc-2".to_string())]);
}

#[tokio::test]
async fn second_auth_failure_is_terminal() {
    let transport = MockTransport::new(|req, _| match request_path(req).as_str() {
        TOKEN_REFRESH_ENDPOINT => reply_refresh(req, "acc", Some("rt-2"), 3600),
        _ => reply_talk_exception(req, TalkException::new(8, "AUTHENTICATION_FAILED")),
    });
    let client = with_refresh_token(&transport).await;

    let err = client.call("/S4", "getProfile", Record::new()).await.unwrap_err();
    match err {
        ForgeError::Auth(AuthError::Rejected { code, reason }) => {
            assert_eq!(code, 8);
            assert!(reason.contains("AUTHENTICATION_FAILED"), "{reason}");
        }
        other => panic!("expected terminal rejection, got {other:?}"),
    }
    assert_eq!(transport.calls_to("/S4"), 2);
    assert_eq!(transport.calls_to(TOKEN_REFRESH_ENDPOINT), 2);
}

#[tokio::test]
async fn rejected_bare_token_is_not_refreshed() {
    let transport = MockTransport::new(|req, _| {
        reply_talk_exception(req, TalkException::new(8, "AUTHENTICATION_FAILED"))
    });
    let client = with_token(&transport).await;

    let err = client.call("/S4", "getProfile", Record::new()).await.unwrap_err();
    assert!(matches!(
        err,
        ForgeError::Auth(AuthError::Rejected { code: 8, .. })
    ));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn protocol_errors_are_attempted_once() {
    let transport = MockTransport::new(|req, _| {
        reply_application_exception(req, ApplicationException::INTERNAL_ERROR, "boom")
    });
    let client = with_token(&transport).await;

    let err = client.call("/S4", "getProfile", Record::new()).await.unwrap_err();
    assert_eq!(err.category(), Some(ErrorCategory::Protocol));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn unclassified_platform_errors_are_not_retried() {
    let transport = MockTransport::new(|req, _| {
        reply_talk_exception(req, TalkException::new(10, "NOT_AVAILABLE_USER"))
    });
    let client = with_token(&transport).await;

    let err = client.call("/S4", "getContact", Record::new()).await.unwrap_err();
    match err {
        ForgeError::Rpc(e) => {
            assert_eq!(e.category, ErrorCategory::Unknown);
            assert_eq!(e.code, 10);
        }
        other => panic!("expected rpc error, got {other:?}"),
    }
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn disabled_retries_fail_on_first_transport_error() {
    let transport = MockTransport::new(|_, _| connection_error());
    let store = Arc::new(MemoryCredentialStore::new());
    let mut config = token_config();
    config.retry = chrforge_core::config::RetryConfig::disabled();
    let client = ForgeClient::new(config, transport.clone(), store).unwrap();
    client
        .login(Credential::auth_token("user-1", "tok-1"))
        .await
        .unwrap();

    let err = client.call("/S4", "getProfile", Record::new()).await.unwrap_err();
    assert_eq!(err.category(), Some(ErrorCategory::Transport));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn square_exceptions_are_classified_by_their_own_layout() {
    let transport = MockTransport::new(|req, index| match index {
        0 => {
            let mut exception = SquareException::new(4, "throttled");
            exception.error_extra_info = Some(Record::new());
            reply_declared_exception(req, exception.to_record())
        }
        _ => reply_ok(req, true),
    });
    let client = with_token(&transport).await;

    let value = client.call("/SQ1", "getSquare", Record::new()).await.unwrap();
    assert_eq!(value, WireValue::Bool(true));
    assert_eq!(transport.calls_to("/SQ1"), 2);
}

#[tokio::test(start_paused = true)]
async fn square_exception_code_reaches_the_caller() {
    let transport = MockTransport::new(|req, _| {
        reply_declared_exception(req, SquareException::new(10, "not a member").to_record())
    });
    let client = with_token(&transport).await;

    let err = client.call("/SQ1", "getSquare", Record::new()).await.unwrap_err();
    match err {
        ForgeError::Rpc(e) => {
            assert_eq!(e.code, 10);
            assert_eq!(e.message, "not a member");
            assert_eq!(e.category, ErrorCategory::Unknown);
        }
        other => panic!("expected an rpc error, got {other:?}"),
    }
    assert_eq!(transport.calls_to("/SQ1"), 1);
}
