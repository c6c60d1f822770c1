use std::sync::Arc;

use chrforge_client::{ForgeClient, SessionState};
use chrforge_codec::records::RefreshAccessTokenResponse;
use chrforge_codec::{Record, ThriftRecord};
use chrforge_core::constants::TOKEN_REFRESH_ENDPOINT;
use chrforge_core::errors::{DecodeError, ForgeError};
use chrforge_core::models::Credential;
use test_fixtures::config::fast_config;
use test_fixtures::replies::{reply_ok, reply_refresh, request_path};
use test_fixtures::{MemoryCredentialStore, MockTransport};

fn transport() -> MockTransport {
    MockTransport::new(|req, _| match request_path(req).as_str() {
        TOKEN_REFRESH_ENDPOINT => reply_refresh(req, "acc-1", Some("rt-2"), 3600),
        _ => {
            let record = RefreshAccessTokenResponse {
                access_token: "nested".to_string(),
                ..Default::default()
            };
            reply_ok(req, record.to_wire())
        }
    })
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let mut config = fast_config();
    config.client.request_timeout_ms = 0;
    let err = ForgeClient::new(config, transport(), Arc::new(MemoryCredentialStore::new()))
        .unwrap_err();
    assert!(matches!(err, ForgeError::Config(_)), "got {err:?}");
}

#[tokio::test]
async fn status_follows_the_session_lifecycle() {
    let client =
        ForgeClient::new(fast_config(), transport(), Arc::new(MemoryCredentialStore::new())).unwrap();

    let status = client.status();
    assert_eq!(status.state, SessionState::Unauthenticated);
    assert_eq!(status.account_id, None);
    assert_eq!(status.outstanding_calls, 0);

    client
        .login(Credential::refresh_token("user-1", "rt-1"))
        .await
        .unwrap();
    let status = client.status();
    assert_eq!(status.state, SessionState::Authenticated);
    assert_eq!(status.account_id.as_deref(), Some("user-1"));
    assert!(status.expires_at.is_some());
    assert_eq!(status.outstanding_calls, 0);

    client.logout().unwrap();
    assert_eq!(client.status().state, SessionState::Unauthenticated);
}

#[tokio::test]
async fn call_as_decodes_a_record_reply() {
    let client =
        ForgeClient::new(fast_config(), transport(), Arc::new(MemoryCredentialStore::new())).unwrap();
    client
        .login(Credential::refresh_token("user-1", "rt-1"))
        .await
        .unwrap();

    let reply: RefreshAccessTokenResponse = client
        .call_as("/S4", "getNested", Record::new())
        .await
        .unwrap();
    assert_eq!(reply.access_token, "nested");
}

#[tokio::test]
async fn call_as_rejects_a_scalar_reply() {
    let transport = MockTransport::new(|req, _| reply_ok(req, 42i32));
    let mut config = fast_config();
    config.session.verify_method = None;
    let client = ForgeClient::new(config, transport, Arc::new(MemoryCredentialStore::new())).unwrap();
    client
        .login(Credential::auth_token("user-1", "tok-1"))
        .await
        .unwrap();

    let err = client
        .call_as::<RefreshAccessTokenResponse>("/S4", "getNumber", Record::new())
        .await
        .unwrap_err();
    match err {
        ForgeError::Decode(DecodeError::FieldTypeMismatch { record, .. }) => {
            assert_eq!(record, RefreshAccessTokenResponse::NAME);
        }
        other => panic!("expected a decode error, got {other:?}"),
    }
}

#[test]
fn config_is_loaded_from_toml() {
    let config = chrforge_core::config::ForgeConfig::from_toml(
        r#"
        [retry]
        max_retries = 1

        [session]
        refresh_margin_secs = 5
        "#,
    )
    .unwrap();
    let client =
        ForgeClient::new(config, transport(), Arc::new(MemoryCredentialStore::new())).unwrap();
    assert_eq!(client.config().retry.max_retries, 1);
    assert_eq!(client.config().session.refresh_margin_secs, 5);
    assert_eq!(client.config().retry.initial_backoff_ms, 500);
}
