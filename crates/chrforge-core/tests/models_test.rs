use std::time::Duration;

use chrono::{TimeZone, Utc};
use chrforge_core::config::DomainConfig;
use chrforge_core::models::*;
use uuid::Uuid;

// --- Devices ---

#[test]
fn every_device_type_roundtrips_through_its_wire_name() {
    for device in DeviceType::ALL {
        let parsed: DeviceType = device.as_str().parse().unwrap();
        assert_eq!(parsed, *device);
    }
    assert_eq!(DeviceType::ALL.len(), 29);
}

#[test]
fn device_type_serializes_as_wire_name() {
    let json = serde_json::to_string(&DeviceType::AndroidSecondary).unwrap();
    assert_eq!(json, "\"ANDROIDSECONDARY\"");
    let back: DeviceType = serde_json::from_str(&json).unwrap();
    assert_eq!(back, DeviceType::AndroidSecondary);
}

#[test]
fn chromeos_preset_app_name_and_user_agent() {
    let device = DeviceDetails::default();
    assert_eq!(device.device, DeviceType::ChromeOs);
    assert_eq!(device.app_name(), "CHROMEOS\t3.0.3\tChrome_OS\t1");
    assert!(device.user_agent().starts_with("Mozilla/5.0"));
}

#[test]
fn desktop_user_agent_uses_system_and_app_version() {
    let device = DeviceDetails::preset(DeviceType::DesktopMac, Some("9.4.0.1000")).unwrap();
    assert_eq!(device.user_agent(), "DESKTOP:MAC:12.1.4(9.4.0.1000)");
    assert_eq!(device.app_version, "9.4.0.1000");
}

#[test]
fn secondary_device_app_name_is_suffixed() {
    let device = DeviceDetails::preset(DeviceType::AndroidSecondary, None).unwrap();
    assert!(device.is_secondary);
    assert!(device.app_name().ends_with(";SECONDARY"));
    assert_eq!(device.user_agent(), "Line/13.4.1 System Product Name 12.1.4");
}

#[test]
fn special_device_types_have_no_preset() {
    assert!(DeviceDetails::preset(DeviceType::Bot, None).is_none());
    assert!(DeviceDetails::custom(DeviceType::Bot, "", "BotOS", "1", None).is_err());
}

#[test]
fn v3_token_support_is_limited_to_desktops_and_chromeos() {
    assert!(DeviceType::DesktopWin.supports_v3_token());
    assert!(DeviceType::ChromeOs.supports_v3_token());
    assert!(!DeviceType::Ios.supports_v3_token());
    assert!(DeviceType::Ios.supports_sync());
    assert!(!DeviceType::WatchOs.supports_sync());
}

#[test]
fn fingerprint_is_stable_per_install_and_distinct_across_installs() {
    let device = DeviceDetails::default();
    let install = Uuid::new_v4();
    let fp1 = device.fingerprint(&install);
    let fp2 = device.fingerprint(&install);
    assert_eq!(fp1, fp2);
    assert_eq!(fp1.len(), 32);

    let other = device.fingerprint(&Uuid::new_v4());
    assert_ne!(fp1, other);

    let desktop = DeviceDetails::preset(DeviceType::DesktopWin, None).unwrap();
    assert_ne!(desktop.fingerprint(&install), fp1);
}

// --- Endpoints ---

#[test]
fn protocol_inferred_from_path_suffix() {
    assert_eq!(WireProtocol::infer("/S4"), WireProtocol::Compact);
    assert_eq!(WireProtocol::infer("/CA5"), WireProtocol::Compact);
    assert_eq!(WireProtocol::infer("/S3"), WireProtocol::Binary);
    assert_eq!(WireProtocol::infer("/api/v3p/rs"), WireProtocol::Binary);
    assert_eq!(WireProtocol::from_type_id(4), Some(WireProtocol::Compact));
    assert_eq!(WireProtocol::from_type_id(9), None);
}

#[test]
fn registry_routes_paths_to_domains() {
    let registry = EndpointRegistry::default();
    assert_eq!(registry.full_url("/S4", None), "http://localhost:8111/S4");
    assert_eq!(registry.full_url("/BEACON4", None), "http://localhost:8112/BEACON4");
    assert_eq!(registry.full_url("/CH4", None), "http://localhost:8113/CH4");
    assert_eq!(registry.full_url("/SQ1", None), "http://localhost:8113/SQ1");
    assert_eq!(
        registry.full_url("/S4", Some("https://other.test/")),
        "https://other.test/S4"
    );
}

#[test]
fn registry_protocols_honour_explicit_overrides() {
    let registry = EndpointRegistry::default();
    assert_eq!(registry.protocol_for("/S3"), WireProtocol::Binary);
    assert_eq!(registry.protocol_for("/SQ1"), WireProtocol::Compact);
    assert_eq!(
        registry.protocol_for("/EXT/auth/tokenrefresh/v1"),
        WireProtocol::Compact
    );
    // Unregistered paths fall back to the naming convention.
    assert_eq!(registry.protocol_for("/NEW9"), WireProtocol::Compact);
}

#[test]
fn registry_queries_and_custom_registration() {
    let mut registry = EndpointRegistry::new(DomainConfig::default());
    assert!(registry.get("/SNS4").unwrap().deprecated);
    assert!(!registry.by_kind(EndpointKind::Commerce).is_empty());
    assert_eq!(registry.exception_type("/S4"), Some("TalkException"));
    assert_eq!(registry.exception_type("/CH3"), Some("ChannelException"));
    assert!(registry.is_square("/SQLV1"));
    assert!(!registry.is_square("/S4"));

    registry.register(
        ApiEndpoint::new("/X1", EndpointKind::Utility, "experimental")
            .with_protocol(WireProtocol::Binary),
    );
    assert_eq!(registry.protocol_for("/X1"), WireProtocol::Binary);
}

#[test]
fn join_url_normalises_slashes() {
    assert_eq!(join_url("http://h/", "/p"), "http://h/p");
    assert_eq!(join_url("http://h", "p"), "http://h/p");
}

// --- Sessions and credentials ---

#[test]
fn session_with_unknown_expiry_never_expires() {
    let session = Session::new("tok", vec![1, 2, 3]);
    assert!(!session.is_expired());
    assert!(!session.needs_refresh_at(Utc::now(), Duration::from_secs(3600)));
}

#[test]
fn session_expiry_and_refresh_margin() {
    let issued = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let session = Session::new("tok", vec![])
        .issued_at_time(issued)
        .expires_in(Duration::from_secs(600));

    let before = issued + chrono::Duration::seconds(500);
    let within_margin = issued + chrono::Duration::seconds(560);
    let after = issued + chrono::Duration::seconds(600);

    assert!(!session.is_expired_at(before));
    assert!(!session.needs_refresh_at(before, Duration::from_secs(60)));
    assert!(session.needs_refresh_at(within_margin, Duration::from_secs(60)));
    assert!(session.is_expired_at(after));
}

#[test]
fn refresh_margin_is_capped_at_half_the_lifetime() {
    let issued = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let session = Session::new("tok", vec![])
        .issued_at_time(issued)
        .expires_in(Duration::from_secs(30));
    let margin = Duration::from_secs(60);

    assert!(!session.needs_refresh_at(issued, margin));
    assert!(!session.needs_refresh_at(issued + chrono::Duration::seconds(14), margin));
    assert!(session.needs_refresh_at(issued + chrono::Duration::seconds(15), margin));
}

#[test]
fn lifetime_survives_a_later_issue_time() {
    let local = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let server = local + chrono::Duration::seconds(600);
    let session = Session::new("tok", vec![])
        .issued_at_time(local)
        .expires_in(Duration::from_secs(300))
        .issued_at_time(server);

    assert_eq!(session.issued_at(), server);
    assert!(!session.needs_refresh_at(local + chrono::Duration::seconds(100), Duration::from_secs(60)));
    assert!(session.needs_refresh_at(local + chrono::Duration::seconds(240), Duration::from_secs(60)));
}

#[test]
fn rotated_session_keeps_everything_but_the_token() {
    let session = Session::new("old", vec![9])
        .with_refresh_token(Some("rt".into()))
        .with_account_id(Some("u123".into()))
        .expires_in(Duration::from_secs(60));
    let rotated = session.with_rotated_token("new");

    assert_eq!(rotated.session_token(), "new");
    assert_eq!(rotated.refresh_token(), Some("rt"));
    assert_eq!(rotated.account_id(), Some("u123"));
    assert_eq!(rotated.expires_at(), session.expires_at());
    assert_eq!(rotated.device_fingerprint(), &[9]);
}

#[test]
fn debug_output_redacts_secrets() {
    let session = Session::new("super-secret-token", vec![]);
    assert!(!format!("{session:?}").contains("super-secret-token"));

    let credential = Credential::refresh_token("u123", "hidden-refresh");
    let rendered = format!("{credential:?}");
    assert!(!rendered.contains("hidden-refresh"));
    assert!(rendered.contains("u123"));
    assert_eq!(credential.kind(), CredentialKind::RefreshToken);
    assert_eq!(credential.secret(), "hidden-refresh");
}
