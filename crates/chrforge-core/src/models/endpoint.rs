//! Endpoint catalogue: which path speaks which protocol, on which domain.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::DomainConfig;
use crate::constants::{PROTOCOL_TYPE_BINARY, PROTOCOL_TYPE_COMPACT, SECONDARY_QR_LOGIN_ENDPOINT, TOKEN_REFRESH_ENDPOINT};

/// Which Thrift wire protocol an endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireProtocol {
    /// Strict big-endian binary protocol (protocol type 3).
    Binary,
    /// Compact varint protocol (protocol type 4).
    Compact,
}

impl WireProtocol {
    pub fn type_id(&self) -> u8 {
        match self {
            Self::Binary => PROTOCOL_TYPE_BINARY,
            Self::Compact => PROTOCOL_TYPE_COMPACT,
        }
    }

    pub fn from_type_id(id: u8) -> Option<Self> {
        match id {
            PROTOCOL_TYPE_BINARY => Some(Self::Binary),
            PROTOCOL_TYPE_COMPACT => Some(Self::Compact),
            _ => None,
        }
    }

    /// Legacy `…3` endpoints speak binary; `…4` and newer speak compact.
    pub fn infer(path: &str) -> Self {
        match path.trim_end_matches('/').chars().last() {
            Some(c) if c.is_ascii_digit() && c >= '4' => Self::Compact,
            _ => Self::Binary,
        }
    }
}

/// Endpoint categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    Encryption,
    Authentication,
    Messaging,
    Channel,
    Commerce,
    Social,
    Utility,
    External,
    Notification,
    Call,
    Square,
    E2ee,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub path: String,
    pub kind: EndpointKind,
    pub description: String,
    pub deprecated: bool,
    pub protocol: WireProtocol,
}

impl ApiEndpoint {
    pub fn new(path: &str, kind: EndpointKind, description: &str) -> Self {
        Self {
            path: path.to_string(),
            kind,
            description: description.to_string(),
            deprecated: false,
            protocol: WireProtocol::infer(path),
        }
    }

    pub fn with_protocol(mut self, protocol: WireProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn full_url(&self, base_domain: &str) -> String {
        join_url(base_domain, &self.path)
    }
}

/// Join a base domain and a path with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

const SQUARE_PATHS: &[&str] = &["/SQ1", "/SQLV1"];

/// Registry of every endpoint the client may call.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    endpoints: BTreeMap<String, ApiEndpoint>,
    domains: DomainConfig,
}

impl EndpointRegistry {
    pub fn new(domains: DomainConfig) -> Self {
        let mut registry = Self {
            endpoints: BTreeMap::new(),
            domains,
        };
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        use EndpointKind::*;

        let defaults = [
            ApiEndpoint::new("/enc", Encryption, "Encryption endpoint"),
            // Authentication
            ApiEndpoint::new("/ACS4", Authentication, "Age check endpoint"),
            ApiEndpoint::new("/RS3", Authentication, "Auth endpoint"),
            ApiEndpoint::new("/RS4", Authentication, "Auth endpoint V4"),
            ApiEndpoint::new("/api/v3p/rs", Authentication, "Auth endpoint (v3 path)"),
            ApiEndpoint::new("/ACCT/authfactor/eap/v1", Authentication, "EAP auth endpoint"),
            ApiEndpoint::new(SECONDARY_QR_LOGIN_ENDPOINT, Authentication, "Secondary QR login")
                .with_protocol(WireProtocol::Compact),
            ApiEndpoint::new("/acct/lgn/secpwless/v1", Authentication, "Secondary passwordless login"),
            ApiEndpoint::new("/acct/lp/lgn/secpwless/v1", Authentication, "Secondary passwordless login permit"),
            ApiEndpoint::new("/acct/authfactor/second/pincode/v1", Authentication, "Secondary auth factor PIN"),
            ApiEndpoint::new("/acct/authfactor/pwless/manage/v1", Authentication, "Passwordless credential management"),
            ApiEndpoint::new("/ACCT/authfactor/pwless/v1", Authentication, "Passwordless primary registration"),
            ApiEndpoint::new(TOKEN_REFRESH_ENDPOINT, Authentication, "Access token refresh")
                .with_protocol(WireProtocol::Compact),
            ApiEndpoint::new("/LF1", Authentication, "Secondary device login verify PIN with E2EE"),
            ApiEndpoint::new("/Q", Authentication, "Secondary device login verify PIN"),
            // Messaging
            ApiEndpoint::new("/S3", Messaging, "Normal messaging endpoint"),
            ApiEndpoint::new("/S4", Messaging, "Normal messaging endpoint V4"),
            ApiEndpoint::new("/SYNC3", Messaging, "Sync endpoint"),
            ApiEndpoint::new("/SYNC4", Messaging, "Sync endpoint V4"),
            ApiEndpoint::new("/api/v3/TalkService.do", Messaging, "Talk service (v3 path)"),
            ApiEndpoint::new("/C5", Messaging, "Compact message endpoint"),
            ApiEndpoint::new("/CA5", Messaging, "Compact plain message endpoint"),
            ApiEndpoint::new("/ECA5", E2ee, "Compact E2EE message endpoint"),
            ApiEndpoint::new("/CP4", Messaging, "Cancel long polling endpoint"),
            ApiEndpoint::new("/R2", Utility, "Connection info endpoint"),
            // Channel
            ApiEndpoint::new("/CH3", Channel, "Channel endpoint"),
            ApiEndpoint::new("/CH4", Channel, "Channel endpoint V4"),
            ApiEndpoint::new("/PS4", Channel, "Personal endpoint V4"),
            ApiEndpoint::new("/CAPP1", Channel, "Chat app endpoint"),
            // Commerce
            ApiEndpoint::new("/COIN4", Commerce, "Coin endpoint"),
            ApiEndpoint::new("/SHOP3", Commerce, "Shop endpoint"),
            ApiEndpoint::new("/SHOPA", Commerce, "Shop auth endpoint"),
            ApiEndpoint::new("/TSHOP4", Commerce, "Unified shop endpoint"),
            ApiEndpoint::new("/WALLET4", Commerce, "Wallet endpoint"),
            // Square and social
            ApiEndpoint::new("/SQ1", Square, "Square endpoint").with_protocol(WireProtocol::Compact),
            ApiEndpoint::new("/SQLV1", Square, "Square live endpoint").with_protocol(WireProtocol::Compact),
            ApiEndpoint::new("/BP1", Square, "Square bot endpoint"),
            ApiEndpoint::new("/BUDDY3", Social, "Buddy endpoint"),
            ApiEndpoint::new("/SNS4", Social, "SNS adapter endpoint").deprecated(),
            ApiEndpoint::new("/SA4", Social, "SNS adapter endpoint"),
            ApiEndpoint::new("/api/v4p/sa", Social, "SNS adapter registration")
                .with_protocol(WireProtocol::Compact),
            // Calls
            ApiEndpoint::new("/V3", Call, "Call endpoint"),
            ApiEndpoint::new("/EXT/groupcall/youtube-api", External, "VoIP group call YouTube"),
            // Utility
            ApiEndpoint::new("/BEACON4", Utility, "Beacon endpoint"),
            ApiEndpoint::new("/IOT1", Utility, "IoT endpoint"),
            ApiEndpoint::new("/LIFF1", Utility, "LIFF endpoint"),
            ApiEndpoint::new("/F4", Notification, "Notify sleep endpoint"),
            ApiEndpoint::new("/EIS4", External, "External interlock endpoint"),
            ApiEndpoint::new("/EKBS4", E2ee, "E2EE key backup endpoint"),
        ];

        for endpoint in defaults {
            self.register(endpoint);
        }
    }

    /// Register (or replace) an endpoint.
    pub fn register(&mut self, endpoint: ApiEndpoint) {
        self.endpoints.insert(endpoint.path.clone(), endpoint);
    }

    pub fn get(&self, path: &str) -> Option<&ApiEndpoint> {
        self.endpoints.get(path)
    }

    pub fn by_kind(&self, kind: EndpointKind) -> Vec<&ApiEndpoint> {
        self.endpoints.values().filter(|e| e.kind == kind).collect()
    }

    pub fn all(&self) -> impl Iterator<Item = &ApiEndpoint> {
        self.endpoints.values()
    }

    /// Protocol for a path; unregistered paths fall back to the naming convention.
    pub fn protocol_for(&self, path: &str) -> WireProtocol {
        self.get(path)
            .map(|e| e.protocol)
            .unwrap_or_else(|| WireProtocol::infer(path))
    }

    /// Domain serving a path.
    pub fn domain_for(&self, path: &str) -> &str {
        if path.starts_with("/BEACON") {
            &self.domains.obs
        } else if path.starts_with("/CH") || path.starts_with("/SQ") {
            &self.domains.api
        } else {
            &self.domains.host
        }
    }

    pub fn full_url(&self, path: &str, custom_domain: Option<&str>) -> String {
        let base = custom_domain.unwrap_or_else(|| self.domain_for(path));
        join_url(base, path)
    }

    /// Name of the declared exception struct returned by an endpoint.
    pub fn exception_type(&self, path: &str) -> Option<&'static str> {
        match path {
            "/S3" | "/S4" | "/SYNC3" | "/SYNC4" | "/api/v3p/rs" | "/api/v3/TalkService.do" => {
                Some("TalkException")
            }
            "/CH3" | "/CH4" => Some("ChannelException"),
            "/SQ1" => Some("SquareException"),
            "/LIFF1" => Some("LiffException"),
            _ => None,
        }
    }

    pub fn is_square(&self, path: &str) -> bool {
        SQUARE_PATHS.contains(&path)
    }

    pub fn domains(&self) -> &DomainConfig {
        &self.domains
    }

    /// Swap in a new domain configuration (e.g. after env overrides).
    pub fn set_domains(&mut self, domains: DomainConfig) {
        self.domains = domains;
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new(DomainConfig::default())
    }
}
