//! Request headers sent with every call.

use chrforge_core::config::{ClientConfig, DomainConfig};
use chrforge_core::constants::{ACCESS_HEADER, THRIFT_CONTENT_TYPE};
use chrforge_core::models::DeviceDetails;

/// Builds the fixed header set once and appends the access token per call.
#[derive(Debug, Clone)]
pub struct HeaderBuilder {
    base: Vec<(String, String)>,
}

impl HeaderBuilder {
    pub fn new(device: &DeviceDetails, client: &ClientConfig, domains: &DomainConfig) -> Self {
        let base = [
            ("Host", domains.host_name().to_string()),
            ("accept", THRIFT_CONTENT_TYPE.to_string()),
            ("user-agent", device.user_agent()),
            ("x-line-application", device.app_name()),
            ("content-type", THRIFT_CONTENT_TYPE.to_string()),
            ("x-lal", client.language.clone()),
            ("x-lpv", "1".to_string()),
            ("x-lhm", "POST".to_string()),
            ("accept-encoding", "gzip".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self { base }
    }

    pub fn build(&self, access_token: Option<&str>) -> Vec<(String, String)> {
        let mut headers = self.base.clone();
        if let Some(token) = access_token {
            headers.push((ACCESS_HEADER.to_string(), token.to_string()));
        }
        headers
    }
}
