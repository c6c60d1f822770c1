use serde::{Deserialize, Serialize};

use super::defaults;

/// Base URLs of the backend domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    pub host: String,
    pub obs: String,
    pub api: String,
    pub access: String,
    pub biz_timeline: String,
}

impl DomainConfig {
    /// Override domains from `CHRFORGE_*_DOMAIN` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_from(|key| std::env::var(key).ok());
    }

    /// Override domains from an arbitrary lookup (env-like).
    pub fn apply_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields: [(&str, &mut String); 5] = [
            ("CHRFORGE_HOST_DOMAIN", &mut self.host),
            ("CHRFORGE_OBS_DOMAIN", &mut self.obs),
            ("CHRFORGE_API_DOMAIN", &mut self.api),
            ("CHRFORGE_ACCESS_DOMAIN", &mut self.access),
            ("CHRFORGE_BIZ_TIMELINE_DOMAIN", &mut self.biz_timeline),
        ];
        for (key, slot) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = value;
            }
        }
    }

    /// Host name (no scheme) of the main domain, for the `Host` header.
    pub fn host_name(&self) -> &str {
        let host = self
            .host
            .strip_prefix("https://")
            .or_else(|| self.host.strip_prefix("http://"))
            .unwrap_or(&self.host);
        host.trim_end_matches('/')
    }
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST_DOMAIN.to_string(),
            obs: defaults::DEFAULT_OBS_DOMAIN.to_string(),
            api: defaults::DEFAULT_API_DOMAIN.to_string(),
            access: defaults::DEFAULT_ACCESS_DOMAIN.to_string(),
            biz_timeline: defaults::DEFAULT_BIZ_TIMELINE_DOMAIN.to_string(),
        }
    }
}
