use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ErrorCategory;

/// Maps platform exception codes onto retry categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorCodeConfig {
    pub auth_codes: Vec<i32>,
    pub rate_limit_codes: Vec<i32>,
}

impl ErrorCodeConfig {
    pub fn classify(&self, code: i32) -> ErrorCategory {
        if self.auth_codes.contains(&code) {
            ErrorCategory::Auth
        } else if self.rate_limit_codes.contains(&code) {
            ErrorCategory::RateLimit
        } else {
            ErrorCategory::Unknown
        }
    }
}

impl Default for ErrorCodeConfig {
    fn default() -> Self {
        Self {
            auth_codes: defaults::DEFAULT_AUTH_CODES.to_vec(),
            rate_limit_codes: defaults::DEFAULT_RATE_LIMIT_CODES.to_vec(),
        }
    }
}
