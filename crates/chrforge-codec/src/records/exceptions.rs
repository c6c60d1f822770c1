use std::time::Duration;

use chrforge_core::errors::DecodeError;

use super::{string_map, Fields, ThriftRecord};
use crate::value::{Record, WireValue};

/// Parameter-map key carrying a retry delay in seconds.
pub const RETRY_AFTER_SECS_KEY: &str = "retry_after";
/// Parameter-map key carrying a retry delay in milliseconds.
pub const RETRY_AFTER_MS_KEY: &str = "retryAfterMs";

/// Declared platform exception: `{1: code, 2: reason, 3: parameterMap}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TalkException {
    pub code: i32,
    pub reason: String,
    pub parameter_map: Vec<(String, String)>,
    pub extras: Record,
}

impl TalkException {
    pub fn new(code: i32, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
            ..Self::default()
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameter_map.push((key.into(), value.into()));
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameter_map
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Server-suggested delay from the parameter map, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        if let Some(ms) = self.parameter(RETRY_AFTER_MS_KEY).and_then(|v| v.trim().parse().ok()) {
            return Some(Duration::from_millis(ms));
        }
        self.parameter(RETRY_AFTER_SECS_KEY)
            .and_then(|v| v.trim().parse().ok())
            .map(Duration::from_secs)
    }
}

impl ThriftRecord for TalkException {
    const NAME: &'static str = "TalkException";

    fn to_record(&self) -> Record {
        let mut record = Record::new().with(1, self.code).with(2, self.reason.as_str());
        if !self.parameter_map.is_empty() {
            record.insert(3, string_map(&self.parameter_map));
        }
        record.merge(self.extras.clone());
        record
    }

    fn from_record(record: Record) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(Self::NAME, record);
        let code = fields.req_i32(1)?;
        let reason = fields.opt_string(2)?.unwrap_or_default();
        let parameter_map = fields.opt_string_map(3)?.unwrap_or_default();
        Ok(Self {
            code,
            reason,
            parameter_map,
            extras: fields.finish(),
        })
    }
}

/// Declared exception of the square service:
/// `{1: errorCode, 2: errorExtraInfo, 3: reason}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SquareException {
    pub error_code: i32,
    pub error_extra_info: Option<Record>,
    pub reason: String,
    pub extras: Record,
}

impl SquareException {
    pub fn new(error_code: i32, reason: impl Into<String>) -> Self {
        Self {
            error_code,
            reason: reason.into(),
            ..Self::default()
        }
    }
}

impl ThriftRecord for SquareException {
    const NAME: &'static str = "SquareException";

    fn to_record(&self) -> Record {
        let mut record = Record::new().with(1, self.error_code);
        if let Some(info) = &self.error_extra_info {
            record.insert(2, WireValue::Struct(info.clone()));
        }
        record.insert(3, self.reason.as_str());
        record.merge(self.extras.clone());
        record
    }

    fn from_record(record: Record) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(Self::NAME, record);
        let error_code = fields.req_i32(1)?;
        let error_extra_info = fields.opt_record(2)?;
        let reason = fields.opt_string(3)?.unwrap_or_default();
        Ok(Self {
            error_code,
            error_extra_info,
            reason,
            extras: fields.finish(),
        })
    }
}

/// Declared exception of the LIFF service: `{1: errorCode, 2: message, 3: payload}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiffException {
    pub error_code: i32,
    pub message: String,
    pub payload: Option<Record>,
    pub extras: Record,
}

impl LiffException {
    pub fn new(error_code: i32, message: impl Into<String>) -> Self {
        Self {
            error_code,
            message: message.into(),
            ..Self::default()
        }
    }
}

impl ThriftRecord for LiffException {
    const NAME: &'static str = "LiffException";

    fn to_record(&self) -> Record {
        let mut record = Record::new().with(1, self.error_code).with(2, self.message.as_str());
        if let Some(payload) = &self.payload {
            record.insert(3, WireValue::Struct(payload.clone()));
        }
        record.merge(self.extras.clone());
        record
    }

    fn from_record(record: Record) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(Self::NAME, record);
        let error_code = fields.req_i32(1)?;
        let message = fields.opt_string(2)?.unwrap_or_default();
        let payload = fields.opt_record(3)?;
        Ok(Self {
            error_code,
            message,
            payload,
            extras: fields.finish(),
        })
    }
}

/// Framework-level failure sent as an exception message: `{1: message, 2: type}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationException {
    pub message: String,
    pub kind: i32,
    pub extras: Record,
}

impl ApplicationException {
    pub const UNKNOWN: i32 = 0;
    pub const UNKNOWN_METHOD: i32 = 1;
    pub const INVALID_MESSAGE_TYPE: i32 = 2;
    pub const WRONG_METHOD_NAME: i32 = 3;
    pub const BAD_SEQUENCE_ID: i32 = 4;
    pub const MISSING_RESULT: i32 = 5;
    pub const INTERNAL_ERROR: i32 = 6;
    pub const PROTOCOL_ERROR: i32 = 7;

    pub fn new(kind: i32, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            extras: Record::new(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            Self::UNKNOWN_METHOD => "UNKNOWN_METHOD",
            Self::INVALID_MESSAGE_TYPE => "INVALID_MESSAGE_TYPE",
            Self::WRONG_METHOD_NAME => "WRONG_METHOD_NAME",
            Self::BAD_SEQUENCE_ID => "BAD_SEQUENCE_ID",
            Self::MISSING_RESULT => "MISSING_RESULT",
            Self::INTERNAL_ERROR => "INTERNAL_ERROR",
            Self::PROTOCOL_ERROR => "PROTOCOL_ERROR",
            _ => "UNKNOWN",
        }
    }
}

impl ThriftRecord for ApplicationException {
    const NAME: &'static str = "TApplicationException";

    fn to_record(&self) -> Record {
        let mut record = Record::new().with(1, self.message.as_str()).with(2, self.kind);
        record.merge(self.extras.clone());
        record
    }

    fn from_record(record: Record) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(Self::NAME, record);
        let message = fields.opt_string(1)?.unwrap_or_default();
        let kind = fields.opt_i32(2)?.unwrap_or(Self::UNKNOWN);
        Ok(Self {
            message,
            kind,
            extras: fields.finish(),
        })
    }
}
