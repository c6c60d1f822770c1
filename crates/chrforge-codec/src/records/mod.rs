//! Typed views over well-known records.
//!
//! Each type reads the fields it knows and keeps everything else in an
//! `extras` record, so re-encoding preserves fields this client has never
//! heard of.

mod auth;
mod exceptions;

pub use auth::{
    QrCodeLoginV2Request, QrCodeLoginV2Response, RefreshAccessTokenRequest,
    RefreshAccessTokenResponse, TokenV3IssueResult,
};
pub use exceptions::{
    ApplicationException, LiffException, SquareException, TalkException, RETRY_AFTER_MS_KEY,
    RETRY_AFTER_SECS_KEY,
};

use chrforge_core::errors::DecodeError;

use crate::value::{Record, TType, WireValue};

/// A schema-backed record with stable field ids.
pub trait ThriftRecord: Sized {
    const NAME: &'static str;

    fn to_record(&self) -> Record;
    fn from_record(record: Record) -> Result<Self, DecodeError>;

    fn to_wire(&self) -> WireValue {
        WireValue::Struct(self.to_record())
    }
}

/// Consumes known fields from a record, leaving the extras behind.
pub(crate) struct Fields {
    name: &'static str,
    record: Record,
}

impl Fields {
    pub(crate) fn new(name: &'static str, record: Record) -> Self {
        Self { name, record }
    }

    fn mismatch(&self, id: i16, expected: TType, value: &WireValue) -> DecodeError {
        DecodeError::FieldTypeMismatch {
            record: self.name.to_string(),
            field: id,
            expected: expected.to_string(),
            actual: value.ttype().to_string(),
        }
    }

    fn missing(&self, id: i16) -> DecodeError {
        DecodeError::MissingField {
            record: self.name.to_string(),
            field: id,
        }
    }

    pub(crate) fn opt_string(&mut self, id: i16) -> Result<Option<String>, DecodeError> {
        let Some(value) = self.record.remove(id) else {
            return Ok(None);
        };
        match value {
            WireValue::String(s) => Ok(Some(s)),
            WireValue::Binary(b) => match String::from_utf8(b) {
                Ok(s) => Ok(Some(s)),
                Err(e) => Err(self.mismatch(id, TType::String, &WireValue::Binary(e.into_bytes()))),
            },
            other => Err(self.mismatch(id, TType::String, &other)),
        }
    }

    pub(crate) fn req_string(&mut self, id: i16) -> Result<String, DecodeError> {
        self.opt_string(id)?.ok_or_else(|| self.missing(id))
    }

    /// Any integer width is accepted as long as the value fits.
    pub(crate) fn opt_i64(&mut self, id: i16) -> Result<Option<i64>, DecodeError> {
        let Some(value) = self.record.remove(id) else {
            return Ok(None);
        };
        value
            .as_i64()
            .map(Some)
            .ok_or_else(|| self.mismatch(id, TType::I64, &value))
    }

    pub(crate) fn opt_i32(&mut self, id: i16) -> Result<Option<i32>, DecodeError> {
        let Some(value) = self.record.remove(id) else {
            return Ok(None);
        };
        value
            .as_i32()
            .map(Some)
            .ok_or_else(|| self.mismatch(id, TType::I32, &value))
    }

    pub(crate) fn req_i32(&mut self, id: i16) -> Result<i32, DecodeError> {
        self.opt_i32(id)?.ok_or_else(|| self.missing(id))
    }

    pub(crate) fn opt_bool(&mut self, id: i16) -> Result<Option<bool>, DecodeError> {
        let Some(value) = self.record.remove(id) else {
            return Ok(None);
        };
        value
            .as_bool()
            .map(Some)
            .ok_or_else(|| self.mismatch(id, TType::Bool, &value))
    }

    pub(crate) fn opt_record(&mut self, id: i16) -> Result<Option<Record>, DecodeError> {
        match self.record.remove(id) {
            None => Ok(None),
            Some(WireValue::Struct(r)) => Ok(Some(r)),
            Some(other) => Err(self.mismatch(id, TType::Struct, &other)),
        }
    }

    /// A `map<string, string>`; non-text entries are a type mismatch.
    pub(crate) fn opt_string_map(&mut self, id: i16) -> Result<Option<Vec<(String, String)>>, DecodeError> {
        let Some(value) = self.record.remove(id) else {
            return Ok(None);
        };
        let WireValue::Map(entries) = value else {
            return Err(self.mismatch(id, TType::Map, &value));
        };
        let mut out = Vec::with_capacity(entries.len());
        for (k, v) in &entries {
            match (k.as_str(), v.as_str()) {
                (Some(k), Some(v)) => out.push((k.to_string(), v.to_string())),
                _ => return Err(self.mismatch(id, TType::Map, &WireValue::Map(entries.clone()))),
            }
        }
        Ok(Some(out))
    }

    /// Whatever was not consumed.
    pub(crate) fn finish(self) -> Record {
        self.record
    }
}

/// Encode a string map as a `map<string, string>` value.
pub(crate) fn string_map(entries: &[(String, String)]) -> WireValue {
    WireValue::Map(
        entries
            .iter()
            .map(|(k, v)| (WireValue::from(k.as_str()), WireValue::from(v.as_str())))
            .collect(),
    )
}
