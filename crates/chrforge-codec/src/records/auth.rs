use chrforge_core::errors::DecodeError;

use super::{Fields, ThriftRecord};
use crate::value::Record;

/// Argument of the v3 token refresh call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshAccessTokenRequest {
    pub refresh_token: String,
}

impl ThriftRecord for RefreshAccessTokenRequest {
    const NAME: &'static str = "RefreshAccessTokenRequest";

    fn to_record(&self) -> Record {
        Record::new().with(1, self.refresh_token.as_str())
    }

    fn from_record(record: Record) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(Self::NAME, record);
        Ok(Self {
            refresh_token: fields.req_string(1)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshAccessTokenResponse {
    pub access_token: String,
    pub duration_until_refresh_secs: Option<i64>,
    pub token_issue_time_epoch_secs: Option<i64>,
    /// Present when the server rotates the refresh token too.
    pub refresh_token: Option<String>,
    pub extras: Record,
}

impl ThriftRecord for RefreshAccessTokenResponse {
    const NAME: &'static str = "RefreshAccessTokenResponse";

    fn to_record(&self) -> Record {
        let mut record = Record::new()
            .with(1, self.access_token.as_str())
            .with_opt(2, self.duration_until_refresh_secs)
            .with_opt(4, self.token_issue_time_epoch_secs)
            .with_opt(5, self.refresh_token.as_deref());
        record.merge(self.extras.clone());
        record
    }

    fn from_record(record: Record) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(Self::NAME, record);
        Ok(Self {
            access_token: fields.req_string(1)?,
            duration_until_refresh_secs: fields.opt_i64(2)?,
            token_issue_time_epoch_secs: fields.opt_i64(4)?,
            refresh_token: fields.opt_string(5)?,
            extras: fields.finish(),
        })
    }
}

/// Argument of the secondary-device QR login call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCodeLoginV2Request {
    pub auth_session_id: String,
    pub system_name: String,
    pub model_name: String,
    pub auto_login_is_required: bool,
}

impl ThriftRecord for QrCodeLoginV2Request {
    const NAME: &'static str = "QrCodeLoginV2Request";

    fn to_record(&self) -> Record {
        Record::new()
            .with(1, self.auth_session_id.as_str())
            .with(2, self.system_name.as_str())
            .with(3, self.model_name.as_str())
            .with(4, self.auto_login_is_required)
    }

    fn from_record(record: Record) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(Self::NAME, record);
        Ok(Self {
            auth_session_id: fields.req_string(1)?,
            system_name: fields.opt_string(2)?.unwrap_or_default(),
            model_name: fields.opt_string(3)?.unwrap_or_default(),
            auto_login_is_required: fields.opt_bool(4)?.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenV3IssueResult {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub duration_until_refresh_secs: Option<i64>,
    pub extras: Record,
}

impl ThriftRecord for TokenV3IssueResult {
    const NAME: &'static str = "TokenV3IssueResult";

    fn to_record(&self) -> Record {
        let mut record = Record::new()
            .with(1, self.access_token.as_str())
            .with_opt(2, self.refresh_token.as_deref())
            .with_opt(3, self.duration_until_refresh_secs);
        record.merge(self.extras.clone());
        record
    }

    fn from_record(record: Record) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(Self::NAME, record);
        Ok(Self {
            access_token: fields.req_string(1)?,
            refresh_token: fields.opt_string(2)?,
            duration_until_refresh_secs: fields.opt_i64(3)?,
            extras: fields.finish(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QrCodeLoginV2Response {
    pub certificate: Option<String>,
    pub access_token_v2: Option<String>,
    pub token_v3: Option<TokenV3IssueResult>,
    pub mid: Option<String>,
    pub extras: Record,
}

impl ThriftRecord for QrCodeLoginV2Response {
    const NAME: &'static str = "QrCodeLoginV2Response";

    fn to_record(&self) -> Record {
        let mut record = Record::new()
            .with_opt(1, self.certificate.as_deref())
            .with_opt(2, self.access_token_v2.as_deref())
            .with_opt(3, self.token_v3.as_ref().map(ThriftRecord::to_record))
            .with_opt(4, self.mid.as_deref());
        record.merge(self.extras.clone());
        record
    }

    fn from_record(record: Record) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(Self::NAME, record);
        let token_v3 = fields
            .opt_record(3)?
            .map(TokenV3IssueResult::from_record)
            .transpose()?;
        Ok(Self {
            certificate: fields.opt_string(1)?,
            access_token_v2: fields.opt_string(2)?,
            token_v3,
            mid: fields.opt_string(4)?,
            extras: fields.finish(),
        })
    }
}
