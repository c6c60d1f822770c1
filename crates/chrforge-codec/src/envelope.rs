//! Call / reply message framing.

use std::fmt;

use chrforge_core::errors::{DecodeError, EncodeError};
use chrforge_core::models::WireProtocol;

use crate::protocol::binary::{BinaryReader, BinaryWriter};
use crate::protocol::compact::{CompactReader, CompactWriter};
use crate::protocol::{read_record, write_record, ProtocolReader, ProtocolWriter};
use crate::value::{Record, WireValue};

/// Field id of the success value in a reply result record.
pub const RESULT_SUCCESS_FIELD: i16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Call,
    Reply,
    Exception,
    Oneway,
}

impl MessageType {
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Call => 1,
            Self::Reply => 2,
            Self::Exception => 3,
            Self::Oneway => 4,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Call),
            2 => Some(Self::Reply),
            3 => Some(Self::Exception),
            4 => Some(Self::Oneway),
            _ => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Call => "call",
            Self::Reply => "reply",
            Self::Exception => "exception",
            Self::Oneway => "oneway",
        };
        f.write_str(name)
    }
}

/// One framed message: header plus a record payload.
///
/// Calls carry the argument record, replies the result record
/// (field 0 = success, other ids = declared exceptions), exception
/// messages an application-exception record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub method: String,
    pub message_type: MessageType,
    pub sequence_id: i32,
    pub payload: Record,
}

impl Envelope {
    pub fn call(method: impl Into<String>, sequence_id: i32, args: Record) -> Self {
        Self {
            method: method.into(),
            message_type: MessageType::Call,
            sequence_id,
            payload: args,
        }
    }

    pub fn reply(method: impl Into<String>, sequence_id: i32, result: Record) -> Self {
        Self {
            method: method.into(),
            message_type: MessageType::Reply,
            sequence_id,
            payload: result,
        }
    }

    /// A successful reply carrying `value` in field 0.
    pub fn success(method: impl Into<String>, sequence_id: i32, value: impl Into<WireValue>) -> Self {
        Self::reply(
            method,
            sequence_id,
            Record::new().with(RESULT_SUCCESS_FIELD, value),
        )
    }

    pub fn exception(method: impl Into<String>, sequence_id: i32, error: Record) -> Self {
        Self {
            method: method.into(),
            message_type: MessageType::Exception,
            sequence_id,
            payload: error,
        }
    }

    pub fn encode(&self, protocol: WireProtocol) -> Result<Vec<u8>, EncodeError> {
        match protocol {
            WireProtocol::Compact => self.encode_with(CompactWriter::new()),
            WireProtocol::Binary => self.encode_with(BinaryWriter::new()),
        }
    }

    fn encode_with<W: ProtocolWriter>(&self, mut w: W) -> Result<Vec<u8>, EncodeError> {
        w.write_message_begin(&self.method, self.message_type, self.sequence_id)?;
        write_record(&mut w, &self.payload)?;
        Ok(w.into_bytes())
    }

    /// Decode a complete message. Bytes after the payload are an error.
    pub fn decode(bytes: &[u8], protocol: WireProtocol) -> Result<Self, DecodeError> {
        match protocol {
            WireProtocol::Compact => Self::decode_with(CompactReader::new(bytes), bytes.len()),
            WireProtocol::Binary => Self::decode_with(BinaryReader::new(bytes), bytes.len()),
        }
    }

    fn decode_with<R: ProtocolReader>(mut r: R, total: usize) -> Result<Self, DecodeError> {
        let header = r.read_message_begin()?;
        let payload = read_record(&mut r, 0)?;
        let trailing = total - r.position();
        if trailing > 0 {
            return Err(DecodeError::TrailingBytes { count: trailing });
        }
        Ok(Self {
            method: header.name,
            message_type: header.message_type,
            sequence_id: header.sequence_id,
            payload,
        })
    }
}
