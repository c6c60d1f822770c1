//! # chrforge-codec
//!
//! Wire codecs for the chrforge protocol client.
//!
//! - [`WireValue`] / [`Record`]: the recursive value model.
//! - [`protocol::compact`] and [`protocol::binary`]: the two Thrift wire
//!   protocols the backend speaks.
//! - [`Envelope`]: call / reply message framing.
//! - [`records`]: typed views over well-known records, keeping unknown
//!   fields in an `extras` bag.
//!
//! The free [`encode`] and [`decode`] functions use the compact protocol.

pub mod envelope;
pub mod protocol;
pub mod records;
pub mod value;

pub use envelope::{Envelope, MessageType};
pub use protocol::{binary, compact};
pub use records::ThriftRecord;
pub use value::{Record, TType, WireValue};

use chrforge_core::errors::{DecodeError, EncodeError};

/// Encode a single tagged value with the compact protocol.
pub fn encode(value: &WireValue) -> Result<Vec<u8>, EncodeError> {
    compact::encode(value)
}

/// Decode a single tagged value with the compact protocol.
///
/// Returns the value and the number of bytes consumed.
pub fn decode(bytes: &[u8]) -> Result<(WireValue, usize), DecodeError> {
    compact::decode(bytes)
}
