/// Malformed or adversarial bytes encountered while decoding.
///
/// Decoding never panics; every failure mode is one of these variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected end of input at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("length prefix {declared} at offset {offset} exceeds remaining buffer of {remaining} bytes")]
    LengthExceedsBuffer {
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    #[error("negative length {length} at offset {offset}")]
    NegativeLength { offset: usize, length: i64 },

    #[error("unknown type tag 0x{tag:02x} at offset {offset}")]
    UnknownTypeTag { offset: usize, tag: u8 },

    #[error("nesting depth exceeds limit of {max}")]
    DepthExceeded { max: usize },

    #[error("varint at offset {offset} is longer than {max_bytes} bytes")]
    VarintOverflow { offset: usize, max_bytes: usize },

    #[error("invalid boolean byte 0x{byte:02x} at offset {offset}")]
    InvalidBool { offset: usize, byte: u8 },

    #[error("bad protocol id: expected 0x{expected:02x}, got 0x{actual:02x}")]
    BadProtocolId { expected: u8, actual: u8 },

    #[error("bad protocol version: expected {expected}, got {actual}")]
    BadVersion { expected: u32, actual: u32 },

    #[error("invalid message type {value}")]
    InvalidMessageType { value: u8 },

    #[error("method name at offset {offset} is not valid UTF-8")]
    InvalidMethodName { offset: usize },

    #[error("record {record} is missing required field {field}")]
    MissingField { record: String, field: i16 },

    #[error("record {record} field {field}: expected {expected}, got {actual}")]
    FieldTypeMismatch {
        record: String,
        field: i16,
        expected: String,
        actual: String,
    },

    #[error("{count} trailing bytes after complete value")]
    TrailingBytes { count: usize },
}
