//! Protocol reader/writer traits and the protocol-independent value walk.
//!
//! Each wire protocol only knows how to frame scalars, field headers and
//! container headers; [`write_value`] and [`read_value`] drive them over a
//! whole [`WireValue`] tree.

pub mod binary;
pub mod compact;

use chrforge_core::constants::{MAX_DECODE_DEPTH, MAX_STRING_LEN};
use chrforge_core::errors::{DecodeError, EncodeError};

use crate::envelope::MessageType;
use crate::value::{Record, TType, WireValue};

/// Upper bound on speculative container preallocation.
const MAX_PREALLOC: usize = 1024;

/// Message header as read off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub name: String,
    pub message_type: MessageType,
    pub sequence_id: i32,
}

pub trait ProtocolWriter {
    fn write_message_begin(
        &mut self,
        name: &str,
        message_type: MessageType,
        sequence_id: i32,
    ) -> Result<(), EncodeError>;
    fn write_struct_begin(&mut self);
    fn write_struct_end(&mut self);
    fn write_field_begin(&mut self, ttype: TType, id: i16);
    fn write_field_stop(&mut self);
    fn write_bool(&mut self, value: bool);
    fn write_byte(&mut self, value: i8);
    fn write_i16(&mut self, value: i16);
    fn write_i32(&mut self, value: i32);
    fn write_i64(&mut self, value: i64);
    fn write_double(&mut self, value: f64);
    fn write_binary(&mut self, value: &[u8]) -> Result<(), EncodeError>;
    fn write_list_begin(&mut self, elem: TType, size: usize) -> Result<(), EncodeError>;
    fn write_set_begin(&mut self, elem: TType, size: usize) -> Result<(), EncodeError>;
    fn write_map_begin(&mut self, key: TType, value: TType, size: usize) -> Result<(), EncodeError>;
    /// Standalone type tag preceding a top-level value.
    fn write_type_tag(&mut self, ttype: TType);
    fn into_bytes(self) -> Vec<u8>;
}

pub trait ProtocolReader {
    /// Bytes consumed so far.
    fn position(&self) -> usize;
    fn read_message_begin(&mut self) -> Result<MessageHeader, DecodeError>;
    fn read_struct_begin(&mut self);
    fn read_struct_end(&mut self);
    /// Next field header, or `None` at the stop marker.
    fn read_field_begin(&mut self) -> Result<Option<(TType, i16)>, DecodeError>;
    fn read_bool(&mut self) -> Result<bool, DecodeError>;
    fn read_byte(&mut self) -> Result<i8, DecodeError>;
    fn read_i16(&mut self) -> Result<i16, DecodeError>;
    fn read_i32(&mut self) -> Result<i32, DecodeError>;
    fn read_i64(&mut self) -> Result<i64, DecodeError>;
    fn read_double(&mut self) -> Result<f64, DecodeError>;
    fn read_binary(&mut self) -> Result<Vec<u8>, DecodeError>;
    fn read_list_begin(&mut self) -> Result<(TType, usize), DecodeError>;
    fn read_set_begin(&mut self) -> Result<(TType, usize), DecodeError>;
    fn read_map_begin(&mut self) -> Result<(TType, TType, usize), DecodeError>;
    fn read_type_tag(&mut self) -> Result<TType, DecodeError>;
}

/// Write a value's payload (no leading tag).
pub fn write_value<W: ProtocolWriter>(w: &mut W, value: &WireValue) -> Result<(), EncodeError> {
    match value {
        WireValue::Bool(v) => w.write_bool(*v),
        WireValue::I8(v) => w.write_byte(*v),
        WireValue::I16(v) => w.write_i16(*v),
        WireValue::I32(v) => w.write_i32(*v),
        WireValue::I64(v) => w.write_i64(*v),
        WireValue::Double(v) => w.write_double(*v),
        WireValue::Binary(v) => w.write_binary(v)?,
        WireValue::String(v) => w.write_binary(v.as_bytes())?,
        WireValue::List(items) => {
            let elem = element_type("list", items.iter())?;
            w.write_list_begin(elem, items.len())?;
            for item in items {
                write_value(w, item)?;
            }
        }
        WireValue::Set(items) => {
            let elem = element_type("set", items.iter())?;
            w.write_set_begin(elem, items.len())?;
            for item in items {
                write_value(w, item)?;
            }
        }
        WireValue::Map(entries) => {
            let key = element_type("map key", entries.iter().map(|(k, _)| k))?;
            let val = element_type("map value", entries.iter().map(|(_, v)| v))?;
            w.write_map_begin(key, val, entries.len())?;
            for (k, v) in entries {
                write_value(w, k)?;
                write_value(w, v)?;
            }
        }
        WireValue::Struct(record) => write_record(w, record)?,
    }
    Ok(())
}

pub fn write_record<W: ProtocolWriter>(w: &mut W, record: &Record) -> Result<(), EncodeError> {
    w.write_struct_begin();
    for (id, value) in record.iter() {
        w.write_field_begin(value.ttype(), id);
        write_value(w, value)?;
    }
    w.write_field_stop();
    w.write_struct_end();
    Ok(())
}

/// Element type of a homogeneous container. Empty containers get `Byte`.
fn element_type<'a>(
    container: &'static str,
    mut items: impl Iterator<Item = &'a WireValue>,
) -> Result<TType, EncodeError> {
    let Some(first) = items.next() else {
        return Ok(TType::Byte);
    };
    let expected = first.ttype();
    for item in items {
        let actual = item.ttype();
        if actual != expected {
            return Err(EncodeError::MixedElementTypes {
                container,
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
    }
    Ok(expected)
}

/// Read a value's payload of a known type. `depth` is the current nesting.
pub fn read_value<R: ProtocolReader>(
    r: &mut R,
    ttype: TType,
    depth: usize,
) -> Result<WireValue, DecodeError> {
    let value = match ttype {
        TType::Bool => WireValue::Bool(r.read_bool()?),
        TType::Byte => WireValue::I8(r.read_byte()?),
        TType::I16 => WireValue::I16(r.read_i16()?),
        TType::I32 => WireValue::I32(r.read_i32()?),
        TType::I64 => WireValue::I64(r.read_i64()?),
        TType::Double => WireValue::Double(r.read_double()?),
        TType::String => match String::from_utf8(r.read_binary()?) {
            Ok(s) => WireValue::String(s),
            Err(e) => WireValue::Binary(e.into_bytes()),
        },
        TType::List => {
            let depth = enter(depth)?;
            let (elem, size) = r.read_list_begin()?;
            WireValue::List(read_elements(r, elem, size, depth)?)
        }
        TType::Set => {
            let depth = enter(depth)?;
            let (elem, size) = r.read_set_begin()?;
            WireValue::Set(read_elements(r, elem, size, depth)?)
        }
        TType::Map => {
            let depth = enter(depth)?;
            let (key, val, size) = r.read_map_begin()?;
            let mut entries = Vec::with_capacity(size.min(MAX_PREALLOC));
            for _ in 0..size {
                let k = read_value(r, key, depth)?;
                let v = read_value(r, val, depth)?;
                entries.push((k, v));
            }
            WireValue::Map(entries)
        }
        TType::Struct => WireValue::Struct(read_record(r, depth)?),
    };
    Ok(value)
}

fn read_elements<R: ProtocolReader>(
    r: &mut R,
    elem: TType,
    size: usize,
    depth: usize,
) -> Result<Vec<WireValue>, DecodeError> {
    let mut items = Vec::with_capacity(size.min(MAX_PREALLOC));
    for _ in 0..size {
        items.push(read_value(r, elem, depth)?);
    }
    Ok(items)
}

/// Read a struct body. Unknown field ids are kept, never rejected.
pub fn read_record<R: ProtocolReader>(r: &mut R, depth: usize) -> Result<Record, DecodeError> {
    let depth = enter(depth)?;
    r.read_struct_begin();
    let mut record = Record::new();
    while let Some((ttype, id)) = r.read_field_begin()? {
        let value = read_value(r, ttype, depth)?;
        record.push_raw(id, value);
    }
    r.read_struct_end();
    Ok(record)
}

fn enter(depth: usize) -> Result<usize, DecodeError> {
    let next = depth + 1;
    if next > MAX_DECODE_DEPTH {
        return Err(DecodeError::DepthExceeded {
            max: MAX_DECODE_DEPTH,
        });
    }
    Ok(next)
}

/// Bounds-checked cursor over an input buffer, shared by both readers.
#[derive(Debug)]
pub(crate) struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::UnexpectedEof {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub(crate) fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take_array::<1>()?[0])
    }

    /// Validate a declared length (bytes or element count) against the
    /// remaining input. Every element occupies at least one byte.
    pub(crate) fn check_len(&self, offset: usize, declared: i64) -> Result<usize, DecodeError> {
        if declared < 0 {
            return Err(DecodeError::NegativeLength {
                offset,
                length: declared,
            });
        }
        let declared = usize::try_from(declared).unwrap_or(usize::MAX);
        if declared > self.remaining() || declared > MAX_STRING_LEN {
            return Err(DecodeError::LengthExceedsBuffer {
                offset,
                declared,
                remaining: self.remaining(),
            });
        }
        Ok(declared)
    }
}

/// Usize length to the i32 the wire carries.
pub(crate) fn wire_len(what: &'static str, len: usize) -> Result<i32, EncodeError> {
    i32::try_from(len).map_err(|_| EncodeError::LengthOverflow { what, len })
}
