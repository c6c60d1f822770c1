//! Thrift compact protocol (protocol type 4).
//!
//! Varint + zigzag integers, delta-encoded field headers, booleans folded
//! into field headers, little-endian doubles.

use chrforge_core::errors::{DecodeError, EncodeError};

use super::{read_value, wire_len, write_value, ByteCursor, MessageHeader, ProtocolReader, ProtocolWriter};
use crate::envelope::MessageType;
use crate::value::{TType, WireValue};

pub const PROTOCOL_ID: u8 = 0x82;
pub const VERSION: u8 = 1;
const VERSION_MASK: u8 = 0x1f;
const TYPE_SHIFT: u8 = 5;

const STOP: u8 = 0x00;
const BOOL_TRUE: u8 = 0x01;
const BOOL_FALSE: u8 = 0x02;
const BYTE: u8 = 0x03;
const I16: u8 = 0x04;
const I32: u8 = 0x05;
const I64: u8 = 0x06;
const DOUBLE: u8 = 0x07;
const BINARY: u8 = 0x08;
const LIST: u8 = 0x09;
const SET: u8 = 0x0a;
const MAP: u8 = 0x0b;
const STRUCT: u8 = 0x0c;

const MAX_VARINT32_BYTES: usize = 5;
const MAX_VARINT64_BYTES: usize = 10;

fn type_id(ttype: TType) -> u8 {
    match ttype {
        TType::Bool => BOOL_TRUE,
        TType::Byte => BYTE,
        TType::I16 => I16,
        TType::I32 => I32,
        TType::I64 => I64,
        TType::Double => DOUBLE,
        TType::String => BINARY,
        TType::List => LIST,
        TType::Set => SET,
        TType::Map => MAP,
        TType::Struct => STRUCT,
    }
}

fn ttype_of(id: u8) -> Option<TType> {
    Some(match id {
        BOOL_TRUE | BOOL_FALSE => TType::Bool,
        BYTE => TType::Byte,
        I16 => TType::I16,
        I32 => TType::I32,
        I64 => TType::I64,
        DOUBLE => TType::Double,
        BINARY => TType::String,
        LIST => TType::List,
        SET => TType::Set,
        MAP => TType::Map,
        STRUCT => TType::Struct,
        _ => return None,
    })
}

fn zigzag32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

fn zigzag64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

fn unzigzag32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

fn unzigzag64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

#[derive(Debug, Default)]
pub struct CompactWriter {
    buf: Vec<u8>,
    last_field_id: i16,
    field_stack: Vec<i16>,
    pending_bool_field: Option<i16>,
}

impl CompactWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_varint(&mut self, mut n: u64) {
        while n >= 0x80 {
            self.buf.push((n as u8) | 0x80);
            n >>= 7;
        }
        self.buf.push(n as u8);
    }

    fn write_field_header(&mut self, type_id: u8, id: i16) {
        let delta = i32::from(id) - i32::from(self.last_field_id);
        if (1..=15).contains(&delta) {
            self.buf.push(((delta as u8) << 4) | type_id);
        } else {
            self.buf.push(type_id);
            self.write_varint(u64::from(zigzag32(i32::from(id))));
        }
        self.last_field_id = id;
    }

    fn write_collection_begin(&mut self, elem: TType, size: usize) -> Result<(), EncodeError> {
        let size = wire_len("collection", size)?;
        if size < 15 {
            self.buf.push(((size as u8) << 4) | type_id(elem));
        } else {
            self.buf.push(0xf0 | type_id(elem));
            self.write_varint(size as u64);
        }
        Ok(())
    }
}

impl ProtocolWriter for CompactWriter {
    fn write_message_begin(
        &mut self,
        name: &str,
        message_type: MessageType,
        sequence_id: i32,
    ) -> Result<(), EncodeError> {
        self.buf.push(PROTOCOL_ID);
        self.buf.push((VERSION & VERSION_MASK) | (message_type.as_u8() << TYPE_SHIFT));
        self.write_varint(u64::from(sequence_id as u32));
        self.write_binary(name.as_bytes())
    }

    fn write_struct_begin(&mut self) {
        self.field_stack.push(self.last_field_id);
        self.last_field_id = 0;
    }

    fn write_struct_end(&mut self) {
        self.last_field_id = self.field_stack.pop().unwrap_or(0);
    }

    fn write_field_begin(&mut self, ttype: TType, id: i16) {
        if ttype == TType::Bool {
            // The header carries the value; emitted by write_bool.
            self.pending_bool_field = Some(id);
        } else {
            self.write_field_header(type_id(ttype), id);
        }
    }

    fn write_field_stop(&mut self) {
        self.buf.push(STOP);
    }

    fn write_bool(&mut self, value: bool) {
        let id = if value { BOOL_TRUE } else { BOOL_FALSE };
        match self.pending_bool_field.take() {
            Some(field) => self.write_field_header(id, field),
            None => self.buf.push(id),
        }
    }

    fn write_byte(&mut self, value: i8) {
        self.buf.push(value as u8);
    }

    fn write_i16(&mut self, value: i16) {
        self.write_varint(u64::from(zigzag32(i32::from(value))));
    }

    fn write_i32(&mut self, value: i32) {
        self.write_varint(u64::from(zigzag32(value)));
    }

    fn write_i64(&mut self, value: i64) {
        self.write_varint(zigzag64(value));
    }

    fn write_double(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<(), EncodeError> {
        let len = wire_len("binary", value.len())?;
        self.write_varint(len as u64);
        self.buf.extend_from_slice(value);
        Ok(())
    }

    fn write_list_begin(&mut self, elem: TType, size: usize) -> Result<(), EncodeError> {
        self.write_collection_begin(elem, size)
    }

    fn write_set_begin(&mut self, elem: TType, size: usize) -> Result<(), EncodeError> {
        self.write_collection_begin(elem, size)
    }

    fn write_map_begin(&mut self, key: TType, value: TType, size: usize) -> Result<(), EncodeError> {
        let size = wire_len("map", size)?;
        self.write_varint(size as u64);
        if size > 0 {
            self.buf.push((type_id(key) << 4) | type_id(value));
        }
        Ok(())
    }

    fn write_type_tag(&mut self, ttype: TType) {
        self.buf.push(type_id(ttype));
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug)]
pub struct CompactReader<'a> {
    cursor: ByteCursor<'a>,
    last_field_id: i16,
    field_stack: Vec<i16>,
    pending_bool: Option<bool>,
}

impl<'a> CompactReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(buf),
            last_field_id: 0,
            field_stack: Vec::new(),
            pending_bool: None,
        }
    }

    fn read_varint(&mut self, max_bytes: usize) -> Result<u64, DecodeError> {
        let start = self.cursor.position();
        let mut result: u64 = 0;
        for i in 0..max_bytes {
            let byte = self.cursor.read_u8()?;
            result |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(DecodeError::VarintOverflow {
            offset: start,
            max_bytes,
        })
    }

    fn read_varint32(&mut self) -> Result<u32, DecodeError> {
        Ok(self.read_varint(MAX_VARINT32_BYTES)? as u32)
    }

    fn read_element_type(&mut self, nibble: u8, offset: usize, size: usize) -> Result<TType, DecodeError> {
        match ttype_of(nibble) {
            Some(t) => Ok(t),
            // The element type of an empty container is never consulted.
            None if size == 0 => Ok(TType::Byte),
            None => Err(DecodeError::UnknownTypeTag { offset, tag: nibble }),
        }
    }

    fn read_collection_begin(&mut self) -> Result<(TType, usize), DecodeError> {
        let offset = self.cursor.position();
        let header = self.cursor.read_u8()?;
        let short = header >> 4;
        let size = if short == 0x0f {
            i64::from(self.read_varint32()?)
        } else {
            i64::from(short)
        };
        let size = self.cursor.check_len(offset, size)?;
        let elem = self.read_element_type(header & 0x0f, offset, size)?;
        Ok((elem, size))
    }
}

impl ProtocolReader for CompactReader<'_> {
    fn position(&self) -> usize {
        self.cursor.position()
    }

    fn read_message_begin(&mut self) -> Result<MessageHeader, DecodeError> {
        let protocol_id = self.cursor.read_u8()?;
        if protocol_id != PROTOCOL_ID {
            return Err(DecodeError::BadProtocolId {
                expected: PROTOCOL_ID,
                actual: protocol_id,
            });
        }
        let version_and_type = self.cursor.read_u8()?;
        let version = version_and_type & VERSION_MASK;
        if version != VERSION {
            return Err(DecodeError::BadVersion {
                expected: u32::from(VERSION),
                actual: u32::from(version),
            });
        }
        let raw_type = (version_and_type >> TYPE_SHIFT) & 0x07;
        let message_type =
            MessageType::from_u8(raw_type).ok_or(DecodeError::InvalidMessageType { value: raw_type })?;
        let sequence_id = self.read_varint32()? as i32;
        let name_offset = self.cursor.position();
        let name = String::from_utf8(self.read_binary()?)
            .map_err(|_| DecodeError::InvalidMethodName { offset: name_offset })?;
        Ok(MessageHeader {
            name,
            message_type,
            sequence_id,
        })
    }

    fn read_struct_begin(&mut self) {
        self.field_stack.push(self.last_field_id);
        self.last_field_id = 0;
    }

    fn read_struct_end(&mut self) {
        self.last_field_id = self.field_stack.pop().unwrap_or(0);
    }

    fn read_field_begin(&mut self) -> Result<Option<(TType, i16)>, DecodeError> {
        let offset = self.cursor.position();
        let header = self.cursor.read_u8()?;
        if header == STOP {
            return Ok(None);
        }
        let type_nibble = header & 0x0f;
        let ttype = ttype_of(type_nibble).ok_or(DecodeError::UnknownTypeTag {
            offset,
            tag: type_nibble,
        })?;
        let delta = header >> 4;
        let id = if delta == 0 {
            unzigzag32(self.read_varint32()?) as i16
        } else {
            self.last_field_id.wrapping_add(i16::from(delta))
        };
        self.last_field_id = id;
        if ttype == TType::Bool {
            self.pending_bool = Some(type_nibble == BOOL_TRUE);
        }
        Ok(Some((ttype, id)))
    }

    fn read_bool(&mut self) -> Result<bool, DecodeError> {
        if let Some(value) = self.pending_bool.take() {
            return Ok(value);
        }
        let offset = self.cursor.position();
        match self.cursor.read_u8()? {
            BOOL_TRUE => Ok(true),
            BOOL_FALSE | 0 => Ok(false),
            byte => Err(DecodeError::InvalidBool { offset, byte }),
        }
    }

    fn read_byte(&mut self) -> Result<i8, DecodeError> {
        Ok(self.cursor.read_u8()? as i8)
    }

    fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(unzigzag32(self.read_varint32()?) as i16)
    }

    fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(unzigzag32(self.read_varint32()?))
    }

    fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(unzigzag64(self.read_varint(MAX_VARINT64_BYTES)?))
    }

    fn read_double(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_le_bytes(self.cursor.take_array::<8>()?))
    }

    fn read_binary(&mut self) -> Result<Vec<u8>, DecodeError> {
        let offset = self.cursor.position();
        let len = i64::from(self.read_varint32()?);
        let len = self.cursor.check_len(offset, len)?;
        Ok(self.cursor.take(len)?.to_vec())
    }

    fn read_list_begin(&mut self) -> Result<(TType, usize), DecodeError> {
        self.read_collection_begin()
    }

    fn read_set_begin(&mut self) -> Result<(TType, usize), DecodeError> {
        self.read_collection_begin()
    }

    fn read_map_begin(&mut self) -> Result<(TType, TType, usize), DecodeError> {
        let offset = self.cursor.position();
        let size = i64::from(self.read_varint32()?);
        let size = self.cursor.check_len(offset, size)?;
        if size == 0 {
            return Ok((TType::Byte, TType::Byte, 0));
        }
        let types_offset = self.cursor.position();
        let types = self.cursor.read_u8()?;
        let key = self.read_element_type(types >> 4, types_offset, size)?;
        let value = self.read_element_type(types & 0x0f, types_offset, size)?;
        Ok((key, value, size))
    }

    fn read_type_tag(&mut self) -> Result<TType, DecodeError> {
        let offset = self.cursor.position();
        let tag = self.cursor.read_u8()?;
        ttype_of(tag).ok_or(DecodeError::UnknownTypeTag { offset, tag })
    }
}

/// Encode a single value, preceded by its compact type tag.
pub fn encode(value: &WireValue) -> Result<Vec<u8>, EncodeError> {
    let mut w = CompactWriter::new();
    w.write_type_tag(value.ttype());
    write_value(&mut w, value)?;
    Ok(w.into_bytes())
}

/// Decode a single tagged value; returns it with the bytes consumed.
pub fn decode(bytes: &[u8]) -> Result<(WireValue, usize), DecodeError> {
    let mut r = CompactReader::new(bytes);
    let ttype = r.read_type_tag()?;
    let value = read_value(&mut r, ttype, 0)?;
    Ok((value, r.position()))
}
