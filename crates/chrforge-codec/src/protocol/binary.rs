//! Thrift binary protocol (protocol type 3), strict message headers,
//! big-endian fixed-width integers.

use chrforge_core::errors::{DecodeError, EncodeError};

use super::{read_value, wire_len, write_value, ByteCursor, MessageHeader, ProtocolReader, ProtocolWriter};
use crate::envelope::MessageType;
use crate::value::{TType, WireValue};

pub const VERSION_1: u32 = 0x8001_0000;
const VERSION_MASK: u32 = 0xffff_0000;

const STOP: u8 = 0;
const BOOL: u8 = 2;
const BYTE: u8 = 3;
const DOUBLE: u8 = 4;
const I16: u8 = 6;
const I32: u8 = 8;
const I64: u8 = 10;
const STRING: u8 = 11;
const STRUCT: u8 = 12;
const MAP: u8 = 13;
const SET: u8 = 14;
const LIST: u8 = 15;

fn type_id(ttype: TType) -> u8 {
    match ttype {
        TType::Bool => BOOL,
        TType::Byte => BYTE,
        TType::I16 => I16,
        TType::I32 => I32,
        TType::I64 => I64,
        TType::Double => DOUBLE,
        TType::String => STRING,
        TType::List => LIST,
        TType::Set => SET,
        TType::Map => MAP,
        TType::Struct => STRUCT,
    }
}

fn ttype_of(id: u8) -> Option<TType> {
    Some(match id {
        BOOL => TType::Bool,
        BYTE => TType::Byte,
        I16 => TType::I16,
        I32 => TType::I32,
        I64 => TType::I64,
        DOUBLE => TType::Double,
        STRING => TType::String,
        LIST => TType::List,
        SET => TType::Set,
        MAP => TType::Map,
        STRUCT => TType::Struct,
        _ => return None,
    })
}

#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProtocolWriter for BinaryWriter {
    fn write_message_begin(
        &mut self,
        name: &str,
        message_type: MessageType,
        sequence_id: i32,
    ) -> Result<(), EncodeError> {
        let version = VERSION_1 | u32::from(message_type.as_u8());
        self.buf.extend_from_slice(&version.to_be_bytes());
        self.write_binary(name.as_bytes())?;
        self.write_i32(sequence_id);
        Ok(())
    }

    fn write_struct_begin(&mut self) {}

    fn write_struct_end(&mut self) {}

    fn write_field_begin(&mut self, ttype: TType, id: i16) {
        self.buf.push(type_id(ttype));
        self.write_i16(id);
    }

    fn write_field_stop(&mut self) {
        self.buf.push(STOP);
    }

    fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    fn write_byte(&mut self, value: i8) {
        self.buf.push(value as u8);
    }

    fn write_i16(&mut self, value: i16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn write_double(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_bits().to_be_bytes());
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<(), EncodeError> {
        self.write_i32(wire_len("binary", value.len())?);
        self.buf.extend_from_slice(value);
        Ok(())
    }

    fn write_list_begin(&mut self, elem: TType, size: usize) -> Result<(), EncodeError> {
        self.buf.push(type_id(elem));
        self.write_i32(wire_len("list", size)?);
        Ok(())
    }

    fn write_set_begin(&mut self, elem: TType, size: usize) -> Result<(), EncodeError> {
        self.buf.push(type_id(elem));
        self.write_i32(wire_len("set", size)?);
        Ok(())
    }

    fn write_map_begin(&mut self, key: TType, value: TType, size: usize) -> Result<(), EncodeError> {
        self.buf.push(type_id(key));
        self.buf.push(type_id(value));
        self.write_i32(wire_len("map", size)?);
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
pub struct BinaryReader<'a> {
    cursor: ByteCursor<'a>,
}

impl<'a> BinaryReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(buf),
        }
    }

    fn read_size(&mut self) -> Result<usize, DecodeError> {
        let offset = self.cursor.position();
        let size = self.read_i32()?;
        self.cursor.check_len(offset, i64::from(size))
    }

    fn read_name(&mut self) -> Result<String, DecodeError> {
        let offset = self.cursor.position();
        String::from_utf8(self.read_binary()?).map_err(|_| DecodeError::InvalidMethodName { offset })
    }

    fn message_type(raw: u8) -> Result<MessageType, DecodeError> {
        MessageType::from_u8(raw).ok_or(DecodeError::InvalidMessageType { value: raw })
    }
}

impl ProtocolReader for BinaryReader<'_> {
    fn position(&self) -> usize {
        self.cursor.position()
    }

    fn read_message_begin(&mut self) -> Result<MessageHeader, DecodeError> {
        let first = self.read_i32()?;
        if first < 0 {
            let version = (first as u32) & VERSION_MASK;
            if version != VERSION_1 {
                return Err(DecodeError::BadVersion {
                    expected: VERSION_1,
                    actual: version,
                });
            }
            let message_type = Self::message_type((first & 0xff) as u8)?;
            let name = self.read_name()?;
            let sequence_id = self.read_i32()?;
            Ok(MessageHeader {
                name,
                message_type,
                sequence_id,
            })
        } else {
            // Pre-versioned header: the first word is the name length.
            let offset = self.cursor.position() - 4;
            let len = self.cursor.check_len(offset, i64::from(first))?;
            let name = String::from_utf8(self.cursor.take(len)?.to_vec())
                .map_err(|_| DecodeError::InvalidMethodName { offset })?;
            let message_type = Self::message_type(self.cursor.read_u8()?)?;
            let sequence_id = self.read_i32()?;
            Ok(MessageHeader {
                name,
                message_type,
                sequence_id,
            })
        }
    }

    fn read_struct_begin(&mut self) {}

    fn read_struct_end(&mut self) {}

    fn read_field_begin(&mut self) -> Result<Option<(TType, i16)>, DecodeError> {
        let offset = self.cursor.position();
        let tag = self.cursor.read_u8()?;
        if tag == STOP {
            return Ok(None);
        }
        let ttype = ttype_of(tag).ok_or(DecodeError::UnknownTypeTag { offset, tag })?;
        let id = self.read_i16()?;
        Ok(Some((ttype, id)))
    }

    fn read_bool(&mut self) -> Result<bool, DecodeError> {
        let offset = self.cursor.position();
        match self.cursor.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(DecodeError::InvalidBool { offset, byte }),
        }
    }

    fn read_byte(&mut self) -> Result<i8, DecodeError> {
        Ok(self.cursor.read_u8()? as i8)
    }

    fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(i16::from_be_bytes(self.cursor.take_array::<2>()?))
    }

    fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.cursor.take_array::<4>()?))
    }

    fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_be_bytes(self.cursor.take_array::<8>()?))
    }

    fn read_double(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_bits(u64::from_be_bytes(self.cursor.take_array::<8>()?)))
    }

    fn read_binary(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_size()?;
        Ok(self.cursor.take(len)?.to_vec())
    }

    fn read_list_begin(&mut self) -> Result<(TType, usize), DecodeError> {
        let elem_offset = self.cursor.position();
        let raw = self.cursor.read_u8()?;
        let size = self.read_size()?;
        let elem = match ttype_of(raw) {
            Some(t) => t,
            None if size == 0 => TType::Byte,
            None => return Err(DecodeError::UnknownTypeTag { offset: elem_offset, tag: raw }),
        };
        Ok((elem, size))
    }

    fn read_set_begin(&mut self) -> Result<(TType, usize), DecodeError> {
        self.read_list_begin()
    }

    fn read_map_begin(&mut self) -> Result<(TType, TType, usize), DecodeError> {
        let types_offset = self.cursor.position();
        let [raw_key, raw_value] = self.cursor.take_array::<2>()?;
        let size = self.read_size()?;
        let resolve = |tag: u8, offset: usize| match ttype_of(tag) {
            Some(t) => Ok(t),
            None if size == 0 => Ok(TType::Byte),
            None => Err(DecodeError::UnknownTypeTag { offset, tag }),
        };
        let key = resolve(raw_key, types_offset)?;
        let value = resolve(raw_value, types_offset + 1)?;
        Ok((key, value, size))
    }

    fn read_type_tag(&mut self) -> Result<TType, DecodeError> {
        let offset = self.cursor.position();
        let tag = self.cursor.read_u8()?;
        ttype_of(tag).ok_or(DecodeError::UnknownTypeTag { offset, tag })
    }
}

/// Encode a single value, preceded by its binary type tag.
pub fn encode(value: &WireValue) -> Result<Vec<u8>, EncodeError> {
    let mut w = BinaryWriter::new();
    w.write_type_tag(value.ttype());
    write_value(&mut w, value)?;
    Ok(w.into_bytes())
}

/// Decode a single tagged value; returns it with the bytes consumed.
pub fn decode(bytes: &[u8]) -> Result<(WireValue, usize), DecodeError> {
    let mut r = BinaryReader::new(bytes);
    let ttype = r.read_type_tag()?;
    let value = read_value(&mut r, ttype, 0)?;
    Ok((value, r.position()))
}
