//! The recursive value model shared by both wire protocols.

use std::fmt;

/// Logical wire type of a value, independent of protocol.
///
/// Binary and text strings share [`TType::String`]; the wire does not
/// distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TType {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    List,
    Set,
    Map,
    Struct,
}

impl TType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Double => "double",
            Self::String => "string",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
            Self::Struct => "struct",
        }
    }
}

impl fmt::Display for TType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded or to-be-encoded wire value.
///
/// Containers do not carry element types: the encoder derives them from the
/// elements and rejects heterogeneous containers. Empty containers are
/// written with a placeholder element type.
#[derive(Debug, Clone)]
pub enum WireValue {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    Binary(Vec<u8>),
    String(String),
    List(Vec<WireValue>),
    Set(Vec<WireValue>),
    Map(Vec<(WireValue, WireValue)>),
    Struct(Record),
}

impl WireValue {
    pub fn ttype(&self) -> TType {
        match self {
            Self::Bool(_) => TType::Bool,
            Self::I8(_) => TType::Byte,
            Self::I16(_) => TType::I16,
            Self::I32(_) => TType::I32,
            Self::I64(_) => TType::I64,
            Self::Double(_) => TType::Double,
            Self::Binary(_) | Self::String(_) => TType::String,
            Self::List(_) => TType::List,
            Self::Set(_) => TType::Set,
            Self::Map(_) => TType::Map,
            Self::Struct(_) => TType::Struct,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer width, widened to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integer width that fits in an i32.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|v| i32::try_from(v).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view of a string value. Binary values qualify if valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Binary(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::String(s) => Some(s.as_bytes()),
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Struct(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Struct(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[WireValue]> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(WireValue, WireValue)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

// String and Binary compare by bytes since the wire cannot tell them apart;
// doubles compare by bit pattern so NaN round-trips equal.
impl PartialEq for WireValue {
    fn eq(&self, other: &Self) -> bool {
        use WireValue::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a == b,
            (I8(a), I8(b)) => a == b,
            (I16(a), I16(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (Binary(_) | String(_), Binary(_) | String(_)) => self.as_bytes() == other.as_bytes(),
            (List(a), List(b)) | (Set(a), Set(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Struct(a), Struct(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for WireValue {}

impl From<bool> for WireValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for WireValue {
    fn from(v: i8) -> Self {
        Self::I8(v)
    }
}

impl From<i16> for WireValue {
    fn from(v: i16) -> Self {
        Self::I16(v)
    }
}

impl From<i32> for WireValue {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<i64> for WireValue {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<f64> for WireValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for WireValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for WireValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for WireValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(v)
    }
}

impl From<Record> for WireValue {
    fn from(v: Record) -> Self {
        Self::Struct(v)
    }
}

/// A structured record: field id → value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(i16, WireValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, id: i16, value: impl Into<WireValue>) -> Self {
        self.insert(id, value);
        self
    }

    /// Builder-style insert that skips `None`.
    pub fn with_opt<V: Into<WireValue>>(mut self, id: i16, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(id, value);
        }
        self
    }

    /// Insert a field. Replacing an existing id keeps its position.
    pub fn insert(&mut self, id: i16, value: impl Into<WireValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(fid, _)| *fid == id) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((id, value)),
        }
    }

    /// Append a field exactly as decoded, duplicates included.
    pub(crate) fn push_raw(&mut self, id: i16, value: WireValue) {
        self.fields.push((id, value));
    }

    pub fn get(&self, id: i16) -> Option<&WireValue> {
        self.fields.iter().find(|(fid, _)| *fid == id).map(|(_, v)| v)
    }

    pub fn remove(&mut self, id: i16) -> Option<WireValue> {
        let idx = self.fields.iter().position(|(fid, _)| *fid == id)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn contains(&self, id: i16) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i16, &WireValue)> {
        self.fields.iter().map(|(id, v)| (*id, v))
    }

    pub fn ids(&self) -> impl Iterator<Item = i16> + '_ {
        self.fields.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append every field of `other`, replacing ids already present.
    pub fn merge(&mut self, other: Record) {
        for (id, value) in other.fields {
            self.insert(id, value);
        }
    }
}

impl FromIterator<(i16, WireValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (i16, WireValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (id, value) in iter {
            record.insert(id, value);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (i16, WireValue);
    type IntoIter = std::vec::IntoIter<(i16, WireValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
