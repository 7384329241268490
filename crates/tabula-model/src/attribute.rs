use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AttributeKind;

/// One typed scalar value.
///
/// The serde representation carries the kind's snake_case name alongside the
/// value, e.g. `{"kind": "u32", "value": 7}`, so payload dumps and CLI output
/// stay self-describing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Attribute {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    String(String),
    Boolean(bool),
    Float(f32),
    Double(f64),
    Reference(u32),
}

impl Attribute {
    /// The kind this value inhabits.
    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::I8(_) => AttributeKind::I8,
            Attribute::I16(_) => AttributeKind::I16,
            Attribute::I32(_) => AttributeKind::I32,
            Attribute::I64(_) => AttributeKind::I64,
            Attribute::U8(_) => AttributeKind::U8,
            Attribute::U16(_) => AttributeKind::U16,
            Attribute::U32(_) => AttributeKind::U32,
            Attribute::U64(_) => AttributeKind::U64,
            Attribute::String(_) => AttributeKind::String,
            Attribute::Boolean(_) => AttributeKind::Boolean,
            Attribute::Float(_) => AttributeKind::Float,
            Attribute::Double(_) => AttributeKind::Double,
            Attribute::Reference(_) => AttributeKind::Reference,
        }
    }

    /// Total order over attributes, used to build sort permutations.
    ///
    /// Within a kind: integers, booleans (`false < true`), references, and
    /// strings (lexicographic by byte) compare naturally; floats use IEEE 754
    /// `totalOrder` so NaN sorts deterministically. Values of different kinds
    /// order by wire tag, so a mixed sequence still sorts without panicking.
    pub fn compare(&self, other: &Attribute) -> Ordering {
        use Attribute::*;
        match (self, other) {
            (I8(a), I8(b)) => a.cmp(b),
            (I16(a), I16(b)) => a.cmp(b),
            (I32(a), I32(b)) => a.cmp(b),
            (I64(a), I64(b)) => a.cmp(b),
            (U8(a), U8(b)) => a.cmp(b),
            (U16(a), U16(b)) => a.cmp(b),
            (U32(a), U32(b)) => a.cmp(b),
            (U64(a), U64(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Double(a), Double(b)) => a.total_cmp(b),
            (Reference(a), Reference(b)) => a.cmp(b),
            _ => self.kind().tag().cmp(&other.kind().tag()),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::I8(v) => write!(f, "{v}: i8"),
            Attribute::I16(v) => write!(f, "{v}: i16"),
            Attribute::I32(v) => write!(f, "{v}: i32"),
            Attribute::I64(v) => write!(f, "{v}: i64"),
            Attribute::U8(v) => write!(f, "{v}: u8"),
            Attribute::U16(v) => write!(f, "{v}: u16"),
            Attribute::U32(v) => write!(f, "{v}: u32"),
            Attribute::U64(v) => write!(f, "{v}: u64"),
            Attribute::String(v) => write!(f, "{v}: string"),
            Attribute::Boolean(v) => write!(f, "{v}: bool"),
            Attribute::Float(v) => write!(f, "{v}: float"),
            Attribute::Double(v) => write!(f, "{v}: double"),
            Attribute::Reference(v) => write!(f, "{v}: ref"),
        }
    }
}

impl From<i8> for Attribute {
    fn from(v: i8) -> Self {
        Attribute::I8(v)
    }
}

impl From<i16> for Attribute {
    fn from(v: i16) -> Self {
        Attribute::I16(v)
    }
}

impl From<i32> for Attribute {
    fn from(v: i32) -> Self {
        Attribute::I32(v)
    }
}

impl From<i64> for Attribute {
    fn from(v: i64) -> Self {
        Attribute::I64(v)
    }
}

impl From<u8> for Attribute {
    fn from(v: u8) -> Self {
        Attribute::U8(v)
    }
}

impl From<u16> for Attribute {
    fn from(v: u16) -> Self {
        Attribute::U16(v)
    }
}

impl From<u32> for Attribute {
    fn from(v: u32) -> Self {
        Attribute::U32(v)
    }
}

impl From<u64> for Attribute {
    fn from(v: u64) -> Self {
        Attribute::U64(v)
    }
}

impl From<bool> for Attribute {
    fn from(v: bool) -> Self {
        Attribute::Boolean(v)
    }
}

impl From<f32> for Attribute {
    fn from(v: f32) -> Self {
        Attribute::Float(v)
    }
}

impl From<f64> for Attribute {
    fn from(v: f64) -> Self {
        Attribute::Double(v)
    }
}

impl From<String> for Attribute {
    fn from(v: String) -> Self {
        Attribute::String(v)
    }
}

impl From<&str> for Attribute {
    fn from(v: &str) -> Self {
        Attribute::String(v.to_string())
    }
}
