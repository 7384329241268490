use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of attribute kinds.
///
/// The discriminant of each variant is its wire tag: the single byte written
/// after an attribute name in a payload's data frame. Tags are stable and
/// must never be renumbered; decoders written against old payloads rely on
/// them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AttributeKind {
    I8 = 0,
    I16 = 1,
    I32 = 2,
    I64 = 3,
    U8 = 4,
    U16 = 5,
    U32 = 6,
    U64 = 7,
    String = 8,
    Boolean = 9,
    Float = 10,
    Double = 11,
    /// A 32-bit row id pointing into another table.
    Reference = 12,
}

impl AttributeKind {
    /// Every kind, in tag order.
    pub const ALL: [AttributeKind; 13] = [
        AttributeKind::I8,
        AttributeKind::I16,
        AttributeKind::I32,
        AttributeKind::I64,
        AttributeKind::U8,
        AttributeKind::U16,
        AttributeKind::U32,
        AttributeKind::U64,
        AttributeKind::String,
        AttributeKind::Boolean,
        AttributeKind::Float,
        AttributeKind::Double,
        AttributeKind::Reference,
    ];

    /// The wire tag byte for this kind.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Looks up a kind by wire tag. Returns `None` for tags outside `0..=12`.
    pub const fn from_tag(tag: u8) -> Option<AttributeKind> {
        Some(match tag {
            0 => AttributeKind::I8,
            1 => AttributeKind::I16,
            2 => AttributeKind::I32,
            3 => AttributeKind::I64,
            4 => AttributeKind::U8,
            5 => AttributeKind::U16,
            6 => AttributeKind::U32,
            7 => AttributeKind::U64,
            8 => AttributeKind::String,
            9 => AttributeKind::Boolean,
            10 => AttributeKind::Float,
            11 => AttributeKind::Double,
            12 => AttributeKind::Reference,
            _ => return None,
        })
    }

    /// Encoded width in bytes, or `None` for [`AttributeKind::String`],
    /// whose encoding is length-prefixed and variable.
    ///
    /// Booleans occupy one byte. References are 32-bit row ids and occupy
    /// four.
    pub const fn fixed_width(self) -> Option<usize> {
        Some(match self {
            AttributeKind::I8 | AttributeKind::U8 | AttributeKind::Boolean => 1,
            AttributeKind::I16 | AttributeKind::U16 => 2,
            AttributeKind::I32
            | AttributeKind::U32
            | AttributeKind::Float
            | AttributeKind::Reference => 4,
            AttributeKind::I64 | AttributeKind::U64 | AttributeKind::Double => 8,
            AttributeKind::String => return None,
        })
    }

    /// The short name used in scripts and diagnostics (`u32`, `bool`, `ref`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            AttributeKind::I8 => "i8",
            AttributeKind::I16 => "i16",
            AttributeKind::I32 => "i32",
            AttributeKind::I64 => "i64",
            AttributeKind::U8 => "u8",
            AttributeKind::U16 => "u16",
            AttributeKind::U32 => "u32",
            AttributeKind::U64 => "u64",
            AttributeKind::String => "string",
            AttributeKind::Boolean => "bool",
            AttributeKind::Float => "float",
            AttributeKind::Double => "double",
            AttributeKind::Reference => "ref",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing a kind name that is not in the closed set.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown attribute kind `{0}`")]
pub struct UnknownKindName(pub String);

impl FromStr for AttributeKind {
    type Err = UnknownKindName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "i8" => AttributeKind::I8,
            "i16" => AttributeKind::I16,
            "i32" => AttributeKind::I32,
            "i64" => AttributeKind::I64,
            "u8" => AttributeKind::U8,
            "u16" => AttributeKind::U16,
            "u32" => AttributeKind::U32,
            "u64" => AttributeKind::U64,
            "string" => AttributeKind::String,
            "bool" | "boolean" => AttributeKind::Boolean,
            "float" => AttributeKind::Float,
            "double" => AttributeKind::Double,
            "ref" | "reference" => AttributeKind::Reference,
            other => return Err(UnknownKindName(other.to_string())),
        })
    }
}
