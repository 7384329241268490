use std::fmt;
use std::str::FromStr;

use tabula_model::{Attribute, AttributeKind};
use thiserror::Error;

/// Which frame an `open`/`close` instruction targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Payload,
    Table,
    Data,
    Reference,
}

impl FrameKind {
    pub const fn name(self) -> &'static str {
        match self {
            FrameKind::Payload => "payload",
            FrameKind::Table => "table",
            FrameKind::Data => "data",
            FrameKind::Reference => "ref",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing a frame name that is not in the closed set.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown frame `{0}`, expected payload, table, data or ref")]
pub struct UnknownFrameName(pub String);

impl FromStr for FrameKind {
    type Err = UnknownFrameName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "payload" => FrameKind::Payload,
            "table" => FrameKind::Table,
            "data" => FrameKind::Data,
            "ref" | "reference" => FrameKind::Reference,
            other => return Err(UnknownFrameName(other.to_string())),
        })
    }
}

/// One step of a run.
///
/// The sequence is linear: no labels, no jumps. `Display` renders the script
/// text form, so an instruction listing is itself a runnable script.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    CreateTable { name: String },
    CreateColumn { name: String, kind: AttributeKind },
    SelectTable { name: String },
    SelectColumn { name: String },
    /// Load every value of the selected column into the registers.
    Read,
    Append { value: Attribute },
    /// Resynchronize the selected column's count from its file size.
    LoadCount,
    /// Build the ascending permutation over the loaded values.
    Sort,
    /// Discard the loaded values and any ordering.
    Free,
    Open { frame: FrameKind },
    Close { frame: FrameKind },
    /// Append an attribute run for the loaded column to the payload.
    Send,
    /// Halt the run successfully; later instructions are discarded.
    End,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::CreateTable { name } => write!(f, "create table {name}"),
            Instruction::CreateColumn { name, kind } => write!(f, "create column {name} {kind}"),
            Instruction::SelectTable { name } => write!(f, "select table {name}"),
            Instruction::SelectColumn { name } => write!(f, "select column {name}"),
            Instruction::Read => f.write_str("read"),
            Instruction::Append { value } => {
                f.write_str("append ")?;
                write_literal(f, value)
            }
            Instruction::LoadCount => f.write_str("load count"),
            Instruction::Sort => f.write_str("sort"),
            Instruction::Free => f.write_str("free"),
            Instruction::Open { frame } => write!(f, "open {frame}"),
            Instruction::Close { frame } => write!(f, "close {frame}"),
            Instruction::Send => f.write_str("send"),
            Instruction::End => f.write_str("end"),
        }
    }
}

/// Script literal form of a value: booleans and strings are bare, everything
/// numeric carries its kind suffix so the listing parses back unambiguously.
fn write_literal(f: &mut fmt::Formatter<'_>, value: &Attribute) -> fmt::Result {
    match value {
        Attribute::Boolean(v) => write!(f, "{v}"),
        Attribute::String(v) => write!(f, "\"{v}\""),
        Attribute::I8(v) => write!(f, "{v}:i8"),
        Attribute::I16(v) => write!(f, "{v}:i16"),
        Attribute::I32(v) => write!(f, "{v}:i32"),
        Attribute::I64(v) => write!(f, "{v}:i64"),
        Attribute::U8(v) => write!(f, "{v}:u8"),
        Attribute::U16(v) => write!(f, "{v}:u16"),
        Attribute::U32(v) => write!(f, "{v}:u32"),
        Attribute::U64(v) => write!(f, "{v}:u64"),
        Attribute::Float(v) => write!(f, "{v}:float"),
        Attribute::Double(v) => write!(f, "{v}:double"),
        Attribute::Reference(v) => write!(f, "{v}:ref"),
    }
}
