//! Text form of the instruction language: one instruction per line,
//! whitespace-separated words, blank lines skipped.
//!
//! ```text
//! create table people
//! create column age u8
//! append 31:u8
//! read
//! sort
//! open payload
//! open table
//! send
//! close table
//! close payload
//! end
//! ```
//!
//! Value literals: `true`/`false` are booleans, `"…"` is a string, a bare
//! number with exactly one `.` is a double, any other bare number is a u64.
//! A `:kind` suffix (`-3:i8`, `2.5:float`, `9:ref`) picks the kind
//! explicitly, which is the only way to reach the narrower integer kinds
//! from text. Errors carry the 1-based line number.

use std::num::{ParseFloatError, ParseIntError};

use tabula_engine::{FrameKind, Instruction};
use tabula_model::{Attribute, AttributeKind};
use thiserror::Error;

pub type ScriptResult<T> = Result<T, ScriptError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown instruction `{text}`")]
    UnknownInstruction { line: usize, text: String },
    #[error("line {line}: `{form}` expects `{usage}`")]
    Malformed {
        line: usize,
        form: &'static str,
        usage: &'static str,
    },
    #[error("line {line}: unknown attribute kind `{name}`")]
    UnknownKind { line: usize, name: String },
    #[error("line {line}: unknown frame `{name}`, expected payload, table, data or ref")]
    UnknownFrame { line: usize, name: String },
    #[error("line {line}: malformed literal `{literal}`: {reason}")]
    BadLiteral {
        line: usize,
        literal: String,
        reason: String,
    },
}

/// Parses a whole script into its instruction sequence.
pub fn parse_script(source: &str) -> ScriptResult<Vec<Instruction>> {
    let mut instructions = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        if let Some(instruction) = parse_line(raw, idx + 1)? {
            instructions.push(instruction);
        }
    }
    Ok(instructions)
}

fn parse_line(raw: &str, line: usize) -> ScriptResult<Option<Instruction>> {
    let words: Vec<&str> = raw.split_whitespace().collect();
    let Some(&head) = words.first() else {
        return Ok(None);
    };

    let malformed = |form: &'static str, usage: &'static str| ScriptError::Malformed {
        line,
        form,
        usage,
    };

    let instruction = match head {
        "create" => match words.get(1).copied() {
            Some("table") => match words.as_slice() {
                [_, _, name] => Instruction::CreateTable {
                    name: (*name).to_string(),
                },
                _ => return Err(malformed("create table", "create table <name>")),
            },
            Some("column") => match words.as_slice() {
                [_, _, name, kind] => Instruction::CreateColumn {
                    name: (*name).to_string(),
                    kind: parse_kind(kind, line)?,
                },
                _ => return Err(malformed("create column", "create column <name> <kind>")),
            },
            _ => return Err(malformed("create", "create table|column ...")),
        },
        "select" => match words.get(1).copied() {
            Some("table") => match words.as_slice() {
                [_, _, name] => Instruction::SelectTable {
                    name: (*name).to_string(),
                },
                _ => return Err(malformed("select table", "select table <name>")),
            },
            Some("column") => match words.as_slice() {
                [_, _, name] => Instruction::SelectColumn {
                    name: (*name).to_string(),
                },
                _ => return Err(malformed("select column", "select column <name>")),
            },
            _ => return Err(malformed("select", "select table|column <name>")),
        },
        "append" => {
            // Everything after the word is the literal, so quoted strings
            // may contain spaces.
            let rest = raw.trim_start();
            let rest = rest["append".len()..].trim();
            if rest.is_empty() {
                return Err(malformed("append", "append <literal>"));
            }
            Instruction::Append {
                value: parse_literal(rest, line)?,
            }
        }
        "load" => match words.as_slice() {
            [_, "count"] => Instruction::LoadCount,
            _ => return Err(malformed("load", "load count")),
        },
        "open" => match words.as_slice() {
            [_, frame] => Instruction::Open {
                frame: parse_frame(frame, line)?,
            },
            _ => return Err(malformed("open", "open payload|table|data|ref")),
        },
        "close" => match words.as_slice() {
            [_, frame] => Instruction::Close {
                frame: parse_frame(frame, line)?,
            },
            _ => return Err(malformed("close", "close payload|table|data|ref")),
        },
        "read" | "sort" | "free" | "send" | "end" => {
            if words.len() != 1 {
                return Err(match head {
                    "read" => malformed("read", "read"),
                    "sort" => malformed("sort", "sort"),
                    "free" => malformed("free", "free"),
                    "send" => malformed("send", "send"),
                    _ => malformed("end", "end"),
                });
            }
            match head {
                "read" => Instruction::Read,
                "sort" => Instruction::Sort,
                "free" => Instruction::Free,
                "send" => Instruction::Send,
                _ => Instruction::End,
            }
        }
        _ => {
            return Err(ScriptError::UnknownInstruction {
                line,
                text: head.to_string(),
            })
        }
    };
    Ok(Some(instruction))
}

fn parse_kind(name: &str, line: usize) -> ScriptResult<AttributeKind> {
    name.parse().map_err(|_| ScriptError::UnknownKind {
        line,
        name: name.to_string(),
    })
}

fn parse_frame(name: &str, line: usize) -> ScriptResult<FrameKind> {
    name.parse().map_err(|_| ScriptError::UnknownFrame {
        line,
        name: name.to_string(),
    })
}

fn parse_literal(text: &str, line: usize) -> ScriptResult<Attribute> {
    if text == "true" {
        return Ok(Attribute::Boolean(true));
    }
    if text == "false" {
        return Ok(Attribute::Boolean(false));
    }
    if let Some(inner) = quoted(text) {
        return Ok(Attribute::from(inner));
    }
    if let Some((value, kind)) = text.rsplit_once(':') {
        let kind = parse_kind(kind, line)?;
        return typed_literal(text, value, kind, line);
    }
    if text.matches('.').count() == 1 {
        return text
            .parse::<f64>()
            .map(Attribute::Double)
            .map_err(|e| bad_literal(text, line, e));
    }
    text.parse::<u64>()
        .map(Attribute::U64)
        .map_err(|e| bad_literal(text, line, e))
}

/// Parses the value part of a `<value>:<kind>` literal.
fn typed_literal(
    full: &str,
    value: &str,
    kind: AttributeKind,
    line: usize,
) -> ScriptResult<Attribute> {
    let int = |e: ParseIntError| bad_literal(full, line, e);
    let float = |e: ParseFloatError| bad_literal(full, line, e);
    Ok(match kind {
        AttributeKind::I8 => Attribute::I8(value.parse().map_err(int)?),
        AttributeKind::I16 => Attribute::I16(value.parse().map_err(int)?),
        AttributeKind::I32 => Attribute::I32(value.parse().map_err(int)?),
        AttributeKind::I64 => Attribute::I64(value.parse().map_err(int)?),
        AttributeKind::U8 => Attribute::U8(value.parse().map_err(int)?),
        AttributeKind::U16 => Attribute::U16(value.parse().map_err(int)?),
        AttributeKind::U32 => Attribute::U32(value.parse().map_err(int)?),
        AttributeKind::U64 => Attribute::U64(value.parse().map_err(int)?),
        AttributeKind::Float => Attribute::Float(value.parse().map_err(float)?),
        AttributeKind::Double => Attribute::Double(value.parse().map_err(float)?),
        AttributeKind::Reference => Attribute::Reference(value.parse().map_err(int)?),
        AttributeKind::Boolean => {
            Attribute::Boolean(value.parse().map_err(|e: std::str::ParseBoolError| {
                bad_literal(full, line, e)
            })?)
        }
        AttributeKind::String => Attribute::from(quoted(value).unwrap_or(value)),
    })
}

fn bad_literal(text: &str, line: usize, reason: impl std::fmt::Display) -> ScriptError {
    ScriptError::BadLiteral {
        line,
        literal: text.to_string(),
        reason: reason.to_string(),
    }
}

fn quoted(text: &str) -> Option<&str> {
    text.strip_prefix('"')?.strip_suffix('"')
}
