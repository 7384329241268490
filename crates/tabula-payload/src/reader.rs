use serde::Serialize;
use tabula_model::{decode_values, Attribute, AttributeKind, CodecError};
use thiserror::Error;

use crate::ControlMessage;

/// Deepest frame nesting the reader will follow before giving up.
///
/// The writer is permissive, so arbitrary input can open frames forever;
/// bounding the recursion keeps the reader total over untrusted bytes.
const MAX_NESTING: usize = 64;

/// Error raised while decoding a payload byte stream.
///
/// Every variant carries the byte offset it was detected at, so a malformed
/// blob can be diagnosed with a hex dump alone.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of input at byte {offset} while reading {context}")]
    UnexpectedEof { offset: usize, context: &'static str },
    #[error("unexpected control byte {byte:#04x} at byte {offset}, expected {expected}")]
    UnexpectedControl {
        offset: usize,
        byte: u8,
        expected: &'static str,
    },
    #[error("unknown attribute kind tag {tag:#04x} at byte {offset}")]
    UnknownKindTag { offset: usize, tag: u8 },
    #[error("invalid UTF-8 in string at byte {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("length {length} at byte {offset} exceeds the {remaining} bytes that remain")]
    LengthOverrun {
        offset: usize,
        length: u64,
        remaining: u64,
    },
    #[error("frame nesting exceeds {max} levels at byte {offset}")]
    TooDeep { offset: usize, max: usize },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// One decoded frame.
///
/// Serializes with a `frame` tag so `tabula inspect` output is
/// self-describing JSON.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum Frame {
    Payload {
        frames: Vec<Frame>,
    },
    Table {
        name: String,
        frames: Vec<Frame>,
    },
    Data {
        name: String,
        kind: AttributeKind,
        values: Vec<Attribute>,
    },
    Reference {
        name: String,
        values: Vec<Attribute>,
    },
}

/// Decodes a payload blob into its top-level frames.
///
/// The grammar is taken structurally: any frame may appear wherever a frame
/// may start, including bare attribute runs at top level, because the
/// permissive writer can produce exactly that. Trailing garbage after a
/// complete frame is an error, as is a container whose end marker never
/// arrives.
pub fn parse_stream(bytes: &[u8]) -> Result<Vec<Frame>, ParseError> {
    let mut cur = Cursor { bytes, pos: 0 };
    let mut frames = Vec::new();
    while !cur.at_end() {
        frames.push(parse_frame(&mut cur, 0)?);
    }
    Ok(frames)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take_byte(&mut self, context: &'static str) -> Result<u8, ParseError> {
        match self.bytes.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(b)
            }
            None => Err(ParseError::UnexpectedEof {
                offset: self.pos,
                context,
            }),
        }
    }

    fn peek_byte(&self, context: &'static str) -> Result<u8, ParseError> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or(ParseError::UnexpectedEof {
                offset: self.pos,
                context,
            })
    }

    fn take_slice(&mut self, len: u64) -> Result<&'a [u8], ParseError> {
        if len > self.remaining() as u64 {
            return Err(ParseError::LengthOverrun {
                offset: self.pos,
                length: len,
                remaining: self.remaining() as u64,
            });
        }
        let start = self.pos;
        self.pos += len as usize;
        Ok(&self.bytes[start..self.pos])
    }

    fn read_u64(&mut self, context: &'static str) -> Result<u64, ParseError> {
        if self.remaining() < 8 {
            return Err(ParseError::UnexpectedEof {
                offset: self.pos,
                context,
            });
        }
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.bytes[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(u64::from_le_bytes(raw))
    }

    fn read_string(&mut self) -> Result<String, ParseError> {
        let len = self.read_u64("string length")?;
        let offset = self.pos;
        let raw = self.take_slice(len)?;
        match std::str::from_utf8(raw) {
            Ok(s) => Ok(s.to_string()),
            Err(_) => Err(ParseError::InvalidUtf8 { offset }),
        }
    }
}

fn parse_frame(cur: &mut Cursor, depth: usize) -> Result<Frame, ParseError> {
    let offset = cur.pos;
    if depth >= MAX_NESTING {
        return Err(ParseError::TooDeep {
            offset,
            max: MAX_NESTING,
        });
    }
    let byte = cur.take_byte("control marker")?;
    match ControlMessage::from_tag(byte) {
        Some(ControlMessage::StartPayload) => {
            let frames = parse_children(cur, ControlMessage::EndPayload, depth + 1)?;
            Ok(Frame::Payload { frames })
        }
        Some(ControlMessage::StartTable) => {
            let name = cur.read_string()?;
            let frames = parse_children(cur, ControlMessage::EndTable, depth + 1)?;
            Ok(Frame::Table { name, frames })
        }
        Some(ControlMessage::StartDataAttribute) => parse_data_run(cur),
        Some(ControlMessage::StartReferenceAttribute) => parse_reference_run(cur),
        _ => Err(ParseError::UnexpectedControl {
            offset,
            byte,
            expected: "a start marker",
        }),
    }
}

fn parse_children(
    cur: &mut Cursor,
    end: ControlMessage,
    depth: usize,
) -> Result<Vec<Frame>, ParseError> {
    // "endTable or a start marker" style expectation for the error path.
    let expected = match end {
        ControlMessage::EndPayload => "endPayload or a start marker",
        _ => "endTable or a start marker",
    };
    let mut frames = Vec::new();
    loop {
        let offset = cur.pos;
        let byte = cur.peek_byte(end.name())?;
        if byte == end.tag() {
            cur.pos += 1;
            return Ok(frames);
        }
        match ControlMessage::from_tag(byte) {
            Some(
                ControlMessage::StartPayload
                | ControlMessage::StartTable
                | ControlMessage::StartDataAttribute
                | ControlMessage::StartReferenceAttribute,
            ) => frames.push(parse_frame(cur, depth)?),
            _ => {
                return Err(ParseError::UnexpectedControl {
                    offset,
                    byte,
                    expected,
                })
            }
        }
    }
}

fn parse_data_run(cur: &mut Cursor) -> Result<Frame, ParseError> {
    let name = cur.read_string()?;
    let kind_offset = cur.pos;
    let tag = cur.take_byte("attribute kind tag")?;
    let kind = AttributeKind::from_tag(tag).ok_or(ParseError::UnknownKindTag {
        offset: kind_offset,
        tag,
    })?;
    let values = read_values(cur, kind)?;
    expect_control(cur, ControlMessage::EndDataAttribute)?;
    Ok(Frame::Data { name, kind, values })
}

fn parse_reference_run(cur: &mut Cursor) -> Result<Frame, ParseError> {
    let name = cur.read_string()?;
    let values = read_values(cur, AttributeKind::Reference)?;
    expect_control(cur, ControlMessage::EndReferenceAttribute)?;
    Ok(Frame::Reference { name, values })
}

fn read_values(cur: &mut Cursor, kind: AttributeKind) -> Result<Vec<Attribute>, ParseError> {
    let count = cur.read_u64("value count")?;
    match kind.fixed_width() {
        Some(width) => {
            // Saturating keeps an absurd count from overflowing; take_slice
            // then rejects it against the bytes that actually remain.
            let total = count.saturating_mul(width as u64);
            let raw = cur.take_slice(total)?;
            Ok(decode_values(raw, kind, count)?)
        }
        None => {
            // No pre-reserve: count is unvalidated input, and each string
            // consumes at least its 8-byte length field before we loop again.
            let mut values = Vec::new();
            for _ in 0..count {
                values.push(Attribute::String(cur.read_string()?));
            }
            Ok(values)
        }
    }
}

fn expect_control(cur: &mut Cursor, want: ControlMessage) -> Result<(), ParseError> {
    let offset = cur.pos;
    let byte = cur.take_byte(want.name())?;
    if byte == want.tag() {
        Ok(())
    } else {
        Err(ParseError::UnexpectedControl {
            offset,
            byte,
            expected: want.name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PayloadWriter;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_has_no_frames() {
        assert_eq!(parse_stream(&[]), Ok(Vec::new()));
    }

    #[test]
    fn round_trips_a_full_payload() {
        let mut w = PayloadWriter::new();
        w.control(ControlMessage::StartPayload);
        w.control(ControlMessage::StartTable);
        w.write_string("people");
        let ages = [Attribute::U8(31), Attribute::U8(4)];
        w.attribute_run("age", AttributeKind::U8, ages.iter());
        let parents = [Attribute::Reference(0)];
        w.attribute_run("parent", AttributeKind::Reference, parents.iter());
        w.control(ControlMessage::EndTable);
        w.control(ControlMessage::EndPayload);

        let frames = parse_stream(w.as_bytes()).unwrap();
        assert_eq!(
            frames,
            vec![Frame::Payload {
                frames: vec![Frame::Table {
                    name: "people".to_string(),
                    frames: vec![
                        Frame::Data {
                            name: "age".to_string(),
                            kind: AttributeKind::U8,
                            values: ages.to_vec(),
                        },
                        Frame::Reference {
                            name: "parent".to_string(),
                            values: parents.to_vec(),
                        },
                    ],
                }],
            }]
        );
    }

    #[test]
    fn string_runs_decode() {
        let mut w = PayloadWriter::new();
        let names = [Attribute::from("ada"), Attribute::from("bo")];
        w.attribute_run("name", AttributeKind::String, names.iter());

        let frames = parse_stream(w.as_bytes()).unwrap();
        assert_eq!(
            frames,
            vec![Frame::Data {
                name: "name".to_string(),
                kind: AttributeKind::String,
                values: names.to_vec(),
            }]
        );
    }

    #[test]
    fn bare_runs_parse_at_top_level() {
        // The permissive writer can emit a run with no enclosing payload.
        let mut w = PayloadWriter::new();
        let values = [Attribute::U16(7)];
        w.attribute_run("x", AttributeKind::U16, values.iter());
        let frames = parse_stream(w.as_bytes()).unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn end_marker_at_top_level_is_rejected() {
        assert_eq!(
            parse_stream(&[ControlMessage::EndPayload.tag()]),
            Err(ParseError::UnexpectedControl {
                offset: 0,
                byte: 1,
                expected: "a start marker",
            })
        );
    }

    #[test]
    fn missing_container_end_reports_eof() {
        // startPayload then nothing.
        assert_eq!(
            parse_stream(&[0]),
            Err(ParseError::UnexpectedEof {
                offset: 1,
                context: "endPayload",
            })
        );
    }

    #[test]
    fn mismatched_end_inside_table_is_diagnosed() {
        // startTable "t" then endPayload.
        let mut bytes = vec![2u8];
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.push(b't');
        bytes.push(1);
        assert_eq!(
            parse_stream(&bytes),
            Err(ParseError::UnexpectedControl {
                offset: 10,
                byte: 1,
                expected: "endTable or a start marker",
            })
        );
    }

    #[test]
    fn unknown_kind_tag_carries_its_offset() {
        // startDataAttribute, name "x", bogus kind tag 99.
        let mut bytes = vec![4u8];
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.push(b'x');
        bytes.push(99);
        assert_eq!(
            parse_stream(&bytes),
            Err(ParseError::UnknownKindTag {
                offset: 10,
                tag: 99,
            })
        );
    }

    #[test]
    fn wrong_run_end_marker_is_diagnosed() {
        let mut w = PayloadWriter::new();
        let values = [Attribute::U8(1)];
        w.attribute_run("x", AttributeKind::U8, values.iter());
        let mut bytes = w.into_bytes();
        let end = bytes.len() - 1;
        bytes[end] = ControlMessage::EndTable.tag();
        assert_eq!(
            parse_stream(&bytes),
            Err(ParseError::UnexpectedControl {
                offset: end,
                byte: 3,
                expected: "endDataAttribute",
            })
        );
    }

    #[test]
    fn truncated_values_report_the_overrun() {
        let mut w = PayloadWriter::new();
        let values = [Attribute::U32(1), Attribute::U32(2)];
        w.attribute_run("x", AttributeKind::U32, values.iter());
        let mut bytes = w.into_bytes();
        bytes.truncate(bytes.len() - 6); // drop the end marker and value tail
        let err = parse_stream(&bytes).unwrap_err();
        assert_eq!(
            err,
            ParseError::LengthOverrun {
                offset: 19,
                length: 8,
                remaining: 3,
            }
        );
    }

    #[test]
    fn absurd_count_fails_without_allocating() {
        // startDataAttribute, name "x", kind u64, count u64::MAX.
        let mut bytes = vec![4u8];
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.push(b'x');
        bytes.push(AttributeKind::U64.tag());
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        let err = parse_stream(&bytes).unwrap_err();
        assert!(matches!(err, ParseError::LengthOverrun { .. }), "{err}");
    }

    #[test]
    fn runaway_nesting_is_bounded() {
        let bytes = vec![0u8; MAX_NESTING + 8];
        let err = parse_stream(&bytes).unwrap_err();
        assert!(matches!(err, ParseError::TooDeep { .. }), "{err}");
    }

    #[test]
    fn invalid_utf8_in_a_name_is_rejected() {
        let mut bytes = vec![2u8];
        bytes.extend_from_slice(&2u64.to_le_bytes());
        bytes.extend_from_slice(&[0xff, 0xfe]);
        assert_eq!(
            parse_stream(&bytes),
            Err(ParseError::InvalidUtf8 { offset: 9 })
        );
    }

    #[test]
    fn frames_serialize_as_tagged_json() {
        let frame = Frame::Data {
            name: "x".to_string(),
            kind: AttributeKind::U32,
            values: vec![Attribute::U32(1)],
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "frame": "data",
                "name": "x",
                "kind": "u32",
                "values": [{"kind": "u32", "value": 1}],
            })
        );
    }
}
