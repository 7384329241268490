use tabula_model::{encode_value, Attribute, AttributeKind};

use crate::ControlMessage;

/// Appends payload frames to an in-memory byte buffer.
///
/// Layout written per attribute run:
/// - start marker (`startReferenceAttribute` when the kind is `reference`,
///   `startDataAttribute` otherwise)
/// - attribute name: u64 LE byte length + UTF-8
/// - kind tag byte (data frames only; reference frames imply it)
/// - element count: u64 LE
/// - `count` encoded values
/// - the matching end marker
///
/// The writer does not validate frame balance. `control` appends a bare
/// marker wherever the caller asks, so an unmatched close or a truncated
/// open produces a malformed but still-written stream. [`crate::parse_stream`]
/// is where malformed streams get diagnosed.
#[derive(Debug, Default)]
pub struct PayloadWriter {
    buf: Vec<u8>,
}

impl PayloadWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes accumulated so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Appends a bare control marker.
    pub fn control(&mut self, msg: ControlMessage) {
        self.buf.push(msg.tag());
    }

    /// Appends a length-prefixed UTF-8 string (u64 LE byte length + bytes).
    pub fn write_string(&mut self, s: &str) {
        self.buf.extend_from_slice(&(s.len() as u64).to_le_bytes());
        self.buf.extend_from_slice(s.as_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Appends one complete, balanced attribute run.
    ///
    /// `kind` decides the framing; every yielded value must be of that kind
    /// or the stream will not decode. The count written is `values.len()`,
    /// so an empty run is a valid frame.
    pub fn attribute_run<'a, I>(&mut self, name: &str, kind: AttributeKind, values: I)
    where
        I: ExactSizeIterator<Item = &'a Attribute>,
    {
        let reference = kind == AttributeKind::Reference;
        self.control(if reference {
            ControlMessage::StartReferenceAttribute
        } else {
            ControlMessage::StartDataAttribute
        });
        self.write_string(name);
        if !reference {
            self.buf.push(kind.tag());
        }
        self.write_u64(values.len() as u64);
        for value in values {
            encode_value(value, &mut self.buf);
        }
        self.control(if reference {
            ControlMessage::EndReferenceAttribute
        } else {
            ControlMessage::EndDataAttribute
        });
    }
}
