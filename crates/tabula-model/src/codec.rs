use thiserror::Error;

use crate::{Attribute, AttributeKind};

/// Error raised when a byte slice cannot be decoded as attribute values.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The kind has no fixed width, so a bare byte run cannot be sliced into
    /// values by count alone.
    #[error("{kind} values are variable-width and cannot be decoded by count")]
    VariableWidth { kind: AttributeKind },
    /// The byte run's length is not exactly `count * width`.
    #[error("{count} {kind} values need {expected} bytes, got {actual}")]
    LengthMismatch {
        kind: AttributeKind,
        count: u64,
        expected: u64,
        actual: u64,
    },
}

/// Appends the little-endian encoding of `value` to `out`.
///
/// Fixed-width kinds emit exactly [`AttributeKind::fixed_width`] bytes.
/// Strings emit a `u64` byte length followed by the UTF-8 bytes. Booleans
/// emit one byte, `0` or `1`. This is the single encoding shared by column
/// files and payload attribute runs.
pub fn encode_value(value: &Attribute, out: &mut Vec<u8>) {
    match value {
        Attribute::I8(v) => out.extend_from_slice(&v.to_le_bytes()),
        Attribute::I16(v) => out.extend_from_slice(&v.to_le_bytes()),
        Attribute::I32(v) => out.extend_from_slice(&v.to_le_bytes()),
        Attribute::I64(v) => out.extend_from_slice(&v.to_le_bytes()),
        Attribute::U8(v) => out.extend_from_slice(&v.to_le_bytes()),
        Attribute::U16(v) => out.extend_from_slice(&v.to_le_bytes()),
        Attribute::U32(v) => out.extend_from_slice(&v.to_le_bytes()),
        Attribute::U64(v) => out.extend_from_slice(&v.to_le_bytes()),
        Attribute::String(s) => {
            out.extend_from_slice(&(s.len() as u64).to_le_bytes());
            out.extend_from_slice(s.as_bytes());
        }
        Attribute::Boolean(v) => out.push(u8::from(*v)),
        Attribute::Float(v) => out.extend_from_slice(&v.to_le_bytes()),
        Attribute::Double(v) => out.extend_from_slice(&v.to_le_bytes()),
        Attribute::Reference(v) => out.extend_from_slice(&v.to_le_bytes()),
    }
}

/// Decodes exactly `count` fixed-width values of `kind` from `bytes`.
///
/// `bytes` must be exactly `count * width` long; callers slice the prefix
/// they want before decoding. Booleans decode any nonzero byte as `true`.
pub fn decode_values(
    bytes: &[u8],
    kind: AttributeKind,
    count: u64,
) -> Result<Vec<Attribute>, CodecError> {
    let width = kind.fixed_width().ok_or(CodecError::VariableWidth { kind })?;
    let actual = bytes.len() as u64;
    if actual % width as u64 != 0 || actual / width as u64 != count {
        return Err(CodecError::LengthMismatch {
            kind,
            count,
            expected: count.saturating_mul(width as u64),
            actual,
        });
    }
    Ok(bytes
        .chunks_exact(width)
        .map(|chunk| decode_fixed(chunk, kind))
        .collect())
}

/// Decodes one fixed-width value. `chunk` is exactly `kind.fixed_width()`
/// bytes long.
fn decode_fixed(chunk: &[u8], kind: AttributeKind) -> Attribute {
    match kind {
        AttributeKind::I8 => Attribute::I8(chunk[0] as i8),
        AttributeKind::I16 => Attribute::I16(i16::from_le_bytes([chunk[0], chunk[1]])),
        AttributeKind::I32 => Attribute::I32(i32::from_le_bytes(le4(chunk))),
        AttributeKind::I64 => Attribute::I64(i64::from_le_bytes(le8(chunk))),
        AttributeKind::U8 => Attribute::U8(chunk[0]),
        AttributeKind::U16 => Attribute::U16(u16::from_le_bytes([chunk[0], chunk[1]])),
        AttributeKind::U32 => Attribute::U32(u32::from_le_bytes(le4(chunk))),
        AttributeKind::U64 => Attribute::U64(u64::from_le_bytes(le8(chunk))),
        AttributeKind::Boolean => Attribute::Boolean(chunk[0] != 0),
        AttributeKind::Float => Attribute::Float(f32::from_le_bytes(le4(chunk))),
        AttributeKind::Double => Attribute::Double(f64::from_le_bytes(le8(chunk))),
        AttributeKind::Reference => Attribute::Reference(u32::from_le_bytes(le4(chunk))),
        // Callers reject strings before slicing into chunks.
        AttributeKind::String => unreachable!("string values have no fixed width"),
    }
}

fn le4(chunk: &[u8]) -> [u8; 4] {
    [chunk[0], chunk[1], chunk[2], chunk[3]]
}

fn le8(chunk: &[u8]) -> [u8; 8] {
    [
        chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
    ]
}
