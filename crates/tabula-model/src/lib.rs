//! Typed attribute values shared by the column store and the payload wire
//! format.
//!
//! An attribute is one scalar: a sized integer, a float, a boolean, a UTF-8
//! string, or a 32-bit reference (a row id pointing into another table).
//! This crate owns:
//!
//! - [`AttributeKind`]: the closed set of kinds, their stable wire tags, and
//!   their encoded widths
//! - [`Attribute`]: the value itself, one variant per kind
//! - the little-endian value codec ([`encode_value`] / [`decode_values`])
//!   used verbatim by column files on disk and by attribute runs inside
//!   payloads
//!
//! Everything downstream (store, engine, payload framing) builds on these
//! types; nothing here touches the filesystem.

mod attribute;
mod codec;
mod kind;

pub use attribute::Attribute;
pub use codec::{decode_values, encode_value, CodecError};
pub use kind::{AttributeKind, UnknownKindName};
