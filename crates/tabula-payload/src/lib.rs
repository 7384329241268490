//! The payload wire format: a flat byte stream of framed column data.
//!
//! A payload is built from eight single-byte control markers plus
//! length-prefixed strings and fixed-width values (encoded by
//! `tabula-model`). Frames nest: a payload frame holds table frames, a table
//! frame holds attribute runs. Reference attributes get their own marker
//! pair and omit the kind byte (the kind is implied).
//!
//! - [`PayloadWriter`] appends frames to an in-memory buffer. It is
//!   deliberately permissive: callers may emit raw markers in any order, and
//!   no balance checking is performed, so a half-opened stream is still a
//!   writable artifact.
//! - [`parse_stream`] is the strict side: it decodes a byte blob back into
//!   [`Frame`] trees and reports the byte offset of anything malformed. It
//!   is total over arbitrary input (fuzzed by `fuzz_parse_payload`).

mod control;
mod reader;
mod writer;

pub use control::ControlMessage;
pub use reader::{parse_stream, Frame, ParseError};
pub use writer::PayloadWriter;
