//! The instruction engine: one pass over a linear instruction sequence,
//! dispatched against the column store and the payload writer.
//!
//! A run owns a fresh set of registers (current table/column selection, the
//! values last read, an optional sort permutation, and the payload buffer).
//! Instructions execute in order until `end`, the end of the sequence, or
//! the first failure. Whatever payload bytes have accumulated by then are
//! the run's artifact; [`Engine::run_to_path`] flushes them to disk
//! unconditionally, error or not, so a failed run still leaves evidence of
//! how far it got.

mod artifact;
mod engine;
mod error;
mod instruction;
mod sort;

pub use engine::{Engine, RunOutcome};
pub use error::{EngineError, EngineResult};
pub use instruction::{FrameKind, Instruction, UnknownFrameName};
pub use sort::ascending_permutation;
