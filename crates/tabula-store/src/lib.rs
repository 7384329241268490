//! File-backed column store.
//!
//! A [`Store`] is rooted at a directory. Each table is a subdirectory, each
//! column a single headerless file under it: `count` fixed-width encodings
//! back to back, append-only. The catalog (which tables and columns exist,
//! their kinds and counts) lives in memory and is rebuilt by the
//! instructions of each run; `load_count` resynchronizes a column's count
//! from its file size, so re-running against an existing root picks up
//! whatever data is already there.
//!
//! Every operation opens its file handle, does one thing, and closes it.
//! Failures are reported as [`StoreError`]; a failing operation leaves the
//! on-disk state untouched.

mod error;
mod store;

pub use error::{Result, StoreError};
pub use store::{ColumnMeta, Store};
