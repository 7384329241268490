use std::io;
use std::path::PathBuf;

use tabula_model::{AttributeKind, CodecError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("column not found: {table}/{column}")]
    ColumnNotFound { table: String, column: String },
    #[error("table already exists: {0}")]
    TableExists(String),
    #[error("column already exists: {table}/{column}")]
    ColumnExists { table: String, column: String },
    #[error("column {table}/{column} holds {expected} values, cannot append a {actual}")]
    KindMismatch {
        table: String,
        column: String,
        expected: AttributeKind,
        actual: AttributeKind,
    },
    #[error("{kind} columns are not supported: column files hold fixed-width values only")]
    UnsupportedKind { kind: AttributeKind },
    #[error("{op} is not implemented")]
    Unimplemented { op: &'static str },
    #[error(
        "column file {path} is {actual} bytes, expected at least {expected} for {count} values"
    )]
    ShortColumnFile {
        path: PathBuf,
        actual: u64,
        expected: u64,
        count: u64,
    },
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
