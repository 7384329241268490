use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use tabula_model::{decode_values, encode_value, Attribute, AttributeKind};

use crate::{Result, StoreError};

/// Catalog entry for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMeta {
    pub kind: AttributeKind,
    /// Number of values the catalog believes the file holds. Grows on
    /// append; resynchronized from the file size by [`Store::load_count`].
    pub count: u64,
}

#[derive(Debug, Default)]
struct Table {
    columns: BTreeMap<String, ColumnMeta>,
}

/// The column store: an in-memory catalog over `<root>/<table>/<column>`
/// files.
///
/// Construction does no I/O; directories and files come into being when
/// tables and columns are created. Existing paths are reused as-is, which is
/// what makes a rerun against a previous root append-compatible.
#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    tables: BTreeMap<String, Table>,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tables: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Catalog metadata for a column, or the not-found error naming what is
    /// missing.
    pub fn column_meta(&self, table: &str, column: &str) -> Result<ColumnMeta> {
        let entry = self
            .tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        entry
            .columns
            .get(column)
            .copied()
            .ok_or_else(|| StoreError::ColumnNotFound {
                table: table.to_string(),
                column: column.to_string(),
            })
    }

    /// Registers a table and creates its directory. Fails if the catalog
    /// already has the name; a directory left over from an earlier run is
    /// reused.
    pub fn create_table(&mut self, name: &str) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(StoreError::TableExists(name.to_string()));
        }
        let path = self.table_path(name);
        fs::create_dir_all(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        self.tables.insert(name.to_string(), Table::default());
        Ok(())
    }

    /// Registers a column with `count = 0` and creates its file. Strings
    /// have no fixed width and are rejected here; every other kind is
    /// storable.
    pub fn create_column(&mut self, table: &str, column: &str, kind: AttributeKind) -> Result<()> {
        if kind.fixed_width().is_none() {
            return Err(StoreError::UnsupportedKind { kind });
        }
        let entry = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        if entry.columns.contains_key(column) {
            return Err(StoreError::ColumnExists {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        let path = column_path(&self.root, table, column);
        // Touch the file without truncating anything already there.
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        entry
            .columns
            .insert(column.to_string(), ColumnMeta { kind, count: 0 });
        Ok(())
    }

    /// Appends one value to a column file and bumps the tracked count.
    pub fn append(&mut self, table: &str, column: &str, value: &Attribute) -> Result<()> {
        let meta = self.column_meta(table, column)?;
        if value.kind() != meta.kind {
            return Err(StoreError::KindMismatch {
                table: table.to_string(),
                column: column.to_string(),
                expected: meta.kind,
                actual: value.kind(),
            });
        }

        let path = column_path(&self.root, table, column);
        let mut encoded = Vec::with_capacity(meta.kind.fixed_width().unwrap_or(8));
        encode_value(value, &mut encoded);
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        file.write_all(&encoded).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        drop(file);

        debug!("appended {value} to {table}/{column}");
        self.column_mut(table, column)?.count += 1;
        Ok(())
    }

    /// Reads the tracked `count` values back, in append order.
    ///
    /// The file may be longer than the catalog's count (a rerun that has not
    /// called `load_count` yet); the excess is ignored. Shorter is
    /// corruption and is reported as such.
    pub fn read_column(&self, table: &str, column: &str) -> Result<Vec<Attribute>> {
        let meta = self.column_meta(table, column)?;
        let width = meta
            .kind
            .fixed_width()
            .ok_or(StoreError::UnsupportedKind { kind: meta.kind })?;

        let path = column_path(&self.root, table, column);
        let bytes = fs::read(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        let expected = meta.count.saturating_mul(width as u64);
        if (bytes.len() as u64) < expected {
            return Err(StoreError::ShortColumnFile {
                path,
                actual: bytes.len() as u64,
                expected,
                count: meta.count,
            });
        }
        debug!(
            "read {count} {kind} values from {table}/{column}",
            count = meta.count,
            kind = meta.kind,
        );
        Ok(decode_values(&bytes[..expected as usize], meta.kind, meta.count)?)
    }

    /// Resynchronizes a column's count from its file size (integer division
    /// by the value width) and returns the new count.
    pub fn load_count(&mut self, table: &str, column: &str) -> Result<u64> {
        let meta = self.column_meta(table, column)?;
        let width = meta
            .kind
            .fixed_width()
            .ok_or(StoreError::UnsupportedKind { kind: meta.kind })?;

        let path = column_path(&self.root, table, column);
        let size = fs::metadata(&path)
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?
            .len();
        let count = size / width as u64;
        debug!("{table}/{column}: {size} bytes on disk, count now {count}");
        self.column_mut(table, column)?.count = count;
        Ok(count)
    }

    /// In-place record update. Not implemented; fails fast rather than
    /// silently doing nothing.
    pub fn update(
        &mut self,
        _table: &str,
        _column: &str,
        _index: u64,
        _value: &Attribute,
    ) -> Result<()> {
        Err(StoreError::Unimplemented { op: "update" })
    }

    /// Record deletion. Not implemented; fails fast rather than silently
    /// doing nothing.
    pub fn delete(&mut self, _table: &str, _column: &str, _index: u64) -> Result<()> {
        Err(StoreError::Unimplemented { op: "delete" })
    }

    fn column_mut(&mut self, table: &str, column: &str) -> Result<&mut ColumnMeta> {
        let entry = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        entry
            .columns
            .get_mut(column)
            .ok_or_else(|| StoreError::ColumnNotFound {
                table: table.to_string(),
                column: column.to_string(),
            })
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(table)
    }
}

fn column_path(root: &Path, table: &str, column: &str) -> PathBuf {
    root.join(table).join(column)
}
