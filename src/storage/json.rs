//! Whole-file JSON documents for the catalog and per-table row data.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::{DbError, Result};
use crate::storage::Row;

pub const DEFAULT_CATALOG_FILE: &str = "db_meta.json";
pub const ROWS_DIR: &str = "data";

/// Load/save contract between in-memory tables and their persisted form.
///
/// Absent documents load as empty; every save replaces the whole document.
pub trait Store {
    fn load_catalog(&self) -> Result<Catalog>;
    fn save_catalog(&mut self, catalog: &Catalog) -> Result<()>;
    fn load_rows(&self, table: &str) -> Result<Vec<Row>>;
    fn save_rows(&mut self, table: &str, rows: &[Row]) -> Result<()>;
    /// Deleting rows of a table that never had any is not an error.
    fn remove_rows(&mut self, table: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    catalog_path: PathBuf,
    rows_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::with_catalog_file(data_dir, DEFAULT_CATALOG_FILE)
    }

    pub fn with_catalog_file(data_dir: impl AsRef<Path>, catalog_file: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            catalog_path: data_dir.join(catalog_file),
            rows_dir: data_dir.join(ROWS_DIR),
        }
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn rows_path(&self, table: &str) -> PathBuf {
        self.rows_dir.join(format!("{table}.json"))
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> DbError + '_ {
    move |source| DbError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_document<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "document missing, using empty default");
            return Ok(T::default());
        }
        Err(e) => return Err(io_err(path)(e)),
    };
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&content).map_err(|source| DbError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn write_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let payload = serde_json::to_string_pretty(value).map_err(|source| DbError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, payload).map_err(io_err(path))?;
    debug!(path = %path.display(), "document saved");
    Ok(())
}

impl Store for JsonStore {
    fn load_catalog(&self) -> Result<Catalog> {
        read_document(&self.catalog_path)
    }

    fn save_catalog(&mut self, catalog: &Catalog) -> Result<()> {
        write_document(&self.catalog_path, catalog)
    }

    fn load_rows(&self, table: &str) -> Result<Vec<Row>> {
        read_document(&self.rows_path(table))
    }

    fn save_rows(&mut self, table: &str, rows: &[Row]) -> Result<()> {
        write_document(&self.rows_path(table), rows)
    }

    fn remove_rows(&mut self, table: &str) -> Result<()> {
        let path = self.rows_path(table);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&path)(e)),
        }
    }
}
