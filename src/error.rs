//! Error types shared by every core operation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::query::QueryErr;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    /// Referenced table does not exist in the catalog.
    #[error("table '{0}' does not exist")]
    NotFound(String),

    #[error("table '{0}' already exists")]
    AlreadyExists(String),

    /// Column declared with a type outside {int, str, bool}.
    #[error("invalid type '{ty}' for column '{column}', allowed: int, str, bool")]
    InvalidColumnType { column: String, ty: String },

    #[error("column '{0}' is declared more than once")]
    DuplicateColumn(String),

    #[error("table name must not be empty")]
    EmptyTableName,

    #[error("expected {expected} values, got {found}")]
    ArityMismatch { expected: usize, found: usize },

    /// One message per column that failed coercion.
    #[error("validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    /// The largest id in the table leaves no room for another row.
    #[error("table '{0}' has no ids left to assign")]
    IdsExhausted(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt document '{}': {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Parse(#[from] QueryErr),

    /// The user declined a confirmation prompt.
    #[error("operation \"{0}\" cancelled")]
    Cancelled(String),
}

impl DbError {
    /// True for failures of the underlying documents rather than of the request.
    pub fn is_io(&self) -> bool {
        matches!(self, DbError::Io { .. } | DbError::Corrupt { .. })
    }
}
