//! A small record store kept in flat JSON files.
//!
//! The catalog of table schemas and each table's rows live in separate documents.
//! Every command loads what it needs, changes it in memory and writes the whole
//! document back.
//!
//! ```no_run
//! use primitive_db::executor::Executor;
//! use primitive_db::storage::JsonStore;
//!
//! let mut exec = Executor::new(JsonStore::new("db"));
//! exec.run("create_table users name:str active:bool").unwrap();
//! exec.run("insert users Alice yes").unwrap();
//! let rows = exec.run("select users where active = true").unwrap();
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod guard;
pub mod query;
pub mod storage;

pub use catalog::{Catalog, ColumnDef, TableSchema};
pub use error::{DbError, Result};
pub use executor::{Executor, QueryResult};
pub use storage::{DataType, DataValue, JsonStore, Row, Store};
