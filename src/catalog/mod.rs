//! Table definitions.
//!
//! The catalog is a plain value: callers load it through a [`Store`](crate::storage::Store),
//! mutate it with [`Catalog::define_table`] or [`Catalog::remove_table`] and save it back.
//! A failed operation leaves the catalog exactly as it was.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

use crate::error::{DbError, Result};
use crate::storage::{DataType, ID_COLUMN};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, DataType)", into = "(String, DataType)")]
pub struct ColumnDef {
    pub name: String,
    pub ty: DataType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, ty: DataType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl From<(String, DataType)> for ColumnDef {
    fn from((name, ty): (String, DataType)) -> Self {
        Self { name, ty }
    }
}

impl From<ColumnDef> for (String, DataType) {
    fn from(col: ColumnDef) -> Self {
        (col.name, col.ty)
    }
}

/// Ordered columns of one table. The first column is always `id:int`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_type(&self, name: &str) -> Option<DataType> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.ty)
    }

    /// Columns the caller supplies on insert, in declared order.
    pub fn user_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.name != ID_COLUMN)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    tables: BTreeMap<String, TableSchema>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    pub fn schema(&self, name: &str) -> Result<&TableSchema> {
        self.get(name).ok_or_else(|| DbError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Validates `columns` as `(name, type)` pairs and registers the table with
    /// an implicit leading `id:int` column.
    pub fn define_table<N, T>(&mut self, name: &str, columns: &[(N, T)]) -> Result<&TableSchema>
    where
        N: AsRef<str>,
        T: AsRef<str>,
    {
        if name.is_empty() {
            return Err(DbError::EmptyTableName);
        }
        if self.tables.contains_key(name) {
            return Err(DbError::AlreadyExists(name.to_string()));
        }

        let mut defs = vec![ColumnDef::new(ID_COLUMN, DataType::Int)];
        let mut seen: HashSet<&str> = HashSet::from([ID_COLUMN]);
        for (col, ty) in columns {
            let (col, ty) = (col.as_ref(), ty.as_ref());
            let ty = DataType::parse(ty).ok_or_else(|| DbError::InvalidColumnType {
                column: col.to_string(),
                ty: ty.to_string(),
            })?;
            if !seen.insert(col) {
                return Err(DbError::DuplicateColumn(col.to_string()));
            }
            defs.push(ColumnDef::new(col, ty));
        }

        info!(table = name, columns = defs.len(), "table defined");
        Ok(self
            .tables
            .entry(name.to_string())
            .or_insert(TableSchema { columns: defs }))
    }

    /// Removes the schema. The table's row-data document is the caller's to delete.
    pub fn remove_table(&mut self, name: &str) -> Result<TableSchema> {
        let schema = self
            .tables
            .remove(name)
            .ok_or_else(|| DbError::NotFound(name.to_string()))?;
        info!(table = name, "table removed");
        Ok(schema)
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}
