pub mod cache;
pub mod rows;

use tracing::{info, warn};

use crate::catalog::{Catalog, TableSchema};
use crate::error::Result;
use crate::query::Stmt;
use crate::storage::{Row, Store};
use cache::SelectCache;
use rows::Predicate;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Rows { columns: Vec<String>, rows: Vec<Row> },
    Tables(Vec<String>),
    Created { table: String, columns: Vec<String> },
    Dropped { table: String },
    Inserted { table: String, id: i64 },
    Updated { table: String, ids: Vec<i64> },
    Deleted { table: String, ids: Vec<i64> },
    Help,
    Exit,
}

/// Runs parsed commands against a store, one load → mutate → save cycle each.
pub struct Executor<S: Store> {
    store: S,
    cache: SelectCache,
}

impl<S: Store> Executor<S> {
    pub fn new(store: S) -> Self {
        Self::with_cache(store, SelectCache::new(0))
    }

    pub fn with_cache(store: S, cache: SelectCache) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn run(&mut self, src: &str) -> Result<QueryResult> {
        let stmt = crate::query::parse(src)?;
        self.execute(stmt)
    }

    pub fn execute(&mut self, stmt: Stmt) -> Result<QueryResult> {
        match stmt {
            Stmt::CreateTable { table, columns } => {
                let mut catalog = self.store.load_catalog()?;
                let schema = catalog.define_table(&table, &columns)?;
                let columns = schema.column_names().into_iter().map(String::from).collect();
                // rows left behind by an earlier table of the same name
                self.store.remove_rows(&table)?;
                self.store.save_catalog(&catalog)?;
                Ok(QueryResult::Created {
                    table: table.into(),
                    columns,
                })
            }
            Stmt::DropTable { table } => {
                let mut catalog = self.store.load_catalog()?;
                catalog.remove_table(&table)?;
                self.store.remove_rows(&table)?;
                self.store.save_catalog(&catalog)?;
                Ok(QueryResult::Dropped {
                    table: table.into(),
                })
            }
            Stmt::ListTables => Ok(QueryResult::Tables(self.list_tables())),
            Stmt::Insert { table, values } => {
                let catalog = self.store.load_catalog()?;
                let rows = rows::insert(&mut self.store, &catalog, &table, &values)?;
                let id = rows.last().and_then(Row::id).unwrap_or_default();
                Ok(QueryResult::Inserted {
                    table: table.into(),
                    id,
                })
            }
            Stmt::Select { table, filter } => {
                let catalog = self.store.load_catalog()?;
                let schema = catalog.schema(&table)?;
                let filter = filter.map(|p| typed_predicate(schema, p));
                let data = self.store.load_rows(&table)?;
                let rows = self.cache.select(&data, filter.as_ref());
                Ok(QueryResult::Rows {
                    columns: schema.column_names().into_iter().map(String::from).collect(),
                    rows,
                })
            }
            Stmt::Update {
                table,
                assigns,
                filter,
            } => {
                let catalog = self.store.load_catalog()?;
                let schema = catalog.schema(&table)?;
                let filter = filter.map(|p| typed_predicate(schema, p));
                let data = self.store.load_rows(&table)?;
                let ids = rows::select(&data, filter.as_ref())
                    .iter()
                    .filter_map(Row::id)
                    .collect();
                let (data, touched) = rows::update(data, &assigns, filter.as_ref());
                if touched > 0 {
                    self.store.save_rows(&table, &data)?;
                }
                info!(table = &*table, touched, "rows updated");
                Ok(QueryResult::Updated {
                    table: table.into(),
                    ids,
                })
            }
            Stmt::Delete { table, filter } => {
                let catalog = self.store.load_catalog()?;
                let schema = catalog.schema(&table)?;
                let filter = filter.map(|p| typed_predicate(schema, p));
                let data = self.store.load_rows(&table)?;
                let deletion = rows::delete(data, filter.as_ref());
                if deletion.count() > 0 {
                    self.store.save_rows(&table, &deletion.remaining)?;
                }
                info!(table = &*table, removed = deletion.count(), "rows deleted");
                Ok(QueryResult::Deleted {
                    table: table.into(),
                    ids: deletion.removed_ids(),
                })
            }
            Stmt::Help => Ok(QueryResult::Help),
            Stmt::Exit => Ok(QueryResult::Exit),
        }
    }

    /// Table names, or none when the catalog cannot be read.
    pub fn list_tables(&self) -> Vec<String> {
        match self.store.load_catalog() {
            Ok(catalog) => catalog.list_tables(),
            Err(e) => {
                warn!(error = %e, "catalog unreadable, listing no tables");
                Vec::new()
            }
        }
    }

    pub fn catalog(&self) -> Result<Catalog> {
        self.store.load_catalog()
    }
}

/// Converts literal where-values to the column's declared type when that succeeds,
/// so `where active = yes` finds rows holding `true`.
fn typed_predicate(schema: &TableSchema, predicate: Predicate) -> Predicate {
    predicate
        .into_iter()
        .map(|(column, value)| {
            let value = match schema.column_type(&column) {
                Some(ty) => rows::coerce(&column, ty, &value).unwrap_or(value),
                None => value,
            };
            (column, value)
        })
        .collect()
}
