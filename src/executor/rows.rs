//! Row engine: insertion with coercion, and predicate-driven select/update/delete.

use std::collections::BTreeMap;
use tracing::info;

use crate::catalog::Catalog;
use crate::error::{DbError, Result};
use crate::storage::{DataType, DataValue, ID_COLUMN, Row, Store};

/// Conjunctive equality filter. An absent predicate matches every row.
pub type Predicate = BTreeMap<String, DataValue>;

/// Column overwrites applied by `update`, without type re-validation.
pub type SetClause = BTreeMap<String, DataValue>;

const TRUTHY: [&str; 4] = ["true", "1", "yes", "да"];
const FALSY: [&str; 4] = ["false", "0", "no", "нет"];

/// Converts a raw input value into `ty`, describing the failure in terms of `column`.
pub fn coerce(column: &str, ty: DataType, raw: &DataValue) -> std::result::Result<DataValue, String> {
    match (ty, raw) {
        (DataType::Int, DataValue::Int(v)) => Ok(DataValue::Int(*v)),
        (DataType::Int, DataValue::Bool(b)) => Ok(DataValue::Int(i64::from(*b))),
        (DataType::Int, DataValue::Str(s)) => s
            .trim()
            .parse::<i64>()
            .map(DataValue::Int)
            .map_err(|_| format!("column '{column}' expects int, got '{s}'")),
        (DataType::Str, raw) => Ok(DataValue::Str(raw.to_string())),
        (DataType::Bool, DataValue::Bool(b)) => Ok(DataValue::Bool(*b)),
        (DataType::Bool, DataValue::Int(v)) => Ok(DataValue::Bool(*v != 0)),
        (DataType::Bool, DataValue::Str(s)) => {
            let token = s.trim().to_lowercase();
            if TRUTHY.contains(&token.as_str()) {
                Ok(DataValue::Bool(true))
            } else if FALSY.contains(&token.as_str()) {
                Ok(DataValue::Bool(false))
            } else {
                Err(format!("column '{column}' expects bool, got '{s}'"))
            }
        }
    }
}

pub fn matches(row: &Row, predicate: Option<&Predicate>) -> bool {
    predicate.is_none_or(|p| p.iter().all(|(col, want)| row.get(col) == Some(want)))
}

/// Next id for a collection: one past the largest existing id, or 1 when empty.
/// `None` once the largest id is `i64::MAX`.
pub fn next_id(rows: &[Row]) -> Option<i64> {
    match rows.iter().filter_map(Row::id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Appends one row built from `raw` (one value per non-id column, in declared
/// order) and persists the table. Nothing is written unless every column coerces.
pub fn insert<S: Store + ?Sized>(
    store: &mut S,
    catalog: &Catalog,
    table: &str,
    raw: &[DataValue],
) -> Result<Vec<Row>> {
    let schema = catalog.schema(table)?;
    let columns: Vec<_> = schema.user_columns().collect();
    if raw.len() != columns.len() {
        return Err(DbError::ArityMismatch {
            expected: columns.len(),
            found: raw.len(),
        });
    }

    let mut rows = store.load_rows(table)?;
    let id = next_id(&rows).ok_or_else(|| DbError::IdsExhausted(table.to_string()))?;

    let mut row = Row::new();
    row.set(ID_COLUMN, DataValue::Int(id));
    let mut errors = Vec::new();
    for (col, value) in columns.iter().zip(raw) {
        match coerce(&col.name, col.ty, value) {
            Ok(v) => row.set(col.name.as_str(), v),
            Err(msg) => errors.push(msg),
        }
    }
    if !errors.is_empty() {
        return Err(DbError::ValidationFailed(errors));
    }

    rows.push(row);
    store.save_rows(table, &rows)?;
    info!(table, id, "row inserted");
    Ok(rows)
}

pub fn select(rows: &[Row], predicate: Option<&Predicate>) -> Vec<Row> {
    rows.iter()
        .filter(|row| matches(row, predicate))
        .cloned()
        .collect()
}

/// Overwrites every `set` column on matching rows. Returns the rows and how many matched.
pub fn update(mut rows: Vec<Row>, set: &SetClause, predicate: Option<&Predicate>) -> (Vec<Row>, usize) {
    let mut touched = 0;
    for row in rows.iter_mut().filter(|row| matches(row, predicate)) {
        for (col, value) in set {
            row.set(col.as_str(), value.clone());
        }
        touched += 1;
    }
    (rows, touched)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deletion {
    pub remaining: Vec<Row>,
    pub removed: Vec<Row>,
}

impl Deletion {
    pub fn count(&self) -> usize {
        self.removed.len()
    }

    pub fn removed_ids(&self) -> Vec<i64> {
        self.removed.iter().filter_map(Row::id).collect()
    }
}

/// Splits `rows` by `predicate`; no predicate truncates the table.
pub fn delete(rows: Vec<Row>, predicate: Option<&Predicate>) -> Deletion {
    let Some(predicate) = predicate else {
        return Deletion {
            remaining: Vec::new(),
            removed: rows,
        };
    };
    let (removed, remaining): (Vec<Row>, Vec<Row>) = rows
        .into_iter()
        .partition(|row| matches(row, Some(predicate)));
    Deletion { remaining, removed }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::JsonStore;
    use tempfile::tempdir;

    /// Store that refuses to write, to prove failed inserts never reach persistence.
    struct ReadOnly(Vec<Row>);

    impl Store for ReadOnly {
        fn load_catalog(&self) -> Result<Catalog> {
            Ok(Catalog::new())
        }
        fn save_catalog(&mut self, _: &Catalog) -> Result<()> {
            panic!("catalog must not be saved")
        }
        fn load_rows(&self, _: &str) -> Result<Vec<Row>> {
            Ok(self.0.clone())
        }
        fn save_rows(&mut self, _: &str, _: &[Row]) -> Result<()> {
            panic!("rows must not be saved")
        }
        fn remove_rows(&mut self, _: &str) -> Result<()> {
            panic!("rows must not be removed")
        }
    }

    fn users() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .define_table("users", &[("name", "str"), ("age", "int"), ("active", "bool")])
            .unwrap();
        catalog
    }

    fn s(v: &str) -> DataValue {
        DataValue::from(v)
    }

    fn row(id: i64, name: &str, age: i64) -> Row {
        [
            ("id", DataValue::Int(id)),
            ("name", s(name)),
            ("age", DataValue::Int(age)),
        ]
        .into_iter()
        .collect()
    }

    fn pred(col: &str, value: DataValue) -> Predicate {
        Predicate::from([(col.to_string(), value)])
    }

    #[test]
    fn test_coerce_bool_tokens() {
        for t in ["true", "TRUE", "1", "Yes", "да", "ДА"] {
            assert_eq!(coerce("f", DataType::Bool, &s(t)), Ok(DataValue::Bool(true)), "{t}");
        }
        for t in ["false", "0", "NO", "нет", "Нет"] {
            assert_eq!(coerce("f", DataType::Bool, &s(t)), Ok(DataValue::Bool(false)), "{t}");
        }
        let err = coerce("flag", DataType::Bool, &s("maybe")).unwrap_err();
        assert!(err.contains("flag") && err.contains("maybe"));
        assert_eq!(coerce("f", DataType::Bool, &DataValue::Int(5)), Ok(DataValue::Bool(true)));
        assert_eq!(coerce("f", DataType::Bool, &DataValue::Int(0)), Ok(DataValue::Bool(false)));
    }

    #[test]
    fn test_coerce_int_and_str() {
        assert_eq!(coerce("n", DataType::Int, &s(" 42 ")), Ok(DataValue::Int(42)));
        assert_eq!(coerce("n", DataType::Int, &s("-7")), Ok(DataValue::Int(-7)));
        assert!(coerce("n", DataType::Int, &s("4.2")).is_err());
        assert_eq!(coerce("s", DataType::Str, &DataValue::Int(3)), Ok(s("3")));
        assert_eq!(coerce("s", DataType::Str, &DataValue::Bool(true)), Ok(s("true")));
    }

    #[test]
    fn test_insert_assigns_ids() {
        let dir = tempdir().unwrap();
        let mut store = JsonStore::new(dir.path());
        let catalog = users();

        insert(&mut store, &catalog, "users", &[s("Alice"), s("30"), s("yes")]).unwrap();
        let rows = insert(&mut store, &catalog, "users", &[s("Bob"), DataValue::Int(25), s("0")]).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id(), Some(1));
        assert_eq!(rows[1].id(), Some(2));
        assert_eq!(rows[0].get("active"), Some(&DataValue::Bool(true)));
        assert_eq!(rows[1].get("active"), Some(&DataValue::Bool(false)));
        assert_eq!(store.load_rows("users").unwrap(), rows);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let dir = tempdir().unwrap();
        let mut store = JsonStore::new(dir.path());
        let catalog = users();
        for name in ["a", "b", "c"] {
            insert(&mut store, &catalog, "users", &[s(name), s("1"), s("no")]).unwrap();
        }
        let rows = store.load_rows("users").unwrap();
        let kept = delete(rows, Some(&pred("name", s("b")))).remaining;
        store.save_rows("users", &kept).unwrap();

        let rows = insert(&mut store, &catalog, "users", &[s("d"), s("1"), s("no")]).unwrap();
        let ids: Vec<_> = rows.iter().filter_map(Row::id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_next_id_at_max_is_exhausted() {
        assert_eq!(next_id(&[]), Some(1));
        assert_eq!(next_id(&[row(4, "a", 1), row(2, "b", 1)]), Some(5));
        assert_eq!(next_id(&[row(1, "a", 1), row(i64::MAX, "b", 1)]), None);

        let mut store = ReadOnly(vec![row(i64::MAX, "x", 1)]);
        let err = insert(&mut store, &users(), "users", &[s("y"), s("1"), s("no")]).unwrap_err();
        assert!(matches!(err, DbError::IdsExhausted(ref t) if t == "users"));
    }

    #[test]
    fn test_insert_collects_every_error() {
        let mut store = ReadOnly(vec![row(1, "x", 1)]);
        let err = insert(&mut store, &users(), "users", &[s("Al"), s("old"), s("perhaps")]).unwrap_err();
        match err {
            DbError::ValidationFailed(msgs) => {
                assert_eq!(msgs.len(), 2);
                assert!(msgs[0].contains("age"));
                assert!(msgs[1].contains("active"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_insert_rejects_arity_and_unknown_table() {
        let mut store = ReadOnly(Vec::new());
        let err = insert(&mut store, &users(), "users", &[s("only")]).unwrap_err();
        assert!(matches!(err, DbError::ArityMismatch { expected: 3, found: 1 }));
        let err = insert(&mut store, &users(), "ghosts", &[]).unwrap_err();
        assert!(matches!(err, DbError::NotFound(ref t) if t == "ghosts"));
    }

    #[test]
    fn test_select_filters_in_order() {
        let rows = vec![row(1, "a", 20), row(2, "b", 30), row(3, "c", 20)];
        assert_eq!(select(&rows, None), rows);
        let picked = select(&rows, Some(&pred("age", DataValue::Int(20))));
        assert_eq!(picked, vec![row(1, "a", 20), row(3, "c", 20)]);
        assert!(select(&rows, Some(&pred("missing", DataValue::Int(20)))).is_empty());
        // values of a different variant never compare equal
        assert!(select(&rows, Some(&pred("age", s("20")))).is_empty());
    }

    #[test]
    fn test_predicate_is_conjunctive() {
        let rows = vec![row(1, "a", 20), row(2, "a", 30)];
        let mut p = pred("name", s("a"));
        p.insert("age".to_string(), DataValue::Int(30));
        assert_eq!(select(&rows, Some(&p)), vec![row(2, "a", 30)]);
    }

    #[test]
    fn test_update() {
        let rows = vec![row(1, "a", 20), row(2, "b", 30)];
        let set = SetClause::from([
            ("age".to_string(), s("old")),
            ("extra".to_string(), DataValue::Bool(true)),
        ]);
        let (rows, n) = update(rows, &set, Some(&pred("id", DataValue::Int(2))));
        assert_eq!(n, 1);
        assert_eq!(rows[0], row(1, "a", 20));
        assert_eq!(rows[1].get("age"), Some(&s("old")));
        assert_eq!(rows[1].get("extra"), Some(&DataValue::Bool(true)));

        let (same, n) = update(rows.clone(), &SetClause::new(), None);
        assert_eq!(n, 2);
        assert_eq!(same, rows);
    }

    #[test]
    fn test_delete() {
        let rows = vec![row(1, "a", 20), row(2, "b", 30), row(3, "c", 20)];
        let out = delete(rows.clone(), Some(&pred("age", DataValue::Int(20))));
        assert_eq!(out.remaining, vec![row(2, "b", 30)]);
        assert_eq!(out.removed_ids(), vec![1, 3]);

        let all = delete(rows, None);
        assert!(all.remaining.is_empty());
        assert_eq!(all.count(), 3);
    }
}
