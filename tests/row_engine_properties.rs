//! Properties of the row engine and persistence that must hold for any input.

use primitive_db::executor::rows::{self, Predicate, SetClause};
use primitive_db::storage::{DataValue, JsonStore, Row, Store};
use primitive_db::{Catalog, DbError};
use proptest::prelude::*;
use tempfile::tempdir;

fn arb_value() -> impl Strategy<Value = DataValue> {
    prop_oneof![
        (-3i64..3).prop_map(DataValue::Int),
        any::<bool>().prop_map(DataValue::Bool),
        "[a-c]{0,2}".prop_map(DataValue::Str),
    ]
}

fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec((arb_value(), arb_value()), 0..24).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (a, b))| {
                [
                    ("id", DataValue::Int(i as i64 + 1)),
                    ("a", a),
                    ("b", b),
                ]
                .into_iter()
                .collect::<Row>()
            })
            .collect::<Vec<Row>>()
    })
}

fn arb_predicate() -> impl Strategy<Value = Option<Predicate>> {
    let column = prop_oneof![Just("a"), Just("b"), Just("missing")];
    prop::option::of(
        prop::collection::btree_map(column.prop_map(String::from), arb_value(), 1..3),
    )
}

proptest! {
    #[test]
    fn select_and_delete_partition_rows(rows in arb_rows(), p in arb_predicate()) {
        let selected = rows::select(&rows, p.as_ref());
        let deletion = rows::delete(rows.clone(), p.as_ref());
        if p.is_some() {
            prop_assert_eq!(&selected, &deletion.removed);
            prop_assert_eq!(selected.len() + deletion.remaining.len(), rows.len());
        } else {
            prop_assert_eq!(selected, rows.clone());
            prop_assert!(deletion.remaining.is_empty());
            prop_assert_eq!(deletion.count(), rows.len());
        }
    }

    #[test]
    fn delete_keeps_relative_order(rows in arb_rows(), p in arb_predicate()) {
        let remaining = rows::delete(rows.clone(), p.as_ref()).remaining;
        let ids: Vec<i64> = remaining.iter().filter_map(Row::id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        prop_assert_eq!(ids, sorted);
    }

    #[test]
    fn empty_set_clause_changes_nothing(rows in arb_rows(), p in arb_predicate()) {
        let matching = rows::select(&rows, p.as_ref()).len();
        let (updated, touched) = rows::update(rows.clone(), &SetClause::new(), p.as_ref());
        prop_assert_eq!(updated, rows);
        prop_assert_eq!(touched, matching);
    }

    #[test]
    fn rows_survive_save_and_load(rows in arb_rows()) {
        let dir = tempdir().unwrap();
        let mut store = JsonStore::new(dir.path());
        store.save_rows("t", &rows).unwrap();
        prop_assert_eq!(store.load_rows("t").unwrap(), rows);
    }

    #[test]
    fn defined_table_listed_once(names in prop::collection::vec("[a-z]{1,6}", 1..6)) {
        let mut catalog = Catalog::new();
        let columns: Vec<(String, &str)> = names.iter().map(|n| (format!("c_{n}"), "str")).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        for name in &names {
            let _ = catalog.define_table(name, &columns[..1]);
        }
        prop_assert_eq!(catalog.list_tables(), unique.clone());
        for name in &unique {
            let schema = catalog.schema(name).unwrap();
            prop_assert_eq!(schema.columns[0].name.as_str(), "id");
        }
    }
}

#[test]
fn insert_scenario_from_empty_table() {
    let dir = tempdir().unwrap();
    let mut store = JsonStore::new(dir.path());
    let mut catalog = Catalog::new();
    catalog
        .define_table("people", &[("name", "str"), ("active", "bool")])
        .unwrap();
    store.save_catalog(&catalog).unwrap();

    rows::insert(&mut store, &catalog, "people", &["Alice".into(), "yes".into()]).unwrap();
    let rows = rows::insert(&mut store, &catalog, "people", &["Bob".into(), "0".into()]).unwrap();

    assert_eq!(rows[0].id(), Some(1));
    assert_eq!(rows[0].get("active"), Some(&DataValue::Bool(true)));
    assert_eq!(rows[1].id(), Some(2));
    assert_eq!(rows[1].get("active"), Some(&DataValue::Bool(false)));
}

#[test]
fn failed_insert_persists_nothing() {
    let dir = tempdir().unwrap();
    let mut store = JsonStore::new(dir.path());
    let mut catalog = Catalog::new();
    catalog.define_table("n", &[("count", "int")]).unwrap();

    rows::insert(&mut store, &catalog, "n", &[DataValue::Int(1)]).unwrap();
    let before = std::fs::read_to_string(store.rows_path("n")).unwrap();

    let err = rows::insert(&mut store, &catalog, "n", &["many".into()]).unwrap_err();
    assert!(matches!(err, DbError::ValidationFailed(ref msgs) if msgs.len() == 1));
    assert_eq!(std::fs::read_to_string(store.rows_path("n")).unwrap(), before);
}

#[test]
fn define_twice_keeps_first_schema() {
    let mut catalog = Catalog::new();
    catalog.define_table("t", &[("a", "int")]).unwrap();
    let snapshot = catalog.clone();
    let err = catalog.define_table("t", &[("b", "bool")]).unwrap_err();
    assert!(matches!(err, DbError::AlreadyExists(_)));
    assert_eq!(catalog, snapshot);
}
