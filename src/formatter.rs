//! Rendering of command results for the shell.

use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::{Value as JsonValue, json};

use crate::config::OutputFormat;
use crate::executor::QueryResult;
use crate::storage::Row;

pub const HELP: &str = "\
Commands:
  create_table <name> <column:type> ...   create a table (types: int, str, bool)
  drop_table <name>                       drop a table and its rows
  list_tables                             list all tables
  insert <table> <value> ...              insert a row, one value per column
  select <table> [where <col> = <value>]  show matching rows
  update <table> set <col>=<value>[, ...] [where <col> = <value>]
  delete <table> [where <col> = <value>]  delete matching rows (all without where)
  help                                    show this message
  exit                                    leave the shell";

pub fn format_result(result: &QueryResult, format: OutputFormat) -> String {
    match (result, format) {
        (QueryResult::Rows { columns, rows }, OutputFormat::Table) => format_table(columns, rows),
        (QueryResult::Rows { columns, rows }, OutputFormat::Json) => format_json(columns, rows),
        (QueryResult::Tables(names), OutputFormat::Json) => json!(names).to_string(),
        (QueryResult::Tables(names), OutputFormat::Table) if names.is_empty() => {
            "No tables.".to_string()
        }
        (QueryResult::Tables(names), OutputFormat::Table) => names
            .iter()
            .map(|n| format!("- {n}"))
            .collect::<Vec<_>>()
            .join("\n"),
        (QueryResult::Created { table, columns }, _) => {
            format!("Table '{table}' created with columns: {}", columns.join(", "))
        }
        (QueryResult::Dropped { table }, _) => format!("Table '{table}' dropped."),
        (QueryResult::Inserted { table, id }, _) => {
            format!("Row with id={id} inserted into '{table}'.")
        }
        (QueryResult::Updated { table, ids }, _) => {
            format!("{} in '{table}' updated{}", plural(ids.len()), id_list(ids))
        }
        (QueryResult::Deleted { table, ids }, _) => {
            format!("{} deleted from '{table}'{}", plural(ids.len()), id_list(ids))
        }
        (QueryResult::Help, _) => HELP.to_string(),
        (QueryResult::Exit, _) => String::new(),
    }
}

fn plural(n: usize) -> String {
    format!("{n} row{}", if n == 1 { "" } else { "s" })
}

fn id_list(ids: &[i64]) -> String {
    if ids.is_empty() {
        ".".to_string()
    } else {
        let ids: Vec<String> = ids.iter().map(i64::to_string).collect();
        format!(" (id: {}).", ids.join(", "))
    }
}

/// Columns follow the schema; keys a row gained through `update` are appended.
fn display_columns(columns: &[String], rows: &[Row]) -> Vec<String> {
    let mut out = columns.to_vec();
    for row in rows {
        for (key, _) in row.iter() {
            if !out.contains(key) {
                out.push(key.clone());
            }
        }
    }
    out
}

fn format_table(columns: &[String], rows: &[Row]) -> String {
    if rows.is_empty() {
        return "No rows.".to_string();
    }
    let columns = display_columns(columns, rows);
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_header(columns.iter().map(Cell::new));

    for row in rows {
        let cells: Vec<Cell> = columns
            .iter()
            .map(|c| Cell::new(row.get(c).map(ToString::to_string).unwrap_or_default()))
            .collect();
        table.add_row(cells);
    }
    table.to_string()
}

fn format_json(columns: &[String], rows: &[Row]) -> String {
    let columns = display_columns(columns, rows);
    let rows: Vec<JsonValue> = rows
        .iter()
        .map(|row| {
            let mut obj = serde_json::Map::new();
            for c in &columns {
                if let Some(v) = row.get(c) {
                    obj.insert(c.clone(), json!(v));
                }
            }
            JsonValue::Object(obj)
        })
        .collect();
    serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
}
