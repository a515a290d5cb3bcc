use serde_json::Value;

use crate::mock::Row;
use crate::value::sql_literal;

/// Build one multi-row `INSERT` for `table`.
///
/// Columns come from the first row's keys, in that row's key order. Later
/// rows missing a column get `NULL`; keys absent from the first row are
/// ignored. Returns `None` when there are no rows. Identifiers are written
/// verbatim. A first row without keys yields `INSERT INTO t ()` and is left
/// for the database to accept or reject.
pub fn serialize_insert(table: &str, rows: &[Row]) -> Option<String> {
    let first = rows.first()?;
    let columns: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut command = format!("INSERT INTO {table} ({})\nVALUES\n", columns.join(", "));

    for (idx, row) in rows.iter().enumerate() {
        let values: Vec<String> = columns
            .iter()
            .map(|column| sql_literal(row.get(*column).unwrap_or(&Value::Null)))
            .collect();
        command.push_str("\t(");
        command.push_str(&values.join(", "));
        command.push(')');
        command.push_str(if idx + 1 < rows.len() { ",\n" } else { ";" });
    }

    Some(command)
}
