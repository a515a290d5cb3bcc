use serde_json::Value;

/// Render a mock value as a SQL literal.
///
/// Strings are single-quoted with embedded quotes doubled; nothing else is
/// escaped. Objects and arrays are stored as compact JSON text literals.
pub fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(text) => quote(text),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Object(_) | Value::Array(_) => quote(&value.to_string()),
    }
}

/// Double every single quote so `text` can sit inside a quoted literal.
pub fn escape_string(text: &str) -> String {
    text.replace('\'', "''")
}

fn quote(text: &str) -> String {
    format!("'{}'", escape_string(text))
}
