use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{Result, SeedError};

/// One mock row: column name to value, in input key order.
pub type Row = Map<String, Value>;

/// Mock data document: table name to its rows.
pub type MockData = IndexMap<String, Vec<Row>>;

/// Parse a mock data document.
///
/// The document must be a JSON object whose values are arrays of objects.
pub fn parse_mock_data(raw: &str) -> Result<MockData> {
    serde_json::from_str(raw).map_err(|err| SeedError::MockDataParse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_table_and_column_order() {
        let data = parse_mock_data(
            r#"{"orders": [{"user_id": 1, "id": 10}], "users": [{"name": "a", "id": 1}]}"#,
        )
        .unwrap();
        let tables: Vec<&str> = data.keys().map(String::as_str).collect();
        assert_eq!(tables, vec!["orders", "users"]);
        let columns: Vec<&str> = data["users"][0].keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["name", "id"]);
    }

    #[test]
    fn rejects_documents_of_the_wrong_shape() {
        for raw in [r#"[{"id": 1}]"#, r#"{"users": {"id": 1}}"#, r#"{"users": [1, 2]}"#, "{"] {
            let err = parse_mock_data(raw).unwrap_err();
            assert!(matches!(err, SeedError::MockDataParse(_)), "{raw}");
        }
    }
}
