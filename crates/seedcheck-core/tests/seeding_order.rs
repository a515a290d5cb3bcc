use seedcheck_core::{
    MockData, SeedError, extract_dependencies, order_tables, parse_mock_data, serialize_insert,
};

const SHOP_SCHEMA: &str = "
CREATE TABLE users (id INT PRIMARY KEY);
CREATE TABLE orders (
    id INT PRIMARY KEY,
    user_id INT,
    FOREIGN KEY (user_id) REFERENCES users
);
CREATE INDEX idx_orders_user ON orders (user_id);
";

fn insert_plan(schema: &str, data: &MockData) -> Result<Vec<String>, SeedError> {
    let order = order_tables(&extract_dependencies(schema))?;
    let mut statements = Vec::new();
    for table in order {
        if let Some(rows) = data.get(&table) {
            if let Some(sql) = serialize_insert(&table, rows) {
                statements.push(sql);
            }
        }
    }
    Ok(statements)
}

#[test]
fn referenced_table_is_ordered_first() {
    let order = order_tables(&extract_dependencies(
        "CREATE TABLE users (id INT); \
         CREATE TABLE orders (id INT, FOREIGN KEY (user_id) REFERENCES users);",
    ))
    .expect("acyclic schema");
    assert_eq!(order, vec!["users", "orders"]);
}

#[test]
fn inserts_follow_dependency_order_not_document_order() {
    let data = parse_mock_data(r#"{"orders": [{"id": 1, "user_id": 1}], "users": [{"id": 1}]}"#)
        .expect("valid mock data");
    let statements = insert_plan(SHOP_SCHEMA, &data).expect("plan");
    assert_eq!(
        statements,
        vec![
            "INSERT INTO users (id)\nVALUES\n\t(1);".to_string(),
            "INSERT INTO orders (id, user_id)\nVALUES\n\t(1, 1);".to_string(),
        ]
    );
}

#[test]
fn empty_and_unknown_tables_produce_no_statements() {
    let data = parse_mock_data(r#"{"users": [], "ghosts": [{"id": 1}]}"#).expect("valid");
    assert!(insert_plan(SHOP_SCHEMA, &data).expect("plan").is_empty());
}

#[test]
fn mutual_references_fail_ordering() {
    let err = insert_plan(
        "CREATE TABLE a (FOREIGN KEY (b_id) REFERENCES b); \
         CREATE TABLE b (FOREIGN KEY (a_id) REFERENCES a);",
        &MockData::default(),
    )
    .unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("circular dependency"));
}
