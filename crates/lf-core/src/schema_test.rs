use super::*;
use std::io::Write;

fn items_orders() -> Schema {
    Schema::new()
        .with_table(
            "items",
            [
                ("item_id", "str"),
                ("price", "float64"),
                ("in_stock", "bool"),
            ],
        )
        .with_table("orders", [("order_id", "str"), ("somecol", "int64")])
}

#[test]
fn test_builder_preserves_order() {
    let schema = items_orders();
    assert_eq!(schema.len(), 2);
    let items = schema.table("items").unwrap();
    let names: Vec<&str> = items.column_names().collect();
    assert_eq!(names, vec!["item_id", "price", "in_stock"]);
}

#[test]
fn test_yaml_preserves_document_order() {
    let yaml = r#"
zeta:
  z: str
  a: int64
alpha:
  m: bool
"#;
    let schema: Schema = serde_yaml::from_str(yaml).unwrap();
    let tables: Vec<&str> = schema.tables().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tables, vec!["zeta", "alpha"]);
    let cols: Vec<&str> = schema.tables()[0].column_names().collect();
    assert_eq!(cols, vec!["z", "a"]);
}

#[test]
fn test_json_preserves_document_order() {
    let json = r#"{"table2": {"c": "int64", "a": "str"}, "table1": {"a": "str"}}"#;
    let schema: Schema = serde_json::from_str(json).unwrap();
    assert_eq!(schema.tables()[0].name, "table2");
    let cols: Vec<&str> = schema.tables()[0].column_names().collect();
    assert_eq!(cols, vec!["c", "a"]);
}

#[test]
fn test_table_lookup_order() {
    let schema = Schema::new()
        .with_table("Orders", [("id", "str")])
        .with_table("orders", [("id", "int64")])
        .with_table("customers", [("id", "str")]);

    // Exact match wins over case-insensitive
    assert_eq!(
        schema.table("orders").unwrap().columns[0].declared_type,
        "int64"
    );
    assert_eq!(schema.table("CUSTOMERS").unwrap().name, "customers");
    // Qualified reference falls back to its last segment
    assert_eq!(schema.table("raw.customers").unwrap().name, "customers");
    assert!(schema.table("raw.missing").is_none());
    assert!(schema.table("missing").is_none());
}

#[test]
fn test_column_lookup_case_insensitive() {
    let schema = items_orders();
    let items = schema.table("items").unwrap();
    let (pos, col) = items.column("PRICE").unwrap();
    assert_eq!(pos, 1);
    assert_eq!(col.declared_type, "float64");
    assert!(items.column("nope").is_none());
}

#[test]
fn test_serialize_round_trips_order() {
    let schema = items_orders();
    let json = serde_json::to_string(&schema).unwrap();
    assert_eq!(
        json,
        r#"{"items":{"item_id":"str","price":"float64","in_stock":"bool"},"orders":{"order_id":"str","somecol":"int64"}}"#
    );
}

#[test]
fn test_validate_rejects_duplicates_and_empty_tables() {
    let dup_col = Schema::new().with_table("t", [("a", "str"), ("A", "int64")]);
    assert!(matches!(
        dup_col.validate(),
        Err(CoreError::ConfigInvalid { .. })
    ));

    let dup_table = Schema::new()
        .with_table("t", [("a", "str")])
        .with_table("T", [("b", "str")]);
    assert!(matches!(
        dup_table.validate(),
        Err(CoreError::ConfigInvalid { .. })
    ));

    let empty: Schema = serde_yaml::from_str("t: {}").unwrap();
    assert!(matches!(
        empty.validate(),
        Err(CoreError::ConfigInvalid { .. })
    ));

    assert!(items_orders().validate().is_ok());
}

#[test]
fn test_empty_table_name_rejected_at_parse() {
    let result: Result<Schema, _> = serde_json::from_str(r#"{"": {"a": "str"}}"#);
    assert!(result.is_err());
}

#[test]
#[should_panic(expected = "TableName must not be empty")]
fn test_builder_panics_on_empty_table_name() {
    let _ = Schema::new().with_table("", [("a", "str")]);
}

#[test]
#[should_panic(expected = "ColumnName must not be empty")]
fn test_builder_panics_on_empty_column_name() {
    let _ = Schema::new().with_table("t", [("", "str")]);
}

#[test]
fn test_load_yaml_and_json_files() {
    let dir = tempfile::tempdir().unwrap();

    let yaml_path = dir.path().join("schema.yml");
    let mut f = std::fs::File::create(&yaml_path).unwrap();
    writeln!(f, "employees:\n  id: str\n  manager_id: str").unwrap();
    let schema = Schema::load(&yaml_path).unwrap();
    assert_eq!(schema.table("employees").unwrap().columns.len(), 2);

    let json_path = dir.path().join("schema.json");
    std::fs::write(&json_path, r#"{"salaries": {"salary": "int64"}}"#).unwrap();
    let schema = Schema::load(&json_path).unwrap();
    assert!(schema.table("salaries").is_some());
}

#[test]
fn test_load_missing_file() {
    let result = Schema::load(Path::new("/nonexistent/schema.yml"));
    assert!(matches!(result, Err(CoreError::ConfigNotFound { .. })));
}

#[test]
fn test_load_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(matches!(
        Schema::load(&path),
        Err(CoreError::ConfigParseError { .. })
    ));
}
