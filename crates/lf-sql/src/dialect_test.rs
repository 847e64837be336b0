use super::*;

#[test]
fn test_duckdb_parse() {
    let dialect = DuckDbDialect::new();
    let stmts = dialect.parse("SELECT * FROM users").unwrap();
    assert_eq!(stmts.len(), 1);
}

#[test]
fn test_bigquery_parse_using_join() {
    let dialect = BigQueryDialect::new();
    let stmts = dialect
        .parse("SELECT * FROM table1 JOIN (SELECT * FROM table2) t2 USING(a)")
        .unwrap();
    assert_eq!(stmts.len(), 1);
}

#[test]
fn test_parse_error_location() {
    let dialect = DuckDbDialect::new();
    // Error is on line 2 (the FROM keyword with no columns)
    let result = dialect.parse("SELECT\nFROM users");
    assert!(result.is_err());
    if let Err(SqlError::ParseError {
        line,
        column,
        message,
    }) = result
    {
        assert_eq!(
            line, 2,
            "Expected line 2, got line {} (message: {})",
            line, message
        );
        assert!(
            column > 0,
            "Expected non-zero column, got {} (message: {})",
            column,
            message
        );
    }
}

#[test]
fn test_parse_location_extraction() {
    let (line, col) =
        super::parse_location_from_error("Expected: something at Line: 5, Column: 10");
    assert_eq!(line, 5);
    assert_eq!(col, 10);

    let (line, col) = super::parse_location_from_error("Some error without location");
    assert_eq!(line, 0);
    assert_eq!(col, 0);
}

#[test]
fn test_dialect_from_name() {
    assert_eq!(dialect_from_name("bigquery").unwrap().name(), "bigquery");
    assert_eq!(dialect_from_name("DuckDB").unwrap().name(), "duckdb");
    assert_eq!(dialect_from_name("snowflake").unwrap().name(), "snowflake");
    assert_eq!(dialect_from_name("postgresql").unwrap().name(), "postgres");
    assert!(matches!(
        dialect_from_name("oracle"),
        Err(SqlError::UnknownDialect(name)) if name == "oracle"
    ));
}

#[test]
fn test_declared_type_mapping_defaults() {
    let dialect = DuckDbDialect::new();
    assert_eq!(dialect.map_declared_type("str"), TypeTag::Text);
    assert_eq!(dialect.map_declared_type("int64"), TypeTag::BigInt);
    assert_eq!(dialect.map_declared_type("float64"), TypeTag::Double);
    assert_eq!(dialect.map_declared_type("bool"), TypeTag::Bool);
    assert_eq!(dialect.map_declared_type("INTEGER"), TypeTag::Int);
}

#[test]
fn test_bigquery_integer_aliases_widen() {
    let dialect = BigQueryDialect::new();
    assert_eq!(dialect.map_declared_type("INTEGER"), TypeTag::BigInt);
    assert_eq!(dialect.map_declared_type("int32"), TypeTag::BigInt);
    assert_eq!(dialect.map_declared_type("FLOAT"), TypeTag::Double);
    assert_eq!(dialect.map_declared_type("str"), TypeTag::Text);
}

#[test]
fn test_snowflake_float_is_double() {
    let dialect = SnowflakeDialect::new();
    assert_eq!(dialect.map_declared_type("FLOAT"), TypeTag::Double);
    assert_eq!(dialect.map_declared_type("NUMBER(38,0)"), TypeTag::Decimal);
}
