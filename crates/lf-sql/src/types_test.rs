use super::*;

#[test]
fn test_declared_short_names() {
    assert_eq!(TypeTag::from_declared("str"), TypeTag::Text);
    assert_eq!(TypeTag::from_declared("int64"), TypeTag::BigInt);
    assert_eq!(TypeTag::from_declared("float64"), TypeTag::Double);
    assert_eq!(TypeTag::from_declared("bool"), TypeTag::Bool);
    assert_eq!(TypeTag::from_declared("int32"), TypeTag::Int);
    assert_eq!(TypeTag::from_declared("  INT64 "), TypeTag::BigInt);
}

#[test]
fn test_declared_falls_back_to_sql_names() {
    assert_eq!(TypeTag::from_declared("VARCHAR(255)"), TypeTag::Varchar);
    assert_eq!(TypeTag::from_declared("decimal(10, 2)"), TypeTag::Decimal);
    assert_eq!(TypeTag::from_declared("timestamp"), TypeTag::Timestamp);
    assert_eq!(TypeTag::from_declared("geography"), TypeTag::Unknown);
}

#[test]
fn test_sql_names() {
    assert_eq!(TypeTag::from_sql_name("INT64"), TypeTag::BigInt);
    assert_eq!(TypeTag::from_sql_name("FLOAT64"), TypeTag::Double);
    assert_eq!(TypeTag::from_sql_name("STRING"), TypeTag::Text);
    assert_eq!(TypeTag::from_sql_name("double precision"), TypeTag::Double);
    assert_eq!(TypeTag::from_sql_name("NUMERIC(38,9)"), TypeTag::Decimal);
    assert_eq!(TypeTag::from_sql_name("ARRAY<INT64>"), TypeTag::Unknown);
}

#[test]
fn test_display_is_canonical() {
    assert_eq!(TypeTag::Text.to_string(), "TEXT");
    assert_eq!(TypeTag::Varchar.to_string(), "VARCHAR");
    assert_eq!(TypeTag::BigInt.to_string(), "BIGINT");
    assert_eq!(TypeTag::Unknown.to_string(), "UNKNOWN");
}

#[test]
fn test_from_str_rejects_unknown_names() {
    assert_eq!("bigint".parse::<TypeTag>(), Ok(TypeTag::BigInt));
    assert_eq!("UNKNOWN".parse::<TypeTag>(), Ok(TypeTag::Unknown));
    assert!("not_a_type".parse::<TypeTag>().is_err());
}

#[test]
fn test_serde_as_string() {
    let json = serde_json::to_string(&TypeTag::Double).unwrap();
    assert_eq!(json, "\"DOUBLE\"");
    let back: TypeTag = serde_json::from_str("\"text\"").unwrap();
    assert_eq!(back, TypeTag::Text);
}

#[test]
fn test_families() {
    assert!(TypeTag::BigInt.is_integer());
    assert!(!TypeTag::Double.is_integer());
    assert!(TypeTag::Float.is_float());
    assert!(TypeTag::Unknown.is_unknown());
}
