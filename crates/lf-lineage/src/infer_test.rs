use super::*;
use crate::functions::FunctionRegistry;
use crate::lowering::ScopeBuilder;
use lf_sql::SqlParser;

fn schema() -> Schema {
    Schema::new()
        .with_table(
            "sales",
            [
                ("id", "str"),
                ("amount", "int64"),
                ("price", "float64"),
                ("qty", "int32"),
                ("total", "DECIMAL(10,2)"),
                ("sold_on", "DATE"),
                ("region", "str"),
            ],
        )
        .with_table("regions", [("region", "str"), ("name", "VARCHAR(32)")])
}

fn infer_with(dialect: &str, sql: &str, functions: &dyn FunctionSignatures) -> Vec<TypeTag> {
    let parser = SqlParser::from_dialect_name(dialect).unwrap();
    let stmt = parser.parse(sql).unwrap().remove(0);
    let schema = schema();
    let (arena, root) = ScopeBuilder::new(&schema, parser.dialect())
        .build(&stmt)
        .unwrap();
    let inferencer = TypeInferencer::new(&arena, &schema, parser.dialect(), functions);
    (0..arena.get(root).slots.len())
        .map(|i| inferencer.infer_slot(root, i).unwrap())
        .collect()
}

fn infer(sql: &str) -> Vec<TypeTag> {
    infer_with("bigquery", sql, &FunctionRegistry::standard())
}

#[test]
fn test_declared_types_through_dialect() {
    assert_eq!(
        infer("SELECT id, amount, price, qty, total, sold_on FROM sales"),
        vec![
            TypeTag::Text,
            TypeTag::BigInt,
            TypeTag::Double,
            TypeTag::BigInt,
            TypeTag::Decimal,
            TypeTag::Date
        ]
    );
}

#[test]
fn test_duckdb_keeps_int_width() {
    let types = infer_with("duckdb", "SELECT qty FROM sales", &FunctionRegistry::standard());
    assert_eq!(types, vec![TypeTag::Int]);
}

#[test]
fn test_literals() {
    assert_eq!(
        infer("SELECT 'a', 1, 1.5, TRUE, NULL FROM sales"),
        vec![
            TypeTag::Varchar,
            TypeTag::Int,
            TypeTag::Double,
            TypeTag::Bool,
            TypeTag::Unknown
        ]
    );
}

#[test]
fn test_function_signatures() {
    assert_eq!(
        infer(
            "SELECT COUNT(*), SUM(amount), SUM(price), SUM(total), AVG(amount), \
             LENGTH(id), CONCAT(id, region), NOW(), MAX(sold_on) FROM sales"
        ),
        vec![
            TypeTag::BigInt,
            TypeTag::BigInt,
            TypeTag::Double,
            TypeTag::Decimal,
            TypeTag::Double,
            TypeTag::BigInt,
            TypeTag::Text,
            TypeTag::Unknown,
            TypeTag::Date
        ]
    );
}

#[test]
fn test_custom_function_registry() {
    let registry = FunctionRegistry::standard().with_return_type("now", TypeTag::Timestamp);
    assert_eq!(
        infer_with("bigquery", "SELECT NOW() AS ts FROM sales", &registry),
        vec![TypeTag::Timestamp]
    );
}

#[test]
fn test_operators() {
    assert_eq!(
        infer(
            "SELECT amount > 1, amount + qty, price / 2, amount * 2, id || region, \
             NOT (amount > 1), -amount, amount IS NULL, amount BETWEEN 1 AND 2 FROM sales"
        ),
        vec![
            TypeTag::Bool,
            TypeTag::BigInt,
            TypeTag::Double,
            TypeTag::BigInt,
            TypeTag::Text,
            TypeTag::Bool,
            TypeTag::BigInt,
            TypeTag::Bool,
            TypeTag::Bool
        ]
    );
}

#[test]
fn test_integer_literal_adopts_column_width() {
    assert_eq!(
        infer("SELECT amount + 1, 1 + amount, 1 + 2, price + 1, amount + 1.5 FROM sales"),
        vec![
            TypeTag::BigInt,
            TypeTag::BigInt,
            TypeTag::Int,
            TypeTag::Unknown,
            TypeTag::Unknown
        ]
    );
}

#[test]
fn test_if_takes_branch_type() {
    assert_eq!(
        infer("SELECT IF(amount > 1, price, 0.0), IF(qty > 0, 'yes', 'no') FROM sales"),
        vec![TypeTag::Double, TypeTag::Varchar]
    );
}

#[test]
fn test_cast_uses_target_type() {
    assert_eq!(
        infer("SELECT CAST(amount AS STRING), CAST(id AS INT64) FROM sales"),
        vec![TypeTag::Text, TypeTag::BigInt]
    );
}

#[test]
fn test_case_types() {
    assert_eq!(
        infer(
            "SELECT \
               CASE WHEN amount > 10 THEN 'big' ELSE 'small' END, \
               CASE WHEN amount > 10 THEN 'big' ELSE NULL END, \
               CASE WHEN amount > 10 THEN amount ELSE 0 END, \
               CASE WHEN amount > 10 THEN NULL ELSE id END, \
               CASE WHEN amount > 10 THEN NULL END \
             FROM sales"
        ),
        vec![
            TypeTag::Varchar,
            TypeTag::Varchar,
            TypeTag::BigInt,
            TypeTag::Text,
            TypeTag::Unknown
        ]
    );
}

#[test]
fn test_using_column_takes_first_side() {
    assert_eq!(
        infer("SELECT region, name FROM sales JOIN regions USING (region)"),
        vec![TypeTag::Text, TypeTag::Varchar]
    );
}

#[test]
fn test_set_operation_takes_first_branch() {
    assert_eq!(
        infer("SELECT amount FROM sales UNION ALL SELECT 'x' FROM regions"),
        vec![TypeTag::BigInt]
    );
}

#[test]
fn test_scalar_subquery_and_derived_table() {
    assert_eq!(
        infer(
            "SELECT (SELECT AVG(amount) FROM sales) AS avg_amount, d.n \
             FROM (SELECT COUNT(*) AS n FROM regions) d"
        ),
        vec![TypeTag::Double, TypeTag::BigInt]
    );
}
