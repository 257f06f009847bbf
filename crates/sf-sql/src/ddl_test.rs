use super::*;
use sf_core::test_utils::sales_schema;
use sf_core::DialectKind;

fn duckdb() -> DialectProfile {
    DialectProfile::for_kind(DialectKind::DuckDb)
}

#[test]
fn test_lookup_table_ddl() {
    let schema = sales_schema();
    let table = schema.table_by_name("d_region").unwrap();
    let statements = create_table(&duckdb(), table);
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].sql, "CREATE SEQUENCE d_region_seq START 1");
    assert_eq!(
        statements[1].sql,
        "CREATE TABLE d_region (\n  id INTEGER DEFAULT nextval('d_region_seq'),\n  hashid VARCHAR UNIQUE,\n  nm_region VARCHAR,\n  PRIMARY KEY (id)\n)"
    );
}

#[test]
fn test_table_without_auto_increment_has_no_sequence() {
    let schema = sales_schema();
    let table = schema.table_by_name("f_sales").unwrap();
    let statements = create_table(&duckdb(), table);
    assert_eq!(statements.len(), 1);
    assert!(statements[0].sql.starts_with("CREATE TABLE f_sales ("));
}

#[test]
fn test_table_without_primary_key_omits_clause() {
    let table = Table::new("t", TableKind::Fact).with_column(Column::new("id", "INTEGER"));
    let statements = create_table(&duckdb(), &table);
    assert_eq!(statements[0].sql, "CREATE TABLE t (\n  id INTEGER\n)");
}

#[test]
fn test_composite_primary_key() {
    let table = Table::new("t", TableKind::Fact)
        .with_column(Column::new("a", "INTEGER").primary_key())
        .with_column(Column::new("b", "INTEGER").primary_key());
    let statements = create_table(&duckdb(), &table);
    assert!(statements[0].sql.ends_with("PRIMARY KEY (a,b)\n)"));
}

#[test]
fn test_derby_identity_inline() {
    let schema = sales_schema();
    let table = schema.table_by_name("d_product").unwrap();
    let statements = create_table(&DialectProfile::for_kind(DialectKind::Derby), table);
    assert_eq!(statements.len(), 1);
    assert!(statements[0]
        .sql
        .contains("id INTEGER GENERATED BY DEFAULT AS IDENTITY"));
}

#[test]
fn test_source_indexes_skip_keys() {
    let schema = sales_schema();
    let source = schema.source_table().unwrap();
    let indexes = create_source_indexes(source);
    let sql: Vec<&str> = indexes.iter().map(|s| s.sql.as_str()).collect();
    assert_eq!(sql.len(), 6);
    assert!(sql.contains(&"CREATE INDEX idx_o_sales_product ON o_sales(product)"));
    assert!(!sql.iter().any(|s| s.contains("o_genid")));
}

#[test]
fn test_indexes_only_for_source() {
    let schema = sales_schema();
    let fact = schema.fact_table().unwrap();
    assert!(create_source_indexes(fact).is_empty());
}

#[test]
fn test_schema_ddl_order() {
    let schema = sales_schema();
    let statements = schema_ddl(&duckdb(), &schema).unwrap();
    assert_eq!(statements[0].sql, "CREATE SEQUENCE o_sales_seq START 1");
    assert!(statements[1].sql.starts_with("CREATE TABLE o_sales ("));
    assert!(!statements.iter().any(|s| s.sql.contains("CREATE TABLE snapshots")));
    let last = statements.last().unwrap();
    assert!(last.sql.starts_with("INSERT INTO snapshots"));
    assert_eq!(last.params, vec![sf_core::SqlValue::from("f_sales")]);

    let creates: Vec<&str> = statements
        .iter()
        .filter(|s| s.sql.starts_with("CREATE TABLE"))
        .map(|s| s.sql.as_str())
        .collect();
    assert_eq!(creates.len(), 6);
}
