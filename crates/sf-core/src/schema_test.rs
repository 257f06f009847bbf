use super::*;
use crate::test_utils::{sales_schema, SALES_SCHEMA_YAML};

fn minimal() -> Schema {
    Schema::new("mini")
        .with_table(
            Table::new("o_src", TableKind::Source)
                .with_column(Column::new("o_genid", "INTEGER").primary_key().auto_increment())
                .with_column(Column::new("color", "VARCHAR")),
        )
        .with_table(
            Table::new("f_fact", TableKind::Fact)
                .with_column(Column::new("id", "INTEGER").primary_key())
                .with_column(Column::new("color_id", "INTEGER")),
        )
        .with_table(
            Table::new("d_color", TableKind::Lookup)
                .associated_with("color")
                .with_column(Column::new("id", "INTEGER").primary_key().auto_increment())
                .with_column(Column::new("hashid", "VARCHAR").unique())
                .with_column(Column::new("nm_color", "VARCHAR").from_source("color")),
        )
}

#[test]
fn test_fixture_parses() {
    let schema = sales_schema();
    assert_eq!(schema.name, "sales");
    assert_eq!(schema.tables.len(), 6);
    assert_eq!(schema.source_table().unwrap().name, "o_sales");
    assert_eq!(schema.fact_table().unwrap().name, "f_sales");
}

#[test]
fn test_tables_by_role_keep_declaration_order() {
    let schema = sales_schema();
    let lookups: Vec<&str> = schema.lookup_tables().map(|t| t.name.as_str()).collect();
    assert_eq!(lookups, vec!["d_product", "d_region"]);
    let cps: Vec<&str> = schema
        .connection_point_tables()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(cps, vec!["d_order"]);
    let refs: Vec<&str> = schema.reference_tables().map(|t| t.name.as_str()).collect();
    assert_eq!(refs, vec!["d_home_region"]);
}

#[test]
fn test_table_by_name_is_case_insensitive() {
    let schema = sales_schema();
    assert_eq!(schema.table_by_name("F_SALES").unwrap().kind, TableKind::Fact);
    let err = schema.table_by_name("nope").unwrap_err();
    assert!(matches!(err, CoreError::TableNotFound { .. }));
}

#[test]
fn test_associated_columns() {
    let schema = sales_schema();
    let product = schema.table_by_name("d_product").unwrap();
    let names: Vec<&str> = product.associated_columns().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["nm_product", "nm_category"]);
    assert_eq!(
        product.associated_source_columns(),
        vec!["product", "category"]
    );
    assert_eq!(product.foreign_key_column().as_deref(), Some("product_id"));
}

#[test]
fn test_primary_key_columns_in_declaration_order() {
    let table = Table::new("t", TableKind::Fact)
        .with_column(Column::new("b", "INT").primary_key())
        .with_column(Column::new("x", "INT"))
        .with_column(Column::new("a", "INT").primary_key());
    let pk: Vec<&str> = table.primary_key_columns().map(|c| c.name.as_str()).collect();
    assert_eq!(pk, vec!["b", "a"]);
}

#[test]
fn test_column_by_name_missing() {
    let schema = sales_schema();
    let fact = schema.fact_table().unwrap();
    let err = fact.column_by_name("quantity").unwrap_err();
    assert!(err.to_string().contains("C006"));
}

#[test]
fn test_ldm_type_unknown_value_maps_to_other() {
    let column: Column = serde_yaml::from_str("{ name: x, type: INT, ldm_type: hyperlink }").unwrap();
    assert_eq!(column.ldm_type, Some(LdmType::Other));
}

#[test]
fn test_minimal_builder_schema_validates() {
    minimal().validate().unwrap();
}

#[test]
fn test_missing_source_table() {
    let mut schema = minimal();
    schema.tables.retain(|t| t.kind != TableKind::Source);
    let err = schema.validate().unwrap_err();
    assert!(matches!(err, CoreError::MissingTable { ref kind, .. } if kind == "source"));
}

#[test]
fn test_multiple_fact_tables() {
    let schema = minimal().with_table(
        Table::new("f_other", TableKind::Fact).with_column(Column::new("id", "INTEGER")),
    );
    let err = schema.fact_table().unwrap_err();
    match err {
        CoreError::DuplicateTable { kind, tables, .. } => {
            assert_eq!(kind, "fact");
            assert_eq!(tables, "f_fact, f_other");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_table_identifier() {
    let schema = minimal().with_table(Table::new("bad name", TableKind::Lookup));
    let err = schema.validate().unwrap_err();
    assert!(matches!(err, CoreError::InvalidIdentifier { .. }));
}

#[test]
fn test_dimension_requires_associated_source_column() {
    let mut schema = minimal();
    schema.tables[2].associated_source_column = None;
    let err = schema.validate().unwrap_err();
    assert!(err.to_string().contains("associated_source_column"));
}

#[test]
fn test_dimension_requires_hashid() {
    let mut schema = minimal();
    schema.tables[2].columns.retain(|c| c.name != "hashid");
    let err = schema.validate().unwrap_err();
    assert!(err.to_string().contains("'hashid'"));
}

#[test]
fn test_fact_requires_foreign_key_column() {
    let mut schema = minimal();
    schema.tables[1].columns.retain(|c| c.name != "color_id");
    let err = schema.validate().unwrap_err();
    assert!(err.to_string().contains("color_id"));
}

#[test]
fn test_unknown_source_column_reference() {
    let mut schema = minimal();
    schema.tables[2].columns[2].source_column = Some("colour".to_string());
    let err = schema.validate().unwrap_err();
    assert!(err.to_string().contains("colour"));
}

#[test]
fn test_replication_target_must_exist() {
    let schema = minimal().with_replication(LookupReplication {
        referenced_lookup: "d_color".to_string(),
        referenced_column: "nm_color".to_string(),
        referencing_lookup: "d_missing".to_string(),
        referencing_column: "nm".to_string(),
    });
    let err = schema.validate().unwrap_err();
    assert!(matches!(err, CoreError::TableNotFound { ref name } if name == "d_missing"));
}

#[test]
fn test_duplicate_table_names() {
    let yaml = SALES_SCHEMA_YAML.replace("name: d_region\n", "name: d_product\n");
    let err = Schema::from_yaml(&yaml).unwrap_err();
    assert!(err.to_string().contains("defined twice"));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.yml");
    std::fs::write(&path, SALES_SCHEMA_YAML).unwrap();
    let schema = Schema::load(&path).unwrap();
    assert_eq!(schema, sales_schema());
}

#[test]
fn test_load_missing_file() {
    let err = Schema::load(Path::new("/nonexistent/schema.yml")).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}
