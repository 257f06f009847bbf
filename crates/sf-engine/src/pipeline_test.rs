use super::*;
use sf_core::test_utils::sales_schema;
use sf_db::DuckDbBackend;

#[test]
fn test_step_order_and_names() {
    let names: Vec<&str> = NormalizeStep::ALL.iter().map(|s| s.name()).collect();
    assert_eq!(
        names,
        vec![
            "replicate_lookups",
            "populate_lookups",
            "populate_connection_points",
            "open_snapshot",
            "insert_facts",
            "resolve_lookup_keys",
            "resolve_reference_keys",
            "close_snapshot",
        ]
    );
    assert_eq!(NormalizeStep::InsertFacts.to_string(), "insert_facts");
}

#[test]
fn test_plan_statement_counts() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = DialectProfile::default();
    let schema = sales_schema();
    let plan = Normalizer::new(&db, &profile, &schema).plan(42).unwrap();

    let counts: Vec<(NormalizeStep, usize)> =
        plan.iter().map(|p| (p.step, p.statements.len())).collect();
    assert_eq!(
        counts,
        vec![
            (NormalizeStep::ReplicateLookups, 2),
            (NormalizeStep::PopulateLookups, 2),
            (NormalizeStep::PopulateConnectionPoints, 1),
            (NormalizeStep::OpenSnapshot, 2),
            (NormalizeStep::InsertFacts, 1),
            (NormalizeStep::ResolveLookupKeys, 2),
            (NormalizeStep::ResolveReferenceKeys, 1),
            (NormalizeStep::CloseSnapshot, 2),
        ]
    );
    assert!(plan[3].statements[0]
        .params
        .contains(&sf_core::SqlValue::Int(42)));
}

#[test]
fn test_lookup_keys_resolve_before_reference_keys() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = DialectProfile::default();
    let schema = sales_schema();
    let plan = Normalizer::new(&db, &profile, &schema).plan(0).unwrap();
    let lookups = &plan[5].statements;
    assert!(lookups[0].sql.contains("SET product_id"));
    assert!(lookups[1].sql.contains("SET region_id"));
    assert!(plan[6].statements[0].sql.contains("SET home_region_id"));
}

struct NoFacts;

impl FactLoader for NoFacts {
    fn name(&self) -> &str {
        "none"
    }

    fn statements(
        &self,
        _profile: &DialectProfile,
        _schema: &Schema,
    ) -> sf_sql::SqlResult<Vec<Statement>> {
        Ok(Vec::new())
    }
}

#[test]
fn test_custom_fact_loader() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = DialectProfile::default();
    let schema = sales_schema();
    let loader = NoFacts;
    let plan = Normalizer::new(&db, &profile, &schema)
        .with_fact_loader(&loader)
        .plan(0)
        .unwrap();
    assert!(plan[4].statements.is_empty());
}

#[test]
fn test_plan_rejects_invalid_schema() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = DialectProfile::default();
    let mut schema = sales_schema();
    schema.tables.retain(|t| t.name != "f_sales");
    let err = Normalizer::new(&db, &profile, &schema).plan(0).unwrap_err();
    assert!(matches!(err, EngineError::Core(_)));
}

#[tokio::test]
async fn test_run_without_ledger() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = DialectProfile::default();
    let schema = sales_schema();
    let err = Normalizer::new(&db, &profile, &schema)
        .run(NormalizeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::LedgerMissing(_)));
}
