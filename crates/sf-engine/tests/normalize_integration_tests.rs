//! End-to-end normalization against an in-memory DuckDB.
//!
//! Each test materializes the sales fixture schema, appends rows to the
//! source table and runs the normalize pipeline one or more times.

use sf_core::test_utils::sales_schema;
use sf_core::{DialectProfile, LoadPart, Schema, SqlValue};
use sf_db::{Database, DuckDbBackend};
use sf_engine::{
    initialize_ledger, materialize_schema, EngineError, NormalizeOptions, NormalizeReport,
    NormalizeStep, Normalizer, SnapshotLedger,
};
use sf_sql::{FactLoader, LoadQueryBuilder, SqlResult, Statement};

// ── Helpers ────────────────────────────────────────────────────────────

async fn setup_with(schema: &Schema) -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = DialectProfile::default();
    initialize_ledger(&db, &profile).await.unwrap();
    materialize_schema(&db, &profile, schema).await.unwrap();
    db
}

async fn setup() -> (DuckDbBackend, Schema) {
    let schema = sales_schema();
    let db = setup_with(&schema).await;
    (db, schema)
}

/// Append source rows of (product, category, region, order_no, home_region, amount)
async fn add_sales(db: &DuckDbBackend, rows: &[(&str, &str, &str, &str, &str, f64)]) {
    for (product, category, region, order_no, home_region, amount) in rows {
        db.execute_with_params(
            "INSERT INTO o_sales(product,category,region,order_no,home_region,amount) VALUES (?,?,?,?,?,?)",
            &[
                SqlValue::from(*product),
                SqlValue::from(*category),
                SqlValue::from(*region),
                SqlValue::from(*order_no),
                SqlValue::from(*home_region),
                SqlValue::Float(*amount),
            ],
        )
        .await
        .unwrap();
    }
}

/// Append `n` distinct-order rows cycling through a few products and regions
async fn add_generated_sales(db: &DuckDbBackend, start: usize, n: usize) {
    let products = ["widget", "gadget", "gizmo"];
    let regions = ["north", "south"];
    for i in start..start + n {
        let order = format!("ord-{i}");
        add_sales(
            db,
            &[(
                products[i % products.len()],
                "tools",
                regions[i % regions.len()],
                order.as_str(),
                regions[(i + 1) % regions.len()],
                i as f64,
            )],
        )
        .await;
    }
}

async fn normalize(db: &DuckDbBackend, schema: &Schema) -> NormalizeReport {
    let profile = DialectProfile::default();
    Normalizer::new(db, &profile, schema)
        .run(NormalizeOptions::default())
        .await
        .unwrap()
}

async fn count(db: &DuckDbBackend, sql: &str) -> i64 {
    db.query_scalar(sql, &[]).await.unwrap().as_i64().unwrap()
}

// ── Materialization ────────────────────────────────────────────────────

#[tokio::test]
async fn test_primary_keys_read_back_in_declaration_order() {
    let mut schema = sales_schema();
    let source = schema
        .tables
        .iter_mut()
        .find(|t| t.name == "o_sales")
        .unwrap();
    for column in source.columns.iter_mut() {
        if column.name == "order_no" {
            column.primary_key = true;
        }
    }
    let db = setup_with(&schema).await;

    for table in &schema.tables {
        let sql = format!(
            "SELECT name FROM pragma_table_info('{}') WHERE pk ORDER BY cid",
            table.name
        );
        let rows = db.query_rows(&sql, &[], 1).await.unwrap();
        let actual: Vec<String> = rows
            .into_iter()
            .map(|r| r[0].as_str().unwrap().to_string())
            .collect();
        let expected: Vec<String> = table.primary_key_columns().map(|c| c.name.clone()).collect();
        assert_eq!(actual, expected, "primary key of {}", table.name);
    }
}

// ── Normalize ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_first_run_on_empty_fact_table() {
    let (db, schema) = setup().await;
    add_sales(
        &db,
        &[
            ("widget", "tools", "north", "o1", "south", 10.0),
            ("widget", "tools", "south", "o2", "north", 20.0),
            ("gadget", "toys", "north", "o3", "north", 5.0),
        ],
    )
    .await;

    let report = normalize(&db, &schema).await;
    assert_eq!(report.new_fact_rows(), 3);
    assert_eq!(report.rows_affected(NormalizeStep::PopulateLookups), 4);
    assert!(!report.resumed);

    let snapshot = report.snapshot.unwrap();
    assert_eq!(snapshot.first_id, Some(0));
    assert_eq!(snapshot.last_id, Some(3));

    assert_eq!(count(&db, "SELECT COUNT(*) FROM d_product").await, 2);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM d_region").await, 2);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM d_order").await, 3);
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM f_sales WHERE product_id IS NULL OR region_id IS NULL").await,
        0
    );
}

#[tokio::test]
async fn test_rerun_without_new_rows_is_idempotent() {
    let (db, schema) = setup().await;
    add_generated_sales(&db, 0, 6).await;
    normalize(&db, &schema).await;

    let report = normalize(&db, &schema).await;
    assert_eq!(report.new_fact_rows(), 0);
    assert_eq!(report.rows_affected(NormalizeStep::PopulateLookups), 0);
    assert_eq!(report.rows_affected(NormalizeStep::PopulateConnectionPoints), 0);

    for dim in ["d_product", "d_region", "d_order"] {
        let dupes = count(
            &db,
            &format!("SELECT COUNT(*) - COUNT(DISTINCT hashid) FROM {dim}"),
        )
        .await;
        assert_eq!(dupes, 0, "{dim}");
    }
    assert_eq!(count(&db, "SELECT COUNT(*) FROM f_sales").await, 6);

    // An empty batch closes with firstid one past lastid
    let snapshot = report.snapshot.unwrap();
    assert_eq!(snapshot.first_id, Some(7));
    assert_eq!(snapshot.last_id, Some(6));
}

#[tokio::test]
async fn test_incremental_batch_of_five() {
    let (db, schema) = setup().await;
    add_generated_sales(&db, 0, 10).await;
    let first = normalize(&db, &schema).await;
    assert_eq!(first.snapshot.unwrap().last_id, Some(10));

    add_generated_sales(&db, 10, 5).await;
    let report = normalize(&db, &schema).await;
    assert_eq!(report.new_fact_rows(), 5);
    let snapshot = report.snapshot.unwrap();
    assert_eq!(snapshot.first_id, Some(11));
    assert_eq!(snapshot.last_id, Some(15));

    assert_eq!(
        count(
            &db,
            "SELECT COUNT(*) FROM f_sales WHERE id BETWEEN 11 AND 15 AND product_id IS NOT NULL AND region_id IS NOT NULL"
        )
        .await,
        5
    );
    let correctly_joined = count(
        &db,
        "SELECT COUNT(*) FROM f_sales f \
         JOIN o_sales o ON o.o_genid = f.id \
         JOIN d_product p ON p.id = f.product_id \
         JOIN d_region r ON r.id = f.region_id \
         WHERE p.nm_product = o.product AND p.nm_category = o.category AND r.nm_region = o.region",
    )
    .await;
    assert_eq!(correctly_joined, 15);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM d_product").await, 3);
}

#[tokio::test]
async fn test_replication_fully_replaces_referencing_lookup() {
    let (db, schema) = setup().await;
    db.execute_batch(
        "INSERT INTO d_region(id, hashid, nm_region) VALUES (1, 'A', 'A'), (2, 'B', 'B');
         INSERT INTO d_home_region(id, hashid, nm_home_region) VALUES (99, 'Z', 'Z');",
    )
    .await
    .unwrap();

    let report = normalize(&db, &schema).await;
    assert_eq!(report.rows_affected(NormalizeStep::ReplicateLookups), 3);

    let rows = db
        .query_rows(
            "SELECT id, nm_home_region, hashid FROM d_home_region ORDER BY id",
            &[],
            3,
        )
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![
            vec![SqlValue::Int(1), SqlValue::from("A"), SqlValue::from("A")],
            vec![SqlValue::Int(2), SqlValue::from("B"), SqlValue::from("B")],
        ]
    );
}

#[tokio::test]
async fn test_references_resolve_against_previous_batch() {
    let (db, schema) = setup().await;
    add_sales(
        &db,
        &[
            ("widget", "tools", "north", "o1", "north", 1.0),
            ("widget", "tools", "south", "o2", "north", 2.0),
        ],
    )
    .await;

    // Replication runs before this batch's regions exist
    let first = normalize(&db, &schema).await;
    assert_eq!(
        first.diagnostics.unmatched_foreign_keys.get("home_region_id"),
        Some(&2)
    );
    assert_eq!(
        first.diagnostics.unmatched_foreign_keys.get("region_id"),
        Some(&0)
    );

    add_sales(&db, &[("gadget", "toys", "north", "o3", "south", 3.0)]).await;
    let second = normalize(&db, &schema).await;
    assert_eq!(
        second.diagnostics.unmatched_foreign_keys.get("home_region_id"),
        Some(&0)
    );
    let resolved = count(
        &db,
        "SELECT COUNT(*) FROM f_sales f JOIN d_home_region h ON h.id = f.home_region_id WHERE f.id = 3 AND h.nm_home_region = 'south'",
    )
    .await;
    assert_eq!(resolved, 1);
}

#[tokio::test]
async fn test_connection_point_duplicates_within_batch() {
    let (db, schema) = setup().await;
    add_sales(
        &db,
        &[
            ("widget", "tools", "north", "shared", "north", 1.0),
            ("gadget", "tools", "north", "shared", "north", 2.0),
        ],
    )
    .await;
    normalize(&db, &schema).await;
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM d_order WHERE nm_order = 'shared'").await,
        2
    );

    // A later batch does not add the key again: its hash is already present
    add_sales(&db, &[("gizmo", "tools", "north", "shared", "north", 3.0)]).await;
    normalize(&db, &schema).await;
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM d_order WHERE nm_order = 'shared'").await,
        2
    );
}

#[tokio::test]
async fn test_hash_collision_is_reported() {
    let (db, schema) = setup().await;
    add_sales(&db, &[("a%b", "c", "north", "o1", "north", 1.0)]).await;
    let first = normalize(&db, &schema).await;
    assert_eq!(first.diagnostics.hash_collisions.get("d_product"), Some(&0));
    assert_eq!(first.diagnostics.total_hash_collisions(), 0);

    add_sales(&db, &[("a", "b%c", "north", "o2", "north", 2.0)]).await;
    let second = normalize(&db, &schema).await;
    assert_eq!(second.diagnostics.hash_collisions.get("d_product"), Some(&1));
    assert!(second.diagnostics.has_warnings());
    assert_eq!(count(&db, "SELECT COUNT(*) FROM d_product").await, 1);
}

#[tokio::test]
async fn test_hash_collision_within_one_batch_keeps_first_key() {
    let (db, schema) = setup().await;
    add_sales(
        &db,
        &[
            ("a%b", "c", "north", "o1", "north", 1.0),
            ("a", "b%c", "north", "o2", "north", 2.0),
        ],
    )
    .await;
    let report = normalize(&db, &schema).await;

    assert_eq!(report.diagnostics.hash_collisions.get("d_product"), Some(&1));
    assert_eq!(report.rows_affected(NormalizeStep::PopulateLookups), 2);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM d_product").await, 1);
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM d_product WHERE nm_product = 'a%b' AND nm_category = 'c'").await,
        1
    );
    // Both fact rows resolve to the surviving lookup row
    assert_eq!(
        count(&db, "SELECT COUNT(DISTINCT product_id) FROM f_sales WHERE product_id IS NOT NULL").await,
        1
    );
    assert_eq!(report.diagnostics.unmatched_foreign_keys.get("product_id"), Some(&0));
    assert_eq!(report.snapshot.unwrap().last_id, Some(2));
}

// ── Failure and resume ─────────────────────────────────────────────────

struct BrokenLoader;

impl FactLoader for BrokenLoader {
    fn name(&self) -> &str {
        "broken"
    }

    fn statements(&self, _profile: &DialectProfile, _schema: &Schema) -> SqlResult<Vec<Statement>> {
        Ok(vec![Statement::new("INSERT INTO missing_table VALUES (1)")])
    }
}

#[tokio::test]
async fn test_failed_step_stops_pipeline_and_resume_closes_snapshot() {
    let (db, schema) = setup().await;
    let profile = DialectProfile::default();
    add_generated_sales(&db, 0, 4).await;

    let err = Normalizer::new(&db, &profile, &schema)
        .with_fact_loader(&BrokenLoader)
        .run(NormalizeOptions::default())
        .await
        .unwrap_err();
    match err {
        EngineError::StepFailed { step, source } => {
            assert_eq!(step, NormalizeStep::InsertFacts);
            assert!(matches!(*source, EngineError::Db(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    // Steps before the failure ran, later ones did not
    assert_eq!(count(&db, "SELECT COUNT(*) FROM d_product").await, 3);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM f_sales").await, 0);

    let ledger = SnapshotLedger::new(&db, "f_sales");
    assert_eq!(ledger.unresolved().await.unwrap().len(), 1);

    let err = Normalizer::new(&db, &profile, &schema)
        .run(NormalizeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnresolvedSnapshot { .. }));

    let report = Normalizer::new(&db, &profile, &schema)
        .run(NormalizeOptions { resume: true })
        .await
        .unwrap();
    assert!(report.resumed);
    assert!(report.step(NormalizeStep::OpenSnapshot).unwrap().skipped);
    assert_eq!(report.new_fact_rows(), 4);
    assert!(ledger.unresolved().await.unwrap().is_empty());

    let records = ledger.records().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].first_id, Some(0));
    assert_eq!(records[1].last_id, Some(4));
}

// ── Load queries ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_load_query_restricts_to_snapshots() {
    let (db, schema) = setup().await;
    add_generated_sales(&db, 0, 10).await;
    normalize(&db, &schema).await;
    add_generated_sales(&db, 10, 5).await;
    normalize(&db, &schema).await;
    add_generated_sales(&db, 15, 2).await;
    normalize(&db, &schema).await;

    let ids: Vec<i64> = SnapshotLedger::new(&db, "f_sales")
        .records()
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids.len(), 4);

    let builder = LoadQueryBuilder::new(&schema);
    let part = LoadPart::new("sales", "f_sales.csv", ["id", "amount"]);
    let stmt = builder.statement(&part, &[ids[2], ids[3]]).unwrap();
    let rows = db.query_rows(&stmt.sql, &stmt.params, 2).await.unwrap();
    let mut fact_ids: Vec<i64> = rows.iter().map(|r| r[0].as_i64().unwrap()).collect();
    fact_ids.sort_unstable();
    assert_eq!(fact_ids, (11..=17).collect::<Vec<_>>());

    let all = builder.statement(&part, &[]).unwrap();
    assert_eq!(db.query_rows(&all.sql, &all.params, 2).await.unwrap().len(), 17);

    let regions = LoadPart::new("regions", "d_region.csv", ["id", "nm_region"]);
    let stmt = builder.statement(&regions, &[ids[2]]).unwrap();
    assert_eq!(db.query_rows(&stmt.sql, &stmt.params, 2).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_report_serializes() {
    let (db, schema) = setup().await;
    add_generated_sales(&db, 0, 2).await;
    let report = normalize(&db, &schema).await;
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["fact_table"], "f_sales");
    assert_eq!(json["steps"][4]["step"], "insert_facts");
    assert_eq!(json["steps"][4]["rows_affected"], 2);
    assert!(json["steps"][3].get("skipped").is_none());
    assert_eq!(json["snapshot"]["last_id"], 2);
}
