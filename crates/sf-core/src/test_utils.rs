//! Shared test fixtures for crates built on sf-core

use crate::schema::Schema;

/// A small sales star schema touching every table kind.
///
/// - `o_sales` source with product/category/region/order/home-region columns
/// - `f_sales` fact with one measure and four foreign keys
/// - `d_product` lookup keyed by (product, category)
/// - `d_region` lookup keyed by region
/// - `d_order` connection point keyed by order number
/// - `d_home_region` reference replicated from `d_region.region`
pub const SALES_SCHEMA_YAML: &str = r#"
name: sales
tables:
  - name: o_sales
    kind: source
    columns:
      - { name: o_genid, type: INTEGER, primary_key: true, auto_increment: true }
      - { name: product, type: VARCHAR }
      - { name: category, type: VARCHAR }
      - { name: region, type: VARCHAR }
      - { name: order_no, type: VARCHAR }
      - { name: home_region, type: VARCHAR }
      - { name: amount, type: DOUBLE }
  - name: f_sales
    kind: fact
    columns:
      - { name: id, type: INTEGER, primary_key: true }
      - { name: amount, type: DOUBLE, source_column: amount, ldm_type: fact }
      - { name: product_id, type: INTEGER }
      - { name: region_id, type: INTEGER }
      - { name: home_region_id, type: INTEGER }
  - name: d_product
    kind: lookup
    associated_source_column: product
    columns:
      - { name: id, type: INTEGER, primary_key: true, auto_increment: true }
      - { name: hashid, type: VARCHAR, unique: true }
      - { name: nm_product, type: VARCHAR, source_column: product, ldm_type: attribute }
      - { name: nm_category, type: VARCHAR, source_column: category, ldm_type: label }
  - name: d_region
    kind: lookup
    associated_source_column: region
    columns:
      - { name: id, type: INTEGER, primary_key: true, auto_increment: true }
      - { name: hashid, type: VARCHAR, unique: true }
      - { name: nm_region, type: VARCHAR, source_column: region, ldm_type: attribute }
  - name: d_order
    kind: connection_point
    associated_source_column: order
    columns:
      - { name: id, type: INTEGER, primary_key: true }
      - { name: hashid, type: VARCHAR }
      - { name: nm_order, type: VARCHAR, source_column: order_no, ldm_type: connection_point }
  - name: d_home_region
    kind: reference
    associated_source_column: home_region
    columns:
      - { name: id, type: INTEGER, primary_key: true }
      - { name: hashid, type: VARCHAR, unique: true }
      - { name: nm_home_region, type: VARCHAR, source_column: home_region, ldm_type: reference }
lookup_replications:
  - referenced_lookup: d_region
    referenced_column: nm_region
    referencing_lookup: d_home_region
    referencing_column: nm_home_region
"#;

/// Parse [`SALES_SCHEMA_YAML`]
pub fn sales_schema() -> Schema {
    Schema::from_yaml(SALES_SCHEMA_YAML).expect("sales fixture schema is valid")
}
