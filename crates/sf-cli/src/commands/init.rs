//! Init command implementation - scaffolds a new Starflow project

use anyhow::{Context, Result};
use sf_core::DialectKind;
use std::fs;
use std::path::Path;

use crate::cli::InitArgs;

const SCHEMA_TEMPLATE: &str = r#"name: sales
tables:
  - name: o_sales
    kind: source
    columns:
      - { name: o_genid, type: INTEGER, primary_key: true, auto_increment: true }
      - { name: product, type: VARCHAR }
      - { name: region, type: VARCHAR }
      - { name: amount, type: DOUBLE }
  - name: f_sales
    kind: fact
    columns:
      - { name: id, type: INTEGER, primary_key: true }
      - { name: amount, type: DOUBLE, source_column: amount, ldm_type: fact }
      - { name: product_id, type: INTEGER }
      - { name: region_id, type: INTEGER }
  - name: d_product
    kind: lookup
    associated_source_column: product
    columns:
      - { name: id, type: INTEGER, primary_key: true, auto_increment: true }
      - { name: hashid, type: VARCHAR, unique: true }
      - { name: nm_product, type: VARCHAR, source_column: product, ldm_type: attribute }
  - name: d_region
    kind: lookup
    associated_source_column: region
    columns:
      - { name: id, type: INTEGER, primary_key: true, auto_increment: true }
      - { name: hashid, type: VARCHAR, unique: true }
      - { name: nm_region, type: VARCHAR, source_column: region, ldm_type: attribute }
"#;

const SAMPLE_CSV: &str = "product,region,amount\nwidget,north,10.5\ngadget,south,4.25\nwidget,south,7\n";

/// Execute the init command
pub(crate) async fn execute(args: &InitArgs) -> Result<()> {
    // Reject names that could cause path traversal or confusing directory names
    if args.name.contains('/')
        || args.name.contains('\\')
        || args.name.contains("..")
        || args.name.starts_with('.')
        || args.name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid project name '{}': must not contain '/', '\\', '..', or start with '.' or '-'",
            args.name
        );
    }
    let dialect: DialectKind = args.dialect.parse()?;

    let project_dir = Path::new(&args.name);
    if project_dir.exists() {
        anyhow::bail!(
            "Directory '{}' already exists. Choose a different project name.",
            args.name
        );
    }

    println!("Creating new Starflow project: {}\n", args.name);
    for dir in ["", "data"] {
        let path = project_dir.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }

    let config_content = render_config(&args.name, dialect, &args.database_path);
    let files = [
        ("starflow.yml", config_content.as_str()),
        ("schema.yml", SCHEMA_TEMPLATE),
        ("data/o_sales.csv", SAMPLE_CSV),
    ];
    for (name, content) in files {
        let path = project_dir.join(name);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  created {}", name);
    }

    println!("\nNext steps:");
    println!("  cd {}", args.name);
    println!("  sf materialize");
    println!("  sf extract --file data/o_sales.csv");
    println!("  sf normalize");
    Ok(())
}

fn render_config(name: &str, dialect: DialectKind, database_path: &str) -> String {
    // Escape YAML special characters in interpolated values
    let safe_name = name.replace('"', "\\\"");
    let safe_db_path = database_path.replace('"', "\\\"");
    format!(
        r#"name: "{safe_name}"
schema: schema.yml
dialect: {dialect}

database:
  type: duckdb
  path: "{safe_db_path}"

load_parts:
  - name: sales
    file: f_sales.csv
    columns: [id, amount, product_id, region_id]
  - name: products
    file: d_product.csv
    columns: [id, nm_product]
"#
    )
}
