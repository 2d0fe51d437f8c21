use anyhow::{Context, Result};
use hymnal_catalog::{import_legacy, Config};
use hymnal_core::Database;

/// Copy every legacy hymn with a free number into the primary database.
pub fn run_import(config: &Config, json: bool) -> Result<()> {
    let legacy = config.legacy_store().context(
        "No legacy export configured; pass --legacy or set legacy_path in the config file",
    )?;

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::open(&config.database_path).context("Failed to open database")?;

    println!("Importing from {}", legacy.path().display());
    let report = import_legacy(&db, &legacy)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("  Imported: {}", report.imported);
    println!("  Skipped (number already present): {}", report.skipped);
    println!("  Failed: {}", report.failed);
    if report.failed > 0 {
        println!("\n  Run with RUST_LOG=warn to see why records failed");
    }
    Ok(())
}
