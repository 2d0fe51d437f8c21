use anyhow::Result;
use hymnal_catalog::Config;

use super::open_catalog;

pub fn show_status(config: &Config) -> Result<()> {
    let catalog = open_catalog(config)?;
    let primary_count = catalog.primary().count_hymns()?;

    println!("\nHymnal Status\n");
    println!("  Database: {}", config.database_path.display());
    println!("  Primary hymns: {primary_count}");

    match config.legacy_store() {
        None => println!("  Legacy export: not configured"),
        Some(legacy) => {
            println!("  Legacy export: {}", legacy.path().display());
            match legacy.try_count() {
                Ok(count) => println!("  Legacy hymns: {count}"),
                Err(e) => println!("  Legacy hymns: unavailable ({e})"),
            }
        }
    }

    if primary_count == 0 && config.legacy_path.is_some() {
        println!("\n  Run `hymnal import-legacy` to copy legacy hymns into the database");
    }

    Ok(())
}
