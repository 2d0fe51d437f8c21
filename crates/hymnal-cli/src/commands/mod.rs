pub mod config;
pub mod edit;
pub mod export;
pub mod hymns;
pub mod import;
pub mod status;

use anyhow::{Context, Result};
use hymnal_catalog::{export as text, Catalog, Config};
use hymnal_core::Hymn;

/// Open the catalog described by the configuration.
pub fn open_catalog(config: &Config) -> Result<Catalog> {
    Catalog::from_config(config).with_context(|| {
        format!(
            "Failed to open database at {}",
            config.database_path.display()
        )
    })
}

/// One aligned line per hymn: id, number, category, title.
pub fn summary_line(hymn: &Hymn) -> String {
    format!(
        "{:>6}  {:<8} {:<13} {}",
        hymn.id.to_external(),
        hymn.number,
        hymn.category.as_str(),
        hymn.title
    )
}

pub fn print_hymns(hymns: &[Hymn], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(hymns)?);
        return Ok(());
    }

    if hymns.is_empty() {
        println!("No hymns found.");
        return Ok(());
    }
    for hymn in hymns {
        println!("{}", summary_line(hymn));
    }
    println!("\n{} hymn(s)", hymns.len());
    Ok(())
}

pub fn print_hymn(hymn: &Hymn, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(hymn)?);
    } else {
        println!("id: {}  category: {}\n", hymn.id, hymn.category);
        print!("{}", text::holyrics_text(hymn));
        if hymn.key.is_some() || hymn.bpm.is_some() {
            println!();
        }
    }
    Ok(())
}
