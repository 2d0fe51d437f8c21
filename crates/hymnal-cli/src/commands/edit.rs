use std::path::Path;

use anyhow::{Context, Result};
use hymnal_catalog::Config;
use hymnal_core::{HymnDraft, HymnId};

use super::{open_catalog, print_hymn};

/// Read a hymn draft from a JSON file.
fn read_draft(path: &Path) -> Result<HymnDraft> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid hymn draft in {}", path.display()))
}

pub fn create(config: &Config, file: &Path, json: bool) -> Result<()> {
    let draft = read_draft(file)?;
    let catalog = open_catalog(config)?;

    let hymn = catalog.create_hymn(&draft)?;
    if json {
        return print_hymn(&hymn, true);
    }
    println!("✓ Created hymn {} ({}) with id {}", hymn.number, hymn.title, hymn.id);
    Ok(())
}

pub fn update(config: &Config, id: i64, file: &Path, json: bool) -> Result<()> {
    let draft = read_draft(file)?;
    let catalog = open_catalog(config)?;

    let hymn = catalog.update_hymn(HymnId::from_external(id), &draft)?;
    if json {
        return print_hymn(&hymn, true);
    }
    println!(
        "✓ Updated hymn {} ({}), {} verse(s)",
        hymn.id,
        hymn.number,
        hymn.verses.len()
    );
    Ok(())
}

pub fn delete(config: &Config, id: i64) -> Result<()> {
    let catalog = open_catalog(config)?;
    catalog.delete_hymn(HymnId::from_external(id))?;
    println!("✓ Deleted hymn {id}");
    Ok(())
}
