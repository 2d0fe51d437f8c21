use std::path::Path;

use anyhow::{Context, Result};
use hymnal_catalog::{export, Config, ExportFormat};
use hymnal_core::HymnId;

use super::open_catalog;

/// Render a hymn to stdout, or to a file in `out`.
pub fn run_export(config: &Config, id: i64, format: ExportFormat, out: Option<&Path>) -> Result<()> {
    let catalog = open_catalog(config)?;
    let hymn = catalog
        .get_hymn(HymnId::from_external(id))
        .with_context(|| format!("No hymn with id {id}"))?;

    match out {
        Some(dir) => {
            let path = export::write_file(dir, &hymn, format)?;
            println!("✓ Wrote {}", path.display());
        }
        None => print!("{}", format.render(&hymn)),
    }
    Ok(())
}
