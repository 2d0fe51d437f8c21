//! One-time copy of legacy hymns into the primary store.
//!
//! Every legacy record whose number is still free in the primary store is
//! inserted as a new primary hymn. Records that fail are logged and counted;
//! the import keeps going. The legacy store is only read.

use serde::Serialize;

use hymnal_core::{Database, HymnDraft, HymnFilter, LegacyStore};

use crate::error::CatalogResult;

/// Counts from one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    /// Numbers already present in the primary store.
    pub skipped: usize,
    pub failed: usize,
}

/// Copy legacy hymns whose number is not yet taken in `db`.
///
/// Fails only when the legacy store cannot be read at all or the primary
/// store cannot be queried.
pub fn import_legacy(db: &Database, legacy: &LegacyStore) -> CatalogResult<ImportReport> {
    let hymns = legacy.try_list(&HymnFilter::all())?;
    log::info!("Importing {} legacy hymns", hymns.len());

    let mut report = ImportReport::default();
    for hymn in hymns {
        if db.number_taken(&hymn.number, None)? {
            log::debug!("Skipping legacy hymn {}: number taken", hymn.number);
            report.skipped += 1;
            continue;
        }

        match db.insert_hymn(&HymnDraft::from_hymn(&hymn)) {
            Ok(created) => {
                log::debug!("Imported legacy hymn {} as {}", hymn.id, created.id);
                report.imported += 1;
            }
            Err(e) => {
                log::warn!("Failed to import legacy hymn {}: {}", hymn.id, e);
                report.failed += 1;
            }
        }
    }

    log::info!(
        "Legacy import finished: {} imported, {} skipped, {} failed",
        report.imported,
        report.skipped,
        report.failed
    );
    Ok(report)
}
