//! The merged hymn catalog.
//!
//! A [`Catalog`] owns the primary [`Database`] and any number of secondary
//! read-only sources. Reads fan out to every source and are merged; writes
//! go to the primary store only.
//!
//! Source failures are isolated. A failing secondary is logged and skipped.
//! A failing primary is logged and skipped as well, as long as some other
//! source answered; when nothing answered the primary's error propagates.

use std::fs;

use hymnal_core::{Database, Hymn, HymnDraft, HymnFilter, HymnId, HymnSource, Origin};

use crate::config::Config;
use crate::error::{CatalogError, CatalogResult};
use crate::merge::{self, Ranked};

#[derive(Debug)]
pub struct Catalog {
    primary: Database,
    secondaries: Vec<Box<dyn HymnSource>>,
}

/// Tracks which sources answered during one read.
#[derive(Debug, Default)]
struct Outcome {
    responded: usize,
    primary_error: Option<hymnal_core::Error>,
}

impl Outcome {
    fn record_failure(&mut self, source: &dyn HymnSource, err: hymnal_core::Error) {
        if source.is_authoritative() {
            log::error!("Source {} failed, degrading: {}", source.name(), err);
            self.primary_error.get_or_insert(err);
        } else {
            log::warn!("Source {} failed, skipping: {}", source.name(), err);
        }
    }

    /// The primary's error, when no source answered at all.
    fn into_error(self) -> Option<CatalogError> {
        if self.responded == 0 {
            self.primary_error.map(CatalogError::Store)
        } else {
            None
        }
    }
}

impl Catalog {
    #[must_use]
    pub fn new(primary: Database) -> Self {
        Self {
            primary,
            secondaries: Vec::new(),
        }
    }

    /// Attach a secondary source. Sources are consulted in the order they
    /// were attached, after the primary store.
    #[must_use]
    pub fn with_source(mut self, source: impl HymnSource + 'static) -> Self {
        self.secondaries.push(Box::new(source));
        self
    }

    /// Open the configured primary database and attach the legacy store
    /// when one is configured.
    pub fn from_config(config: &Config) -> CatalogResult<Self> {
        if let Some(parent) = config.database_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut catalog = Self::new(Database::open(&config.database_path)?);

        if let Some(legacy) = config.legacy_store() {
            if !legacy.is_available() {
                log::warn!(
                    "Legacy store {} not found; continuing without it",
                    legacy.path().display()
                );
            }
            catalog = catalog.with_source(legacy);
        }
        Ok(catalog)
    }

    #[must_use]
    pub fn primary(&self) -> &Database {
        &self.primary
    }

    /// The primary store followed by every secondary source.
    pub fn sources(&self) -> Vec<&dyn HymnSource> {
        let mut sources: Vec<&dyn HymnSource> = Vec::with_capacity(1 + self.secondaries.len());
        sources.push(&self.primary);
        sources.extend(self.secondaries.iter().map(|s| s.as_ref() as &dyn HymnSource));
        sources
    }

    /// Hymns from every source matching the filter, one per number.
    pub fn list_hymns(&self, filter: &HymnFilter) -> CatalogResult<Vec<Hymn>> {
        let mut outcome = Outcome::default();
        let mut candidates = Vec::new();

        for source in self.sources() {
            match source.query(filter) {
                Ok(hymns) => {
                    log::debug!("Source {} returned {} hymns", source.name(), hymns.len());
                    outcome.responded += 1;
                    let authoritative = source.is_authoritative();
                    candidates.extend(hymns.into_iter().map(|h| Ranked::new(h, authoritative)));
                }
                Err(e) => outcome.record_failure(source, e),
            }
        }

        if let Some(err) = outcome.into_error() {
            return Err(err);
        }

        let gathered = candidates.len();
        let hymns = merge::merge(candidates);
        log::info!("Listed {} hymns ({} before dedup)", hymns.len(), gathered);
        Ok(hymns)
    }

    /// Search across every source. A blank term is rejected.
    pub fn search_hymns(&self, term: &str) -> CatalogResult<Vec<Hymn>> {
        if term.trim().is_empty() {
            return Err(CatalogError::Validation("search term is required".into()));
        }
        self.list_hymns(&HymnFilter::search(term))
    }

    /// Look up a hymn by id, consulting only the sources that own its
    /// identity space.
    pub fn get_hymn(&self, id: HymnId) -> CatalogResult<Hymn> {
        let mut outcome = Outcome::default();

        for source in self.sources() {
            if source.origin() != id.origin() {
                continue;
            }
            match source.lookup(id.native()) {
                Ok(Some(hymn)) => return Ok(hymn),
                Ok(None) => outcome.responded += 1,
                Err(e) if source.is_authoritative() => return Err(e.into()),
                Err(e) => outcome.record_failure(source, e),
            }
        }

        Err(CatalogError::not_found(id))
    }

    /// Look up a hymn by catalog number: the primary store first, then each
    /// secondary source until one has it.
    pub fn get_hymn_by_number(&self, number: &str) -> CatalogResult<Hymn> {
        let mut outcome = Outcome::default();

        for source in self.sources() {
            match source.lookup_number(number) {
                Ok(Some(hymn)) => return Ok(hymn),
                Ok(None) => outcome.responded += 1,
                Err(e) => outcome.record_failure(source, e),
            }
        }

        Err(outcome
            .into_error()
            .unwrap_or_else(|| CatalogError::not_found(number)))
    }

    pub fn create_hymn(&self, draft: &HymnDraft) -> CatalogResult<Hymn> {
        Ok(self.primary.insert_hymn(draft)?)
    }

    /// Replace a primary hymn's fields and verses.
    pub fn update_hymn(&self, id: HymnId, draft: &HymnDraft) -> CatalogResult<Hymn> {
        let native = writable(id)?;
        Ok(self.primary.update_hymn(native, draft)?)
    }

    pub fn delete_hymn(&self, id: HymnId) -> CatalogResult<()> {
        let native = writable(id)?;
        Ok(self.primary.delete_hymn(native)?)
    }
}

fn writable(id: HymnId) -> CatalogResult<i64> {
    match id.origin() {
        Origin::Primary => Ok(id.native()),
        Origin::Legacy => Err(CatalogError::ReadOnly { id }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hymnal_core::{Category, Verse, VerseKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// In-memory secondary source that records every call it receives.
    #[derive(Debug, Default)]
    struct FakeSource {
        hymns: Vec<Hymn>,
        failing: bool,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl FakeSource {
        fn with(hymns: Vec<Hymn>) -> Self {
            Self {
                hymns,
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                failing: true,
                ..Self::default()
            }
        }

        fn check(&self, call: String) -> hymnal_core::Result<()> {
            self.calls.borrow_mut().push(call);
            if self.failing {
                Err(hymnal_core::Error::SourceUnavailable {
                    source_name: "fake".into(),
                    reason: "offline".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    impl HymnSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        fn origin(&self) -> Origin {
            Origin::Legacy
        }

        fn query(&self, filter: &HymnFilter) -> hymnal_core::Result<Vec<Hymn>> {
            self.check(format!("query {:?}", filter.term()))?;
            Ok(self
                .hymns
                .iter()
                .filter(|h| filter.matches_category(h.category))
                .cloned()
                .collect())
        }

        fn lookup(&self, native_id: i64) -> hymnal_core::Result<Option<Hymn>> {
            self.check(format!("lookup {native_id}"))?;
            Ok(self
                .hymns
                .iter()
                .find(|h| h.id.native() == native_id)
                .cloned())
        }

        fn lookup_number(&self, number: &str) -> hymnal_core::Result<Option<Hymn>> {
            self.check(format!("lookup_number {number}"))?;
            Ok(self.hymns.iter().find(|h| h.number == number).cloned())
        }
    }

    fn legacy_hymn(id: i64, number: &str, title: &str) -> Hymn {
        Hymn::new(HymnId::legacy(id), number, title)
    }

    fn draft(number: &str, title: &str) -> HymnDraft {
        HymnDraft::new(number, title, Category::Standard)
            .with_verse(Verse::new(VerseKind::Verse(1)).with_lines(["line"]))
    }

    fn catalog() -> Catalog {
        Catalog::new(Database::open_in_memory().unwrap())
    }

    fn break_primary(catalog: &Catalog) {
        catalog
            .primary()
            .conn()
            .execute_batch("DROP TABLE verses; DROP TABLE hymns;")
            .unwrap();
    }

    #[test]
    fn test_list_merges_and_prefers_primary() {
        let catalog = catalog().with_source(FakeSource::with(vec![
            legacy_hymn(1, "101", "Legacy Title"),
            legacy_hymn(2, "C3", "Chant"),
        ]));
        catalog.create_hymn(&draft("101", "Primary Title")).unwrap();

        let hymns = catalog.list_hymns(&HymnFilter::all()).unwrap();
        assert_eq!(hymns.len(), 2);
        assert_eq!(hymns[0].number, "101");
        assert_eq!(hymns[0].title, "Primary Title");
        assert_eq!(hymns[1].id, HymnId::legacy(2));
    }

    #[test]
    fn test_list_applies_category_to_every_source() {
        let catalog = catalog().with_source(FakeSource::with(vec![
            legacy_hymn(1, "5", "Standard"),
            legacy_hymn(2, "C3", "Chant"),
        ]));
        catalog.create_hymn(&draft("7", "Mine")).unwrap();

        let chants = catalog
            .list_hymns(&HymnFilter::category(Category::Chant))
            .unwrap();
        assert_eq!(chants.len(), 1);
        assert_eq!(chants[0].number, "C3");
    }

    #[test]
    fn test_failing_secondary_is_absorbed() {
        let catalog = catalog().with_source(FakeSource::failing());
        catalog.create_hymn(&draft("1", "Only")).unwrap();

        let hymns = catalog.list_hymns(&HymnFilter::all()).unwrap();
        assert_eq!(hymns.len(), 1);
        assert_eq!(catalog.get_hymn_by_number("1").unwrap().title, "Only");
        assert!(catalog
            .get_hymn(HymnId::legacy(1))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_failing_primary_degrades_when_secondary_answers() {
        let catalog =
            catalog().with_source(FakeSource::with(vec![legacy_hymn(1, "S-5", "Legacy")]));
        break_primary(&catalog);

        let hymns = catalog.list_hymns(&HymnFilter::all()).unwrap();
        assert_eq!(hymns.len(), 1);
        assert_eq!(catalog.get_hymn_by_number("S-5").unwrap().title, "Legacy");
    }

    #[test]
    fn test_failing_primary_propagates_when_alone() {
        let catalog = catalog();
        break_primary(&catalog);

        let err = catalog.list_hymns(&HymnFilter::all()).unwrap_err();
        assert!(matches!(err, CatalogError::Store(_)));

        let err = catalog.get_hymn_by_number("1").unwrap_err();
        assert!(matches!(err, CatalogError::Store(_)));
    }

    #[test]
    fn test_failing_primary_propagates_when_every_source_fails() {
        let catalog = catalog().with_source(FakeSource::failing());
        break_primary(&catalog);

        assert!(matches!(
            catalog.list_hymns(&HymnFilter::all()),
            Err(CatalogError::Store(_))
        ));
    }

    #[test]
    fn test_get_routes_by_identity() {
        let fake = FakeSource::with(vec![legacy_hymn(5, "S-5", "Legacy")]);
        let calls = Rc::clone(&fake.calls);
        let catalog = catalog().with_source(fake);

        let hymn = catalog.get_hymn(HymnId::from_external(-5)).unwrap();
        assert_eq!(hymn.title, "Legacy");
        assert_eq!(*calls.borrow(), vec!["lookup 5".to_string()]);

        calls.borrow_mut().clear();
        let err = catalog.get_hymn(HymnId::from_external(5)).unwrap_err();
        assert!(err.is_not_found());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_get_by_number_short_circuits_on_primary() {
        let fake = FakeSource::with(vec![legacy_hymn(1, "101", "Legacy")]);
        let calls = Rc::clone(&fake.calls);
        let catalog = catalog().with_source(fake);
        catalog.create_hymn(&draft("101", "Primary")).unwrap();

        assert_eq!(catalog.get_hymn_by_number("101").unwrap().title, "Primary");
        assert!(calls.borrow().is_empty());

        assert!(catalog.get_hymn_by_number("999").unwrap_err().is_not_found());
        assert_eq!(*calls.borrow(), vec!["lookup_number 999".to_string()]);
    }

    #[test]
    fn test_search_rejects_blank_term() {
        let err = catalog().search_hymns("   ").unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn test_search_passes_term_to_sources() {
        let fake = FakeSource::default();
        let calls = Rc::clone(&fake.calls);
        let catalog = catalog().with_source(fake);

        catalog.search_hymns(" grace ").unwrap();
        assert_eq!(*calls.borrow(), vec!["query Some(\"grace\")".to_string()]);
    }

    #[test]
    fn test_writes_to_legacy_ids_are_read_only() {
        let catalog = catalog();
        let id = HymnId::legacy(3);

        assert!(matches!(
            catalog.update_hymn(id, &draft("1", "x")),
            Err(CatalogError::ReadOnly { .. })
        ));
        assert!(matches!(
            catalog.delete_hymn(id),
            Err(CatalogError::ReadOnly { .. })
        ));
    }

    #[test]
    fn test_write_errors_are_lifted() {
        let catalog = catalog();
        let created = catalog.create_hymn(&draft("101", "First")).unwrap();

        assert!(catalog
            .create_hymn(&draft("101", "Again"))
            .unwrap_err()
            .is_conflict());
        assert!(matches!(
            catalog.create_hymn(&HymnDraft::default()),
            Err(CatalogError::Validation(_))
        ));
        assert!(catalog
            .update_hymn(HymnId::primary(99), &draft("5", "x"))
            .unwrap_err()
            .is_not_found());

        catalog.delete_hymn(created.id).unwrap();
        assert!(catalog.delete_hymn(created.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_from_config_attaches_missing_legacy_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            database_path: dir.path().join("nested").join("hymnal.db"),
            legacy_path: Some(dir.path().join("absent.sqlite")),
            ..Config::default()
        };

        let catalog = Catalog::from_config(&config).unwrap();
        assert_eq!(catalog.sources().len(), 2);
        assert!(catalog.list_hymns(&HymnFilter::all()).unwrap().is_empty());
    }
}
