//! The read-provider seam between the stores and the merge layer.

use std::fmt;

use crate::error::Result;
use crate::model::{Category, Hymn, HymnFilter, Origin};

/// A store the catalog can read hymns from.
///
/// Implementations return fully formed [`Hymn`] records and propagate their
/// failures; deciding which failures to absorb is the caller's job.
pub trait HymnSource: fmt::Debug {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Which identity space this source's ids belong to.
    fn origin(&self) -> Origin;

    /// Authoritative sources win when two sources hold the same number.
    fn is_authoritative(&self) -> bool {
        self.origin() == Origin::Primary
    }

    /// Records matching the filter, ordered by catalog number.
    fn query(&self, filter: &HymnFilter) -> Result<Vec<Hymn>>;

    /// Look up a record by the source's native row id.
    fn lookup(&self, native_id: i64) -> Result<Option<Hymn>>;

    /// Look up a record by catalog number, falling back to normalized
    /// matching when there is no exact hit.
    fn lookup_number(&self, number: &str) -> Result<Option<Hymn>>;

    fn search(&self, term: &str) -> Result<Vec<Hymn>> {
        self.query(&HymnFilter::search(term))
    }

    fn filter_by_category(&self, category: Category) -> Result<Vec<Hymn>> {
        self.query(&HymnFilter::category(category))
    }
}
