//! Deduplication of hymns gathered from several sources.
//!
//! Records are grouped by catalog number, compared case-insensitively. Each
//! group keeps one record: one from an authoritative source beats one that
//! is not, and otherwise the higher external id wins. Primary ids are
//! positive and legacy ids negative, so with the two stock sources a
//! primary record always hides a legacy record with the same number.

use std::collections::HashMap;

use hymnal_core::Hymn;

/// A hymn tagged with the standing of the source it came from.
#[derive(Debug, Clone)]
pub struct Ranked {
    pub hymn: Hymn,
    pub authoritative: bool,
}

impl Ranked {
    #[must_use]
    pub fn new(hymn: Hymn, authoritative: bool) -> Self {
        Self {
            hymn,
            authoritative,
        }
    }

    fn rank(&self) -> (bool, i64) {
        (self.authoritative, self.hymn.id.to_external())
    }
}

/// Keep one hymn per catalog number, ordered lexically by number.
#[must_use]
pub fn merge<I>(candidates: I) -> Vec<Hymn>
where
    I: IntoIterator<Item = Ranked>,
{
    let mut winners: HashMap<String, Ranked> = HashMap::new();

    for candidate in candidates {
        let key = candidate.hymn.merge_key();
        match winners.get(&key) {
            Some(current) if current.rank() >= candidate.rank() => {}
            _ => {
                winners.insert(key, candidate);
            }
        }
    }

    let mut hymns: Vec<Hymn> = winners.into_values().map(|r| r.hymn).collect();
    hymns.sort_by(|a, b| a.number.cmp(&b.number));
    hymns
}
