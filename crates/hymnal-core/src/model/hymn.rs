use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Category, HymnId, Verse};
use crate::number;

/// A titled lyric work, from either store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hymn {
    pub id: HymnId,

    /// Human-facing catalog number ("101", "S-38").
    pub number: String,

    pub title: String,
    pub category: Category,

    /// Name of the hymnal this text comes from.
    pub hymn_book: String,

    /// Musical key (e.g., "G", "Eb").
    pub key: Option<String>,

    /// Tempo in beats per minute.
    pub bpm: Option<u32>,

    pub verses: Vec<Verse>,
}

impl Hymn {
    #[must_use]
    pub fn new(id: HymnId, number: impl Into<String>, title: impl Into<String>) -> Self {
        let number = number.into();
        Self {
            id,
            category: Category::infer(&number),
            number,
            title: title.into(),
            hymn_book: String::new(),
            key: None,
            bpm: None,
            verses: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_hymn_book(mut self, hymn_book: impl Into<String>) -> Self {
        self.hymn_book = hymn_book.into();
        self
    }

    #[must_use]
    pub fn with_verses(mut self, verses: Vec<Verse>) -> Self {
        self.verses = verses;
        self
    }

    /// Key used to treat records from different stores as the same hymn.
    #[must_use]
    pub fn merge_key(&self) -> String {
        self.number.trim().to_lowercase()
    }
}

/// Input for creating or replacing a primary-store hymn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HymnDraft {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub hymn_book: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub bpm: Option<u32>,
    #[serde(default)]
    pub verses: Vec<Verse>,
}

impl HymnDraft {
    #[must_use]
    pub fn new(number: impl Into<String>, title: impl Into<String>, category: Category) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            category: Some(category),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_hymn_book(mut self, hymn_book: impl Into<String>) -> Self {
        self.hymn_book = hymn_book.into();
        self
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_bpm(mut self, bpm: u32) -> Self {
        self.bpm = Some(bpm);
        self
    }

    #[must_use]
    pub fn with_verse(mut self, verse: Verse) -> Self {
        self.verses.push(verse);
        self
    }

    /// Build a draft that copies an existing hymn's content.
    #[must_use]
    pub fn from_hymn(hymn: &Hymn) -> Self {
        Self {
            number: hymn.number.clone(),
            title: hymn.title.clone(),
            category: Some(hymn.category),
            hymn_book: hymn.hymn_book.clone(),
            key: hymn.key.clone(),
            bpm: hymn.bpm,
            verses: hymn.verses.clone(),
        }
    }

    /// Check required fields. `require_category` is set for creation; on
    /// update a missing category keeps the stored one.
    pub fn validate(&self, require_category: bool) -> Result<()> {
        if self.number.trim().is_empty() {
            return Err(Error::Validation("hymn number is required".into()));
        }
        if self.title.trim().is_empty() {
            return Err(Error::Validation("hymn title is required".into()));
        }
        if require_category && self.category.is_none() {
            return Err(Error::Validation("hymn category is required".into()));
        }
        if self.bpm == Some(0) {
            return Err(Error::Validation("bpm must be a positive integer".into()));
        }
        Ok(())
    }
}

/// Criteria shared by list, search, and category filter reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HymnFilter {
    pub category: Option<Category>,
    search: Option<String>,
}

impl HymnFilter {
    #[must_use]
    pub fn new(category: Option<Category>, search: Option<&str>) -> Self {
        Self {
            category,
            search: search
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(String::from),
        }
    }

    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(term: &str) -> Self {
        Self::new(None, Some(term))
    }

    #[must_use]
    pub fn category(category: Category) -> Self {
        Self::new(Some(category), None)
    }

    /// The trimmed search term, if one was given.
    #[must_use]
    pub fn term(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Lowercased term for case-insensitive substring matching.
    #[must_use]
    pub fn folded_term(&self) -> Option<String> {
        self.search.as_deref().map(str::to_lowercase)
    }

    /// Normalized term for number matching; `None` when nothing survives
    /// normalization, so it never matches every number.
    #[must_use]
    pub fn normalized_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(number::normalize)
            .filter(|term| !term.is_empty())
    }

    #[must_use]
    pub fn matches_category(&self, category: Category) -> bool {
        self.category.map_or(true, |wanted| wanted == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VerseKind;

    #[test]
    fn test_hymn_infers_category_from_number() {
        let hymn = Hymn::new(HymnId::legacy(1), "S-5", "Test");
        assert_eq!(hymn.category, Category::Supplemental);
    }

    #[test]
    fn test_merge_key_ignores_case() {
        let a = Hymn::new(HymnId::primary(1), "s12", "A");
        let b = Hymn::new(HymnId::legacy(1), "S12 ", "B");
        assert_eq!(a.merge_key(), b.merge_key());
    }

    #[test]
    fn test_draft_validation() {
        let draft = HymnDraft::new("101", "Amazing Grace", Category::Standard);
        assert!(draft.validate(true).is_ok());

        let missing_number = HymnDraft::new("  ", "Title", Category::Standard);
        assert!(matches!(
            missing_number.validate(true),
            Err(Error::Validation(_))
        ));

        let missing_title = HymnDraft::new("1", "", Category::Standard);
        assert!(missing_title.validate(true).is_err());

        let zero_bpm = HymnDraft::new("1", "T", Category::Standard).with_bpm(0);
        assert!(zero_bpm.validate(true).is_err());
    }

    #[test]
    fn test_draft_category_required_only_on_create() {
        let draft = HymnDraft {
            number: "1".into(),
            title: "T".into(),
            ..HymnDraft::default()
        };
        assert!(draft.validate(true).is_err());
        assert!(draft.validate(false).is_ok());
    }

    #[test]
    fn test_draft_deserializes_partial_json() {
        let draft: HymnDraft = serde_json::from_str(
            r#"{"number": "12", "title": "Hosanna", "category": "chant",
                "verses": [{"type": "V1", "lines": ["Hosanna"]}]}"#,
        )
        .unwrap();
        assert_eq!(draft.category, Some(Category::Chant));
        assert_eq!(draft.verses[0].kind, VerseKind::Verse(1));
        assert!(draft.key.is_none());
    }

    #[test]
    fn test_filter_blank_search_is_absent() {
        let filter = HymnFilter::new(None, Some("   "));
        assert!(filter.term().is_none());
        assert_eq!(filter, HymnFilter::all());
    }

    #[test]
    fn test_filter_terms() {
        let filter = HymnFilter::search(" S-3 ");
        assert_eq!(filter.term(), Some("S-3"));
        assert_eq!(filter.folded_term().as_deref(), Some("s-3"));
        assert_eq!(filter.normalized_term().as_deref(), Some("S3"));

        let punctuation = HymnFilter::search("-");
        assert!(punctuation.normalized_term().is_none());
    }
}
