use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which part of the hymnal a hymn belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The main numbered hymnal.
    Standard,
    Chant,
    Supplemental,
    New,
}

/// A test applied to a raw catalog number during category inference.
#[derive(Debug, Clone, Copy)]
enum Matcher {
    /// Starts with this letter, ignoring case.
    Prefix(char),
    /// Consists of ASCII digits only.
    Numeric,
}

impl Matcher {
    fn matches(self, number: &str) -> bool {
        match self {
            Self::Prefix(letter) => number
                .chars()
                .next()
                .is_some_and(|c| c.eq_ignore_ascii_case(&letter)),
            Self::Numeric => !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()),
        }
    }
}

/// Inference rules, evaluated in order; the first match wins.
const INFERENCE_RULES: &[(Matcher, Category)] = &[
    (Matcher::Prefix('C'), Category::Chant),
    (Matcher::Prefix('S'), Category::Supplemental),
    (Matcher::Prefix('N'), Category::New),
    (Matcher::Numeric, Category::Standard),
];

const CATEGORY_NAMES: &[(Category, &str)] = &[
    (Category::Standard, "standard"),
    (Category::Chant, "chant"),
    (Category::Supplemental, "supplemental"),
    (Category::New, "new"),
];

impl Category {
    /// Infer the category of a legacy hymn from its catalog number prefix.
    ///
    /// Anything the rule table does not recognize falls back to
    /// [`Category::Standard`].
    #[must_use]
    pub fn infer(number: &str) -> Self {
        let number = number.trim();
        INFERENCE_RULES
            .iter()
            .find(|(matcher, _)| matcher.matches(number))
            .map(|&(_, category)| category)
            .unwrap_or(Self::Standard)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        CATEGORY_NAMES
            .iter()
            .find(|(c, _)| *c == self)
            .map(|&(_, name)| name)
            .unwrap_or("standard")
    }

    #[must_use]
    pub fn all() -> [Self; 4] {
        [Self::Standard, Self::Chant, Self::Supplemental, Self::New]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0:?}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        CATEGORY_NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|&(category, _)| category)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_by_prefix() {
        assert_eq!(Category::infer("C12"), Category::Chant);
        assert_eq!(Category::infer("S-38"), Category::Supplemental);
        assert_eq!(Category::infer("N4"), Category::New);
        assert_eq!(Category::infer("101"), Category::Standard);
    }

    #[test]
    fn test_infer_ignores_case_and_padding() {
        assert_eq!(Category::infer(" s5"), Category::Supplemental);
        assert_eq!(Category::infer("c 3"), Category::Chant);
    }

    #[test]
    fn test_infer_defaults_to_standard() {
        assert_eq!(Category::infer(""), Category::Standard);
        assert_eq!(Category::infer("X-1"), Category::Standard);
        assert_eq!(Category::infer("12a"), Category::Standard);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("chant".parse::<Category>().unwrap(), Category::Chant);
        assert_eq!("NEW".parse::<Category>().unwrap(), Category::New);
        assert!("hymns".parse::<Category>().is_err());
    }

    #[test]
    fn test_display_matches_serde() {
        for category in Category::all() {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{category}\""));
        }
    }
}
