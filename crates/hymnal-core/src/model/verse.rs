use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The structural role of a verse within a hymn.
///
/// Stored and serialized as a short code (`V1`, `R`, `C`, `P`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VerseKind {
    /// A numbered verse, usually 1 to 4.
    Verse(u32),
    Refrain,
    Chorus,
    Bridge,
}

impl VerseKind {
    /// Short code used in storage and in projection exports.
    #[must_use]
    pub fn code(self) -> String {
        match self {
            Self::Verse(n) => format!("V{n}"),
            Self::Refrain => String::from("R"),
            Self::Chorus => String::from("C"),
            Self::Bridge => String::from("P"),
        }
    }

    /// Human-readable label (`verse-1`, `refrain`, ...).
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Verse(n) => format!("verse-{n}"),
            Self::Refrain => String::from("refrain"),
            Self::Chorus => String::from("chorus"),
            Self::Bridge => String::from("bridge"),
        }
    }

    /// Map a single marker letter to its kind.
    pub(crate) fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'R' => Some(Self::Refrain),
            'C' => Some(Self::Chorus),
            'P' => Some(Self::Bridge),
            _ => None,
        }
    }
}

impl fmt::Display for VerseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown verse type: {0:?}")]
pub struct ParseVerseKindError(pub String);

impl FromStr for VerseKind {
    type Err = ParseVerseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let numbered = lower
            .strip_prefix("verse-")
            .or_else(|| lower.strip_prefix('v'));

        if let Some(digits) = numbered {
            return digits
                .parse()
                .map(Self::Verse)
                .map_err(|_| ParseVerseKindError(trimmed.to_string()));
        }

        match lower.as_str() {
            "r" | "refrain" => Ok(Self::Refrain),
            "c" | "chorus" => Ok(Self::Chorus),
            "p" | "bridge" => Ok(Self::Bridge),
            _ => Err(ParseVerseKindError(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for VerseKind {
    type Error = ParseVerseKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VerseKind> for String {
    fn from(kind: VerseKind) -> Self {
        kind.code()
    }
}

impl ToSql for VerseKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for VerseKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// One structural unit of a hymn's lyrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    #[serde(rename = "type")]
    pub kind: VerseKind,
    #[serde(default)]
    pub lines: Vec<String>,
}

impl Verse {
    #[must_use]
    pub fn new(kind: VerseKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
        self
    }
}
