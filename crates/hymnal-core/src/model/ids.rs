use serde::{Deserialize, Serialize};
use std::fmt;

/// Which store a hymn record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The writable, authoritative store.
    Primary,
    /// The read-only legacy hymnal export.
    Legacy,
}

/// Process-wide identity of a hymn across both stores.
///
/// Internally this is a tagged pair of origin and the store's native row id.
/// At the serialization boundary it becomes a single signed integer: primary
/// ids stay positive and legacy ids are negated. Zero and positive external
/// values route to the primary store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct HymnId {
    origin: Origin,
    native: i64,
}

impl HymnId {
    #[must_use]
    pub const fn primary(native: i64) -> Self {
        Self {
            origin: Origin::Primary,
            native,
        }
    }

    #[must_use]
    pub const fn legacy(native: i64) -> Self {
        Self {
            origin: Origin::Legacy,
            native,
        }
    }

    /// Decode the signed external form.
    ///
    /// `i64::MIN` has no positive counterpart and saturates to `i64::MAX`.
    #[must_use]
    pub const fn from_external(id: i64) -> Self {
        if id < 0 {
            Self::legacy(id.saturating_abs())
        } else {
            Self::primary(id)
        }
    }

    /// Encode as the signed external form.
    #[must_use]
    pub const fn to_external(self) -> i64 {
        match self.origin {
            Origin::Primary => self.native,
            Origin::Legacy => self.native.saturating_neg(),
        }
    }

    #[must_use]
    pub const fn origin(self) -> Origin {
        self.origin
    }

    /// The row id inside the owning store.
    #[must_use]
    pub const fn native(self) -> i64 {
        self.native
    }
}

impl From<i64> for HymnId {
    fn from(id: i64) -> Self {
        Self::from_external(id)
    }
}

impl From<HymnId> for i64 {
    fn from(id: HymnId) -> Self {
        id.to_external()
    }
}

impl fmt::Display for HymnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_external())
    }
}
