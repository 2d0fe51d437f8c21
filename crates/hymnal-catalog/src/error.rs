//! Error types for catalog operations.

use hymnal_core::HymnId;
use thiserror::Error;

/// Errors surfaced by the merged catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No consulted source holds the requested hymn.
    #[error("hymn not found: {id}")]
    NotFound { id: String },

    /// Another primary record already uses this catalog number.
    #[error("a hymn with number {number} already exists")]
    Conflict { number: String },

    /// The request was rejected before touching any store.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A write was addressed to a record owned by a read-only source.
    #[error("hymn {id} belongs to a read-only source")]
    ReadOnly { id: HymnId },

    /// A store failure that could not be absorbed.
    #[error("store error: {0}")]
    Store(#[source] hymnal_core::Error),
}

impl CatalogError {
    pub(crate) fn not_found(id: impl ToString) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Returns `true` when the error indicates the hymn was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` when the error is a catalog-number collision.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<hymnal_core::Error> for CatalogError {
    fn from(err: hymnal_core::Error) -> Self {
        match err {
            hymnal_core::Error::NotFound { id, .. } => Self::NotFound { id },
            hymnal_core::Error::Conflict { number } => Self::Conflict { number },
            hymnal_core::Error::Validation(message) => Self::Validation(message),
            other => Self::Store(other),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Store(err.into())
    }
}

/// Convenience alias for catalog results.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
