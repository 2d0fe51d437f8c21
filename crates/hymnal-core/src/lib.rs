//! Core domain model for hymnal.
//!
//! This crate defines the hymn/verse model, catalog-number normalization,
//! the lyric verse parser, the primary SQLite store, and the read-only
//! adapter over the legacy hymnal export. Both stores implement
//! [`HymnSource`] so the catalog layer can merge them.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod legacy;
pub mod lyrics;
pub mod model;
pub mod number;
pub mod schema;
pub mod source;
mod sql;

pub use error::{Error, Result};
pub use legacy::LegacyStore;
pub use lyrics::LyricsParser;
pub use model::{Category, Hymn, HymnDraft, HymnFilter, HymnId, Origin, Verse, VerseKind};
pub use schema::Database;
pub use source::HymnSource;
