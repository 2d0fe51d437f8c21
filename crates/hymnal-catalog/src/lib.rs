//! The merged hymn catalog.
//!
//! Combines the primary store with secondary read-only sources behind one
//! read/write surface, and adds configuration, text export, and the
//! one-time legacy import.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod merge;

pub use catalog::Catalog;
pub use config::Config;
pub use error::{CatalogError, CatalogResult};
pub use export::ExportFormat;
pub use import::{import_legacy, ImportReport};
