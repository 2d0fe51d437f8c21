//! Scalar SQL functions registered on every connection.
//!
//! `hymn_number_key(text)` applies [`number::normalize`] and
//! `fold_case(text)` lowercases with full Unicode rules, which SQLite's
//! built-in `lower()` does not. Both return NULL for NULL input and render
//! numeric values as text, since legacy columns are not reliably typed.

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::number;

pub(crate) fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    conn.create_scalar_function("hymn_number_key", 1, flags, |ctx| {
        Ok(arg_text(ctx).map(|text| number::normalize(&text)))
    })?;
    conn.create_scalar_function("fold_case", 1, flags, |ctx| {
        Ok(arg_text(ctx).map(|text| text.to_lowercase()))
    })?;

    Ok(())
}

fn arg_text(ctx: &Context<'_>) -> Option<String> {
    value_text(ctx.get_raw(0))
}

/// Render a loosely typed SQLite value as text; NULL and blobs are `None`.
pub(crate) fn value_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}
