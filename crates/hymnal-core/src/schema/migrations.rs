/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Hymns (authoritative records; ids are always positive)
CREATE TABLE IF NOT EXISTS hymns (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    number TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    category TEXT NOT NULL,
    hymn_book TEXT NOT NULL DEFAULT '',
    key TEXT,
    bpm INTEGER CHECK (bpm IS NULL OR bpm > 0)
);

CREATE INDEX IF NOT EXISTS idx_hymns_category ON hymns(category);
CREATE INDEX IF NOT EXISTS idx_hymns_title ON hymns(title);

-- Verses (lines stored as a JSON array of strings)
CREATE TABLE IF NOT EXISTS verses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    hymn_id INTEGER NOT NULL REFERENCES hymns(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    kind TEXT NOT NULL,
    lines TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_verses_hymn_id ON verses(hymn_id, position);
"#;

/// Catalog numbers are unique regardless of letter case ("S5" and "s5" are
/// the same hymn).
const MIGRATION_002: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_hymns_number_nocase ON hymns(number COLLATE NOCASE);
"#;

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: MIGRATION_001,
    },
    Migration {
        version: 2,
        name: "case_insensitive_number",
        sql: MIGRATION_002,
    },
];
