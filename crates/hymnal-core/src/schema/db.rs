use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Hymn, HymnDraft, HymnFilter, HymnId, Origin, Verse};
use crate::number;
use crate::source::HymnSource;
use crate::sql;

use super::migrations::MIGRATIONS;

const HYMN_COLUMNS: &str = "id, number, title, category, hymn_book, key, bpm";

/// The primary, writable hymn store.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn init(conn: Connection) -> Result<Self> {
        // Foreign keys are per-connection; verse cascade depends on them.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        sql::register_functions(&conn)?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

// Hymn reads
impl Database {
    /// List hymns matching the filter, ordered by catalog number.
    ///
    /// The search term matches number, title, hymn book, and verse text as a
    /// case-insensitive substring, or the normalized number as a substring of
    /// the normalized stored number.
    pub fn list_hymns(&self, filter: &HymnFilter) -> Result<Vec<Hymn>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HYMN_COLUMNS}
             FROM hymns h
             WHERE (?1 IS NULL OR h.category = ?1)
               AND (?2 IS NULL
                    OR instr(fold_case(h.number), ?2) > 0
                    OR instr(fold_case(h.title), ?2) > 0
                    OR instr(fold_case(h.hymn_book), ?2) > 0
                    OR instr(hymn_number_key(h.number), ?3) > 0
                    OR EXISTS (
                        SELECT 1 FROM verses v, json_each(v.lines) line
                        WHERE v.hymn_id = h.id AND instr(fold_case(line.value), ?2) > 0
                    ))
             ORDER BY h.number"
        ))?;

        let hymns = stmt
            .query_map(
                params![
                    filter.category,
                    filter.folded_term(),
                    filter.normalized_term()
                ],
                row_to_hymn,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        self.attach_verses(hymns)
    }

    /// Get a hymn by its row id.
    pub fn get_hymn(&self, id: i64) -> Result<Option<Hymn>> {
        let hymn = self
            .conn
            .query_row(
                &format!("SELECT {HYMN_COLUMNS} FROM hymns WHERE id = ?1"),
                [id],
                row_to_hymn,
            )
            .optional()?;

        hymn.map(|h| self.with_verses(h)).transpose()
    }

    /// Get a hymn by catalog number: exact match first, then any hymn whose
    /// normalized number equals the normalized input.
    pub fn get_hymn_by_number(&self, number: &str) -> Result<Option<Hymn>> {
        let exact = self
            .conn
            .query_row(
                &format!("SELECT {HYMN_COLUMNS} FROM hymns WHERE number = ?1"),
                [number.trim()],
                row_to_hymn,
            )
            .optional()?;

        let found = match exact {
            Some(hymn) => Some(hymn),
            None => {
                let key = number::normalize(number);
                if key.is_empty() {
                    None
                } else {
                    self.conn
                        .query_row(
                            &format!(
                                "SELECT {HYMN_COLUMNS} FROM hymns
                                 WHERE hymn_number_key(number) = ?1
                                 ORDER BY number LIMIT 1"
                            ),
                            [key],
                            row_to_hymn,
                        )
                        .optional()?
                }
            }
        };

        found.map(|h| self.with_verses(h)).transpose()
    }

    /// Whether a hymn other than `except` already uses this number, ignoring
    /// letter case.
    pub fn number_taken(&self, number: &str, except: Option<i64>) -> Result<bool> {
        let taken = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM hymns
                WHERE fold_case(number) = fold_case(?1) AND (?2 IS NULL OR id <> ?2)
             )",
            params![number.trim(), except],
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    pub fn count_hymns(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM hymns", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Number of verse rows stored for a hymn id.
    pub fn verse_count(&self, hymn_id: i64) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM verses WHERE hymn_id = ?1",
            [hymn_id],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn verses_for(&self, hymn_id: i64) -> Result<Vec<Verse>> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, lines FROM verses WHERE hymn_id = ?1 ORDER BY position, id",
        )?;
        let verses = stmt
            .query_map([hymn_id], row_to_verse)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(verses)
    }

    fn with_verses(&self, mut hymn: Hymn) -> Result<Hymn> {
        hymn.verses = self.verses_for(hymn.id.native())?;
        Ok(hymn)
    }

    fn attach_verses(&self, hymns: Vec<Hymn>) -> Result<Vec<Hymn>> {
        hymns.into_iter().map(|h| self.with_verses(h)).collect()
    }
}

// Hymn writes
impl Database {
    /// Insert a new hymn with its verses.
    ///
    /// Fails with [`Error::Conflict`] when the number is already used. The
    /// early check gives a clean error; the UNIQUE constraint still guards
    /// against a concurrent writer.
    pub fn insert_hymn(&self, draft: &HymnDraft) -> Result<Hymn> {
        draft.validate(true)?;
        let category = draft
            .category
            .ok_or_else(|| Error::Validation("hymn category is required".into()))?;
        let number = draft.number.trim();

        if self.number_taken(number, None)? {
            return Err(Error::Conflict {
                number: number.to_string(),
            });
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO hymns (number, title, category, hymn_book, key, bpm)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                number,
                draft.title.trim(),
                category,
                draft.hymn_book.trim(),
                draft.key,
                draft.bpm,
            ],
        )
        .map_err(|e| write_error(e, number))?;
        let id = tx.last_insert_rowid();
        insert_verses(&tx, id, &draft.verses)?;
        tx.commit()?;

        log::info!("Created hymn {} with id {}", number, id);
        self.require(id)
    }

    /// Replace a hymn's fields and its whole verse list.
    pub fn update_hymn(&self, id: i64, draft: &HymnDraft) -> Result<Hymn> {
        draft.validate(false)?;
        let existing = self.require(id)?;
        let number = draft.number.trim();

        if self.number_taken(number, Some(id))? {
            return Err(Error::Conflict {
                number: number.to_string(),
            });
        }

        let category = draft.category.unwrap_or(existing.category);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE hymns SET
                number = ?2, title = ?3, category = ?4,
                hymn_book = ?5, key = ?6, bpm = ?7
             WHERE id = ?1",
            params![
                id,
                number,
                draft.title.trim(),
                category,
                draft.hymn_book.trim(),
                draft.key,
                draft.bpm,
            ],
        )
        .map_err(|e| write_error(e, number))?;
        tx.execute("DELETE FROM verses WHERE hymn_id = ?1", [id])?;
        insert_verses(&tx, id, &draft.verses)?;
        tx.commit()?;

        log::info!("Updated hymn {} ({} verses)", id, draft.verses.len());
        self.require(id)
    }

    /// Delete a hymn; its verses go with it.
    pub fn delete_hymn(&self, id: i64) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM hymns WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(not_found(id));
        }
        log::info!("Deleted hymn {}", id);
        Ok(())
    }

    fn require(&self, id: i64) -> Result<Hymn> {
        self.get_hymn(id)?.ok_or_else(|| not_found(id))
    }
}

impl HymnSource for Database {
    fn name(&self) -> &str {
        "primary"
    }

    fn origin(&self) -> Origin {
        Origin::Primary
    }

    fn query(&self, filter: &HymnFilter) -> Result<Vec<Hymn>> {
        self.list_hymns(filter)
    }

    fn lookup(&self, native_id: i64) -> Result<Option<Hymn>> {
        self.get_hymn(native_id)
    }

    fn lookup_number(&self, number: &str) -> Result<Option<Hymn>> {
        self.get_hymn_by_number(number)
    }
}

fn insert_verses(conn: &Connection, hymn_id: i64, verses: &[Verse]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO verses (hymn_id, position, kind, lines) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, verse) in (0_i64..).zip(verses) {
        stmt.execute(params![
            hymn_id,
            position,
            verse.kind,
            serde_json::to_string(&verse.lines)?,
        ])?;
    }
    Ok(())
}

fn row_to_hymn(row: &Row<'_>) -> rusqlite::Result<Hymn> {
    Ok(Hymn {
        id: HymnId::primary(row.get(0)?),
        number: row.get(1)?,
        title: row.get(2)?,
        category: row.get(3)?,
        hymn_book: row.get(4)?,
        key: row.get(5)?,
        bpm: row.get(6)?,
        verses: Vec::new(),
    })
}

fn row_to_verse(row: &Row<'_>) -> rusqlite::Result<Verse> {
    let lines_json: String = row.get(1)?;
    let lines = serde_json::from_str(&lines_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Verse {
        kind: row.get(0)?,
        lines,
    })
}

fn write_error(err: rusqlite::Error, number: &str) -> Error {
    let err = Error::from(err);
    if err.is_unique_violation() {
        Error::Conflict {
            number: number.to_string(),
        }
    } else {
        err
    }
}

fn not_found(id: i64) -> Error {
    Error::NotFound {
        entity: "hymn",
        id: id.to_string(),
    }
}
