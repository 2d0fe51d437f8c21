//! Read-only adapter over the legacy hymnal export.
//!
//! The export is a SQLite file with one table, `ZENTITY`, holding a native
//! row id, a raw number, a raw title and the full lyric text. Its schema is
//! fixed and the file is never written. Every record is turned into a
//! [`Hymn`] on the fly: the category is inferred from the number, the
//! lyrics go through the [`LyricsParser`], and the id is tagged as legacy.
//!
//! The store is best-effort enrichment. The `try_*` methods (and the
//! [`HymnSource`] impl) report failures; the plain methods log them and
//! return empty results instead.

use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::lyrics::LyricsParser;
use crate::model::{Category, Hymn, HymnFilter, HymnId, Origin};
use crate::number;
use crate::source::HymnSource;
use crate::sql;

/// Source-book name stamped on legacy records unless overridden.
pub const DEFAULT_HYMN_BOOK: &str = "EAV - Editora Árvore da Vida";

const SOURCE_NAME: &str = "legacy";

const SELECT_ROWS: &str = "SELECT Z_PK, ZNUMERO, ZTITULO, ZLETRA FROM ZENTITY";

/// One row of the export, with NULLs read as empty text.
#[derive(Debug)]
struct RawRow {
    id: i64,
    number: String,
    title: String,
    lyrics: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            number: text_column(row, 1)?,
            title: text_column(row, 2)?,
            lyrics: text_column(row, 3)?,
        })
    }
}

fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(sql::value_text(row.get_ref(idx)?).unwrap_or_default())
}

/// The legacy hymnal export.
#[derive(Debug, Clone)]
pub struct LegacyStore {
    path: PathBuf,
    hymn_book: String,
    parser: LyricsParser,
}

impl LegacyStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            hymn_book: DEFAULT_HYMN_BOOK.to_string(),
            parser: LyricsParser::default(),
        }
    }

    #[must_use]
    pub fn with_hymn_book(mut self, hymn_book: impl Into<String>) -> Self {
        self.hymn_book = hymn_book.into();
        self
    }

    #[must_use]
    pub fn with_parser(mut self, parser: LyricsParser) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the export file exists. It may still lack the expected table.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.path.is_file()
    }

    fn connect(&self) -> Result<Connection> {
        if !self.is_available() {
            return Err(Error::SourceUnavailable {
                source_name: SOURCE_NAME.to_string(),
                reason: format!("{} not found", self.path.display()),
            });
        }

        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        sql::register_functions(&conn)?;
        Ok(conn)
    }

    fn to_hymn(&self, raw: RawRow) -> Hymn {
        Hymn {
            id: HymnId::legacy(raw.id),
            category: Category::infer(&raw.number),
            number: raw.number,
            title: raw.title,
            hymn_book: self.hymn_book.clone(),
            key: None,
            bpm: None,
            verses: self.parser.parse(&raw.lyrics),
        }
    }

    /// Run a row query, skipping rows that cannot be mapped.
    fn fetch(
        &self,
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Hymn>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, RawRow::from_row)?;

        let mut hymns = Vec::new();
        for row in rows {
            match row {
                Ok(raw) if has_routable_id(&raw) => hymns.push(self.to_hymn(raw)),
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable legacy row: {}", e),
            }
        }
        Ok(hymns)
    }

    fn fetch_one(
        &self,
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Option<Hymn>> {
        let raw = conn.query_row(sql, params, RawRow::from_row).optional()?;
        Ok(raw.filter(has_routable_id).map(|r| self.to_hymn(r)))
    }
}

/// Legacy ids are published negated, so only positive row ids can be told
/// apart from primary ids.
fn has_routable_id(raw: &RawRow) -> bool {
    if raw.id > 0 {
        return true;
    }
    log::warn!(
        "Skipping legacy row {:?} with non-positive id {}",
        raw.number,
        raw.id
    );
    false
}

// Fallible reads
impl LegacyStore {
    /// Records matching the filter, ordered lexically by raw number.
    ///
    /// The search term matches number, title, or lyric text as a
    /// case-insensitive substring, or the normalized term as a substring of
    /// the normalized number. Category is checked after inference.
    pub fn try_list(&self, filter: &HymnFilter) -> Result<Vec<Hymn>> {
        let conn = self.connect()?;
        let sql = format!(
            "{SELECT_ROWS}
             WHERE ?1 IS NULL
                OR instr(fold_case(ZNUMERO), ?1) > 0
                OR instr(fold_case(ZTITULO), ?1) > 0
                OR instr(fold_case(ZLETRA), ?1) > 0
                OR instr(hymn_number_key(ZNUMERO), ?2) > 0
             ORDER BY Z_PK"
        );

        let mut hymns = self.fetch(
            &conn,
            &sql,
            rusqlite::params![filter.folded_term(), filter.normalized_term()],
        )?;
        hymns.retain(|h| filter.matches_category(h.category));
        hymns.sort_by(|a, b| a.number.cmp(&b.number));

        log::debug!("Read {} hymns from legacy store", hymns.len());
        Ok(hymns)
    }

    pub fn try_get(&self, native_id: i64) -> Result<Option<Hymn>> {
        let conn = self.connect()?;
        self.fetch_one(
            &conn,
            &format!("{SELECT_ROWS} WHERE Z_PK = ?1 LIMIT 1"),
            [native_id],
        )
    }

    /// Exact number match first, then normalized match.
    pub fn try_get_by_number(&self, number: &str) -> Result<Option<Hymn>> {
        let conn = self.connect()?;
        let exact = self.fetch_one(
            &conn,
            &format!("{SELECT_ROWS} WHERE Z_PK > 0 AND ZNUMERO = ?1 ORDER BY Z_PK LIMIT 1"),
            [number],
        )?;
        if exact.is_some() {
            return Ok(exact);
        }

        let key = number::normalize(number);
        if key.is_empty() {
            return Ok(None);
        }
        self.fetch_one(
            &conn,
            &format!(
                "{SELECT_ROWS} WHERE Z_PK > 0 AND hymn_number_key(ZNUMERO) = ?1 \
                 ORDER BY Z_PK LIMIT 1"
            ),
            [key],
        )
    }

    pub fn try_count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM ZENTITY WHERE Z_PK > 0",
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

// Lenient reads
impl LegacyStore {
    /// Every record; empty when the export cannot be read.
    pub fn list(&self) -> Vec<Hymn> {
        absorb(self.try_list(&HymnFilter::all()), "list")
    }

    pub fn get(&self, native_id: i64) -> Option<Hymn> {
        absorb(self.try_get(native_id), "get")
    }

    pub fn get_by_number(&self, number: &str) -> Option<Hymn> {
        absorb(self.try_get_by_number(number), "get by number")
    }

    pub fn search(&self, term: &str) -> Vec<Hymn> {
        absorb(self.try_list(&HymnFilter::search(term)), "search")
    }

    pub fn filter_by_category(&self, category: Category) -> Vec<Hymn> {
        absorb(self.try_list(&HymnFilter::category(category)), "filter")
    }
}

fn absorb<T: Default>(result: Result<T>, operation: &str) -> T {
    result.unwrap_or_else(|e| {
        log::warn!("Legacy {} failed, continuing without it: {}", operation, e);
        T::default()
    })
}

impl HymnSource for LegacyStore {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn origin(&self) -> Origin {
        Origin::Legacy
    }

    fn query(&self, filter: &HymnFilter) -> Result<Vec<Hymn>> {
        self.try_list(filter)
    }

    fn lookup(&self, native_id: i64) -> Result<Option<Hymn>> {
        self.try_get(native_id)
    }

    fn lookup_number(&self, number: &str) -> Result<Option<Hymn>> {
        self.try_get_by_number(number)
    }
}
