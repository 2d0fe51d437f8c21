use anyhow::{Context, Result};
use confyg::{env, Confygery};
use hymnal_core::legacy::DEFAULT_HYMN_BOOK;
use hymnal_core::lyrics::BareVMarker;
use hymnal_core::{LegacyStore, LyricsParser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for hymnal.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (HYMNAL_* prefix)
/// 3. Config file (~/.config/hymnal/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the primary SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: HYMNAL_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/hymnal/hymnal.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Path to the legacy hymnal export. No legacy source is attached when
    /// this is unset.
    ///
    /// Can be set via:
    /// - CLI: --legacy /path/to/export.sqlite
    /// - ENV: HYMNAL_LEGACY_PATH
    /// - Config: legacy_path = "/path/to/export.sqlite"
    #[serde(default)]
    pub legacy_path: Option<PathBuf>,

    /// Source-book name stamped on every legacy hymn.
    #[serde(default = "default_legacy_hymn_book")]
    pub legacy_hymn_book: String,

    /// How a lone `V` marker in legacy lyrics is read.
    #[serde(default)]
    pub bare_v_marker: BareVMarker,

    /// Log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            legacy_path: None,
            legacy_hymn_book: default_legacy_hymn_book(),
            bare_v_marker: BareVMarker::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/hymnal/config.toml
    /// Reads environment variables with HYMNAL_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("hymnal");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// Apply CLI overrides on top of the loaded configuration.
    #[must_use]
    pub fn with_overrides(mut self, db: Option<PathBuf>, legacy: Option<PathBuf>) -> Self {
        if let Some(db) = db {
            self.database_path = db;
        }
        if legacy.is_some() {
            self.legacy_path = legacy;
        }
        self
    }

    /// The verse parser configured for legacy lyrics.
    #[must_use]
    pub fn lyrics_parser(&self) -> LyricsParser {
        LyricsParser::new().with_bare_v_marker(self.bare_v_marker)
    }

    /// The legacy store, if one is configured.
    #[must_use]
    pub fn legacy_store(&self) -> Option<LegacyStore> {
        self.legacy_path.as_ref().map(|path| {
            LegacyStore::new(path)
                .with_hymn_book(self.legacy_hymn_book.clone())
                .with_parser(self.lyrics_parser())
        })
    }
}

/// Get the default database path.
///
/// Returns: ~/.local/share/hymnal/hymnal.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hymnal")
        .join("hymnal.db")
}

fn default_legacy_hymn_book() -> String {
    DEFAULT_HYMN_BOOK.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/hymnal/config.toml
/// - macOS: ~/Library/Application Support/hymnal/config.toml
/// - Windows: %APPDATA%\hymnal\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hymnal")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Hymnal Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (HYMNAL_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the primary SQLite database
#
# Holds every hymn created or edited through hymnal.
#
# Can also be set via:
# - CLI: hymnal --db /custom/path.db list
# - Environment: HYMNAL_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/hymnal.db"

# Path to the legacy hymnal export (read-only)
#
# When set, its hymns are merged into every read. Records that share a
# number with a primary hymn are hidden behind the primary one.
#
# Can also be set via:
# - CLI: hymnal --legacy /path/to/export.sqlite list
# - Environment: HYMNAL_LEGACY_PATH=/path/to/export.sqlite
#legacy_path = "/path/to/legacy.sqlite"

# Source-book name shown on legacy hymns
#legacy_hymn_book = "EAV - Editora Árvore da Vida"

# How a lone "V" marker in legacy lyrics is read: "refrain", "verse" or "ignore"
#bare_v_marker = "refrain"

# Log level used when RUST_LOG is not set
#log_level = "info"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
