#![cfg_attr(test, allow(clippy::unwrap_used))]

use anyhow::Result;
use clap::Parser;
use hymnal_catalog::{Config, ExportFormat};
use hymnal_core::Category;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "hymnal", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/hymnal/hymnal.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Path to the legacy hymnal export to merge into reads
    #[arg(long, global = true)]
    legacy: Option<PathBuf>,

    /// Print full records as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// List hymns from every source
    ///
    /// Reads the primary database and, when configured, the legacy export.
    /// A legacy hymn that shares its number with a primary hymn is hidden
    /// behind the primary one. Results are ordered by catalog number.
    List {
        /// Only hymns in this category (standard, chant, supplemental, new)
        #[arg(long)]
        category: Option<Category>,

        /// Only hymns whose number, title, book, or lyrics contain this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one hymn by id or by catalog number
    ///
    /// Negative ids address the legacy export; zero and positive ids address
    /// the primary database. Numbers match exactly first, then ignoring
    /// case and separators ("S-38", "s 38" and "S38" are the same number).
    Show {
        /// Hymn id
        #[arg(allow_negative_numbers = true, required_unless_present = "number")]
        id: Option<i64>,

        /// Catalog number instead of an id
        #[arg(long, conflicts_with = "id")]
        number: Option<String>,
    },
    /// Search hymns by number, title, book, or lyric text
    Search {
        /// Search term (case-insensitive)
        term: String,
    },
    /// Create a hymn from a JSON draft
    ///
    /// The draft needs `number`, `title` and `category`; `hymn_book`, `key`,
    /// `bpm` and `verses` are optional. Each verse is
    /// `{"type": "V1", "lines": ["..."]}` with type V{n}, R, C or P.
    Create {
        /// Path to the JSON draft
        #[arg(long)]
        file: PathBuf,
    },
    /// Replace a primary hymn's fields and verses from a JSON draft
    ///
    /// A draft without `category` keeps the stored one.
    Update {
        /// Hymn id
        #[arg(allow_negative_numbers = true)]
        id: i64,

        /// Path to the JSON draft
        #[arg(long)]
        file: PathBuf,
    },
    /// Delete a primary hymn and its verses
    Delete {
        /// Hymn id
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
    /// Export a hymn as a text file
    Export {
        /// Hymn id
        #[arg(allow_negative_numbers = true)]
        id: i64,

        /// Output format (plain or holyrics)
        #[arg(long, default_value_t = ExportFormat::Holyrics)]
        format: ExportFormat,

        /// Directory to write into; prints to stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Copy legacy hymns into the primary database (one-time)
    ///
    /// Hymns whose number already exists in the primary database are
    /// skipped. The legacy export is never modified.
    ImportLegacy,
    /// Show database and legacy source status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults if it does not exist
    Init,
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?.with_overrides(cli.db, cli.legacy);
    init_logging(&config.log_level);
    log::debug!("Using database {}", config.database_path.display());

    match cli.command {
        Commands::List { category, search } => {
            commands::hymns::list(&config, category, search.as_deref(), cli.json)?;
        }
        Commands::Show { id, number } => {
            commands::hymns::show(&config, id, number.as_deref(), cli.json)?;
        }
        Commands::Search { term } => {
            commands::hymns::search(&config, &term, cli.json)?;
        }
        Commands::Create { file } => {
            commands::edit::create(&config, &file, cli.json)?;
        }
        Commands::Update { id, file } => {
            commands::edit::update(&config, id, &file, cli.json)?;
        }
        Commands::Delete { id } => {
            commands::edit::delete(&config, id)?;
        }
        Commands::Export { id, format, out } => {
            commands::export::run_export(&config, id, format, out.as_deref())?;
        }
        Commands::ImportLegacy => {
            commands::import::run_import(&config, cli.json)?;
        }
        Commands::Status => {
            commands::status::show_status(&config)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config)?,
            ConfigAction::Path => commands::config::show_path()?,
            ConfigAction::Example => commands::config::show_example()?,
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_ids_parse() {
        let cli = Cli::try_parse_from(["hymnal", "show", "-5"]).unwrap();
        assert!(matches!(cli.command, Commands::Show { id: Some(-5), .. }));
    }

    #[test]
    fn test_list_flags() {
        let cli =
            Cli::try_parse_from(["hymnal", "list", "--category", "chant", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::List {
                category: Some(Category::Chant),
                search: None
            }
        ));
    }

    #[test]
    fn test_show_needs_id_or_number() {
        assert!(Cli::try_parse_from(["hymnal", "show"]).is_err());
        assert!(Cli::try_parse_from(["hymnal", "show", "--number", "S-5"]).is_ok());
    }

    #[test]
    fn test_export_format() {
        let cli = Cli::try_parse_from(["hymnal", "export", "3", "--format", "plain"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Export {
                id: 3,
                format: ExportFormat::Plain,
                out: None
            }
        ));
    }
}
