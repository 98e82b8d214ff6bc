//! Quotebook CLI - add, edit, pick and serve weighted random quotes

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use quotebook::config::{self, QuotebookConfig};
use quotebook::output::OutputMode;
use quotebook::server::{self, AppState};
use quotebook::storage::SqliteStore;
use quotebook::{QuoteEngine, ui};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "quotebook")]
#[command(version)]
#[command(about = "Weighted random quotes - store, validate and serve quotations by source")]
#[command(long_about = r#"
Quotebook keeps short quotations attributed to a source and serves one at a
time, picked at random in proportion to its weight. A source may hold at most
three quotes and the same text can only be stored once per source.

Example usage:
  quotebook add --text "I'll be back." --source "The Terminator" --weight 3
  quotebook random
  quotebook like 1
  quotebook popular --source "The Terminator"
  quotebook serve --port 8000
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of human output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file (default: quotebook.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Add a quote
    Add {
        /// Quote text
        #[arg(short, long)]
        text: String,

        /// Where the quote comes from (film, book, person)
        #[arg(short, long)]
        source: String,

        /// Selection weight, at least 1
        #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
        weight: i64,
    },

    /// Edit a quote; omitted fields keep their value
    Edit {
        /// Quote id
        id: i64,

        #[arg(short, long)]
        text: Option<String>,

        #[arg(short, long)]
        source: Option<String>,

        #[arg(short, long, allow_negative_numbers = true)]
        weight: Option<i64>,
    },

    /// Show a single quote
    Show {
        /// Quote id
        id: i64,
    },

    /// Pick a weighted random quote (counts as a view)
    Random,

    /// Like a quote
    Like {
        /// Quote id
        id: i64,
    },

    /// Dislike a quote
    Dislike {
        /// Quote id
        id: i64,
    },

    /// Delete a quote
    Delete {
        /// Quote id
        id: i64,
    },

    /// List the most liked quotes
    Popular {
        /// Only quotes from this source
        #[arg(short, long)]
        source: Option<String>,

        /// Maximum number of results (default from config, else 10)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List sources and how many quotes each has
    Sources,

    /// Search quote text and sources
    Search {
        /// Text to look for
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show statistics about the quote collection
    Stats,

    /// Write a starter config file
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mode = OutputMode::from_flag(cli.json);

    let Err(e) = run(cli, mode) else {
        return Ok(());
    };

    // Recoverable errors get a readable message instead of an anyhow dump
    match e.downcast_ref::<quotebook::Error>() {
        Some(quotebook::Error::Validation(v)) => {
            if mode.is_human() {
                ui::validation_error(v);
            } else {
                let body = serde_json::json!({
                    "status": "error",
                    "error": v.to_string(),
                    "field": v.field(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            std::process::exit(1);
        }
        Some(quotebook::Error::QuoteNotFound(id)) if mode.is_human() => {
            ui::error(&format!("No quote with id {}", id));
            std::process::exit(1);
        }
        _ => {}
    }

    Err(e)
}

fn run(cli: Cli, mode: OutputMode) -> anyhow::Result<()> {
    let file_config = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    let database = cli.database.clone().unwrap_or_else(|| file_config.database_path());

    match cli.command {
        Commands::Init { force } => {
            let path = cli.config.clone().unwrap_or_else(config::default_config_path);
            run_init(mode, &path, &database, force)
        }
        Commands::Serve { host, port } => {
            let store = open_store(&database)?;
            let host = host.unwrap_or_else(|| file_config.host().to_string());
            let port = port.unwrap_or_else(|| file_config.port());
            let state = AppState::new(store, file_config.popular_limit());
            if mode.is_human() {
                ui::header("Starting quotebook server");
                ui::info("Database", &database.display().to_string());
            }

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::start_server(&host, port, state))
        }
        Commands::Add { text, source, weight } => {
            with_engine(&database, |engine| commands::run_add(engine, mode, text, source, weight))
        }
        Commands::Edit { id, text, source, weight } => {
            with_engine(&database, |engine| commands::run_edit(engine, mode, id, text, source, weight))
        }
        Commands::Show { id } => with_engine(&database, |engine| commands::run_show(engine, mode, id)),
        Commands::Random => with_engine(&database, |engine| commands::run_random(engine, mode)),
        Commands::Like { id } => with_engine(&database, |engine| commands::run_vote(engine, mode, id, true)),
        Commands::Dislike { id } => with_engine(&database, |engine| commands::run_vote(engine, mode, id, false)),
        Commands::Delete { id } => with_engine(&database, |engine| commands::run_delete(engine, mode, id)),
        Commands::Popular { source, limit } => {
            let limit = limit.unwrap_or_else(|| file_config.popular_limit());
            with_engine(&database, |engine| commands::run_popular(engine, mode, source.as_deref(), limit))
        }
        Commands::Sources => with_engine(&database, |engine| commands::run_sources(engine, mode)),
        Commands::Search { query, limit } => {
            with_engine(&database, |engine| commands::run_search(engine, mode, &query, limit))
        }
        Commands::Stats => {
            let shown = database.display().to_string();
            with_engine(&database, |engine| commands::run_stats(engine, mode, &shown))
        }
    }
}

fn run_init(mode: OutputMode, path: &Path, database: &Path, force: bool) -> anyhow::Result<()> {
    let starter = QuotebookConfig {
        database: Some(database.display().to_string()),
        ..QuotebookConfig::starter()
    };
    if force && path.exists() {
        ui::warn(&format!("Overwriting {}", path.display()));
    }
    config::write_config(path, &starter, force)?;
    if mode.is_human() {
        ui::success(&format!("Wrote {}", path.display()));
    }
    quotebook::output::emit_success(mode, "init", &starter)
}

fn open_store(database: &Path) -> anyhow::Result<SqliteStore> {
    config::ensure_db_dir(database)?;
    tracing::debug!("Opening database {:?}", database);
    Ok(SqliteStore::open(database)?)
}

/// Open the store and hand a query engine to a one-shot command
fn with_engine(
    database: &Path,
    command: impl FnOnce(&QuoteEngine) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let store = open_store(database)?;
    command(&QuoteEngine::new(&store))
}
