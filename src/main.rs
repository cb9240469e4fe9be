//! Dexload CLI - create the store, pull PokeAPI data into it, and report on it

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use dexload::config::{self, DexloadConfig};
use dexload::ingest::{self, Ingestor, MissingPolicy};
use dexload::storage::SqliteStore;
use dexload::{report, ui, HttpClient};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "dexload")]
#[command(version)]
#[command(about = "Pull Pokémon reference data from PokeAPI into a normalized SQLite store")]
#[command(long_about = r#"
Dexload pulls a fixed range of Pokémon from PokeAPI, follows their type and
move references, and stores everything in SQLite with one commit per Pokémon.

Example usage:
  dexload create-db dex.db sql/schema.sql
  dexload ingest dex.db
  dexload report dex.db
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a dexload.toml (defaults to ./dexload.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database tables from a .sql script
    CreateDb {
        /// Path to the database file
        database: PathBuf,

        /// Schema script (must end in .sql)
        script: PathBuf,
    },

    /// Ingest Pokémon 1..=15 with their types and moves
    Ingest {
        /// Path to the database file (falls back to the config, then dexload.db)
        database: Option<PathBuf>,

        /// PokeAPI base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// What to do when a resource is not found
        #[arg(long, value_enum)]
        on_missing: Option<MissingPolicy>,
    },

    /// Print the fixed aggregate queries
    Report {
        /// Path to the database file (falls back to the config, then dexload.db)
        database: Option<PathBuf>,
    },

    /// Write a dexload.toml with default settings
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn database_path(arg: Option<PathBuf>, config: &DexloadConfig) -> PathBuf {
    arg.or_else(|| config.database.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("dexload.db"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::CreateDb { database, script } => {
            config::ensure_db_dir(&database)?;
            let store = SqliteStore::open(&database)?;
            store.bootstrap_from_file(&script)?;
            println!(
                "Created db instance: {} using script: {}.",
                database.display(),
                script.display()
            );
        }

        Commands::Ingest { database, base_url, timeout_secs, on_missing } => {
            let database = database_path(database, &config);
            let mut options = config.client_options();
            if let Some(url) = base_url {
                options.base_url = url;
            }
            if let Some(secs) = timeout_secs {
                options.timeout = std::time::Duration::from_secs(secs);
            }
            let policy = on_missing.or(config.on_missing).unwrap_or_default();

            ui::header(&format!("Ingesting pokemon {}..={}", ingest::FIRST_ID, ingest::LAST_ID));
            ui::info("Database", &database.display().to_string());
            ui::info("API", &options.base_url);
            tracing::debug!("Missing-resource policy: {:?}", policy);

            config::ensure_db_dir(&database)?;
            let mut store = SqliteStore::open(&database)?;
            let client = HttpClient::new(options)?;

            let stats = Ingestor::new(&client, &mut store)
                .with_policy(policy)
                .run()?;

            ui::section("Summary");
            println!("{}", ui::stats_table(&stats.rows()));
            ui::success("Ingestion complete");
        }

        Commands::Report { database } => {
            let database = database_path(database, &config);
            let store = SqliteStore::open(&database)?;

            for (i, section) in report::run_all(store.connection())?.iter().enumerate() {
                ui::section(&format!("Question {}: {}", i + 1, section.title));
                println!("{}", ui::query_table(&section.columns, &section.rows));
            }
        }

        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            config::write_config(&path, &DexloadConfig::with_defaults(), force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }
    }

    Ok(())
}
