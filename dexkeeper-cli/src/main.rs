//! dexkeeper - track species catalog completion across games
//!
//! Main entry point: argument parsing, logging, store selection

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use dexkeeper_core::completion::{CompletionStore, FileStore, HttpStore};
use dexkeeper_core::{DexTracker, TrackerConfig};

mod commands;
mod session;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// A `--section ID:NAME:FILE` argument for `build-local`
#[derive(Debug, Clone, PartialEq)]
pub struct SectionInput {
    pub id: String,
    pub name: String,
    pub file: PathBuf,
}

impl FromStr for SectionInput {
    type Err = String;

    /// The name may itself contain colons; the id is the first field and the
    /// file the last
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid section '{s}', expected ID:NAME:FILE");

        let (id, rest) = s.split_once(':').ok_or_else(invalid)?;
        let (name, file) = rest.rsplit_once(':').ok_or_else(invalid)?;

        if id.is_empty() || name.is_empty() || file.is_empty() {
            return Err(invalid());
        }

        Ok(SectionInput {
            id: id.to_string(),
            name: name.to_string(),
            file: PathBuf::from(file),
        })
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "dexkeeper",
    about = "Track species catalog completion across games",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[clap(long, global = true)]
    log_json: bool,

    /// Configuration file (defaults to the platform config directory)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Completion file (defaults to the platform data directory)
    #[clap(long, global = true, conflicts_with = "store_url")]
    store: Option<PathBuf>,

    /// Remote completion store base URL
    #[clap(long, global = true)]
    store_url: Option<String>,
}

#[derive(Parser, Debug)]
enum Command {
    /// List configured games and their sections
    Games,

    /// Show a section with completion marks and progress
    Show {
        /// Game identifier
        game: String,

        /// Section identifier (defaults to the game's first section)
        section: Option<String>,

        /// Track the shiny variant
        #[clap(long)]
        shiny: bool,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Toggle a species' completion
    Toggle {
        /// Species identity, e.g. `mr-mime`
        api_name: String,

        /// Toggle the shiny variant
        #[clap(long)]
        shiny: bool,
    },

    /// Interactive session
    Session,

    /// Build a local document from pasted regional dex text
    BuildLocal {
        /// Game identifier written into the document
        #[clap(long)]
        game: String,

        /// Section as ID:NAME:FILE (repeatable, in display order)
        #[clap(long = "section", required = true)]
        sections: Vec<SectionInput>,

        /// Output file (stdout when omitted)
        #[clap(long)]
        output: Option<PathBuf>,
    },
}

fn initialize_tracing(log_level: &LogLevel, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    // Logs go to stderr; stdout carries command output
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn open_store(cli: &Cli, config: &TrackerConfig) -> Result<Arc<dyn CompletionStore>> {
    if let Some(url) = &cli.store_url {
        debug!("Using remote completion store at {}", url);
        let store = HttpStore::new(url, config.timeout_seconds)?;
        return Ok(Arc::new(store));
    }

    let path = cli
        .store
        .clone()
        .unwrap_or_else(TrackerConfig::default_store_path);
    let store = FileStore::open(&path)
        .await
        .with_context(|| format!("Failed to open completion file {}", path.display()))?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.log_json);

    let config = TrackerConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Command::Games => {
            commands::games(&config);
        }
        Command::Show {
            game,
            section,
            shiny,
            json,
        } => {
            let tracker = DexTracker::new(config.clone(), open_store(&cli, &config).await?)?;
            commands::show(&tracker, game, section.as_deref(), *shiny, *json).await?;
        }
        Command::Toggle { api_name, shiny } => {
            let tracker = DexTracker::new(config.clone(), open_store(&cli, &config).await?)?;
            commands::toggle(&tracker, api_name, *shiny).await?;
        }
        Command::Session => {
            let tracker = DexTracker::new(config.clone(), open_store(&cli, &config).await?)?;
            session::run(&tracker).await?;
        }
        Command::BuildLocal {
            game,
            sections,
            output,
        } => {
            commands::build_local(&config, game, sections, output.as_deref()).await?;
        }
    }

    Ok(())
}
