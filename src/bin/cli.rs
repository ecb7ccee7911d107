//! Disclosure feed CLI
//!
//! Runs one harvest per invocation; schedule it externally (cron, CI).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use disclosure_feed::{
    error::Result,
    models::Config,
    pipeline,
    services::{PortalClient, RssFeedWriter},
    storage::{HistoryStore, LocalHistoryStore},
};

/// disclosure-feed - EU Transparency Portal to RSS
#[derive(Parser, Debug)]
#[command(
    name = "disclosure-feed",
    version,
    about = "Harvests EU Transparency Portal disclosures into an RSS feed"
)]
struct Cli {
    /// Directory holding config.toml, the history file and the feed
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch new documents, update history and write the feed
    Sync {
        /// Override the page ceiling for this run
        #[arg(long)]
        max_pages: Option<usize>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild the feed from stored history without fetching
    Render,

    /// Validate configuration
    Validate,

    /// Show history and feed status
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.data_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path);
    log::debug!("Using data directory {}", cli.data_dir.display());

    let store = LocalHistoryStore::new(config.storage.history_path(&cli.data_dir))
        .with_retention_limit(config.sync.retention_limit);
    let feed_path = config.feed.output_path(&cli.data_dir);

    match cli.command {
        Command::Sync { max_pages, json } => {
            if let Some(max_pages) = max_pages {
                config.sync.max_pages = max_pages;
            }
            config.validate()?;

            let source = PortalClient::new(&config.source)?;
            let publisher = RssFeedWriter::new(config.feed.clone(), &feed_path);
            let report = pipeline::run_sync(&config, &source, &store, &publisher).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }

        Command::Render => {
            let publisher = RssFeedWriter::new(config.feed.clone(), &feed_path);
            let count = pipeline::run_render(&store, &publisher).await?;
            log::info!("Rendered {} items", count);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info => {
            let history = store.load().await;
            log::info!("History file: {}", store.path().display());
            log::info!("History entries: {}", history.len());
            if let Some(newest) = history.newest() {
                log::info!(
                    "Newest: {} ({}, {}) {}",
                    newest.id,
                    newest.disclosure_date,
                    newest.disclosure_type,
                    newest.title
                );
            }
            log::info!(
                "Feed: {}",
                if feed_path.exists() {
                    "exists"
                } else {
                    "not found"
                }
            );
        }
    }

    Ok(())
}
