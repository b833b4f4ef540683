//! partywatch CLI
//!
//! Run once per schedule tick; with no subcommand it fetches the registry
//! page and announces what is new.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use partywatch::{
    error::{AppError, Result},
    models::{Config, Credential, PublisherKind},
    pipeline,
    services::{RecordExtractor, build_publisher},
    storage::{LocalStateStore, MemoryStateStore, StateLedger, StateStore},
    utils::http,
};

/// partywatch - UK party registration announcer
#[derive(Parser, Debug)]
#[command(
    name = "partywatch",
    version,
    about = "Announces new and renamed UK political party registration applications"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "partywatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the page and publish new announcements (default)
    Run,

    /// Store the publishing credential
    Authorize {
        /// Token to store; read from stdin when omitted
        #[arg(long)]
        token: Option<String>,
    },

    /// Print the records found on the page as JSON
    Extract {
        /// Parse a saved copy of the page instead of fetching it
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// Show state file info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn read_token() -> Result<String> {
    print!("Token: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Run once against `store` with the configured publisher.
async fn announce<S: StateStore>(config: &Config, client: &reqwest::Client, store: S) -> Result<()> {
    let mut ledger = StateLedger::open(store)?;
    let publisher = build_publisher(&config.publisher, client, ledger.credential())?;

    let summary = pipeline::run_once(config, client, &mut ledger, publisher.as_ref()).await?;
    log::info!(
        "Run complete: {} records, {} published, {} failed",
        summary.records,
        summary.published,
        summary.failed
    );
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config)?;
    let store = LocalStateStore::new(&config.state.path);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            config.validate()?;
            let client = http::create_client(&config.http)?;

            match config.publisher.kind {
                PublisherKind::DryRun => {
                    log::info!(
                        "Dry run: {} will not be modified",
                        config.state.path.display()
                    );
                    announce(&config, &client, MemoryStateStore::from_store(&store)?).await?;
                }
                PublisherKind::Webhook => announce(&config, &client, store).await?,
            }
        }

        Command::Authorize { token } => {
            let token = match token {
                Some(token) => token.trim().to_string(),
                None => read_token()?,
            };
            if token.is_empty() {
                return Err(AppError::credential("empty token"));
            }

            let mut ledger = StateLedger::open(store)?;
            ledger.set_credential(Credential::new(token))?;
            log::info!("Credential saved to {}", config.state.path.display());
        }

        Command::Extract { file } => {
            let html = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let client = http::create_client(&config.http)?;
                    http::fetch_page(&client, &config.source.url).await?
                }
            };

            let records = RecordExtractor::new(&config.source)?.extract(&html)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            RecordExtractor::new(&config.source)?;
            log::info!("✓ Config OK");
        }

        Command::Info => {
            let ledger = StateLedger::open(store)?;
            let state = ledger.state();
            log::info!("State file: {}", config.state.path.display());
            log::info!("Announced parties: {}", state.announced_names.len());
            log::info!(
                "Credential: {}",
                if state.credential.is_some() {
                    "stored"
                } else {
                    "not set"
                }
            );
            match state.updated_at {
                Some(updated) => log::info!("Last updated: {}", updated),
                None => log::info!("No state saved yet."),
            }
        }
    }

    Ok(())
}
