//! # shopfront
//!
//! Command-line front end for one shopping session.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Startup Flow                                   │
//! │                                                                         │
//! │  1. Parse arguments                                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  2. Initialize tracing (-v / -q, else RUST_LOG, else defaults)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  3. Load configuration (shopfront.toml + SHOPFRONT_* env)               │
//! │           │                                                             │
//! │           ├── `config` subcommand stops here                            │
//! │           ▼                                                             │
//! │  4. Open local storage (creates the data dir, runs migrations)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  5. Build catalog client + SessionStore (restores the saved cart)       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  6. Run subcommand, exit 0 on success, 1 on error                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cli;
mod commands;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use shopfront_api::CatalogClient;
use shopfront_session::{SessionResult, SessionStore, ShopfrontConfig};
use shopfront_storage::Database;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

/// Filter used when neither -v/-q nor RUST_LOG is given.
const DEFAULT_LOG_FILTER: &str = "info,shopfront=debug,sqlx=warn";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(&cli.verbosity);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting shopfront");

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error [{}]: {}", err.code(), err);
            1
        }
    };

    std::process::exit(exit_code);
}

/// Logs go to stderr so stdout stays clean for tables and `--json`.
fn init_tracing(verbosity: &Verbosity<InfoLevel>) {
    let filter = if verbosity.is_present() {
        EnvFilter::new(verbosity.tracing_level_filter().to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> SessionResult<()> {
    // An explicit --config must load cleanly; the implicit one may fall back.
    let config = match &cli.config {
        Some(path) => ShopfrontConfig::load(Some(path.clone()))?,
        None => ShopfrontConfig::load_or_default(None),
    };
    debug!(?config, "Configuration loaded");

    if let Command::Config { save } = cli.command {
        return commands::config(&config, save, cli.config);
    }

    let db = Database::new(config.db_config()).await?;

    let client = CatalogClient::new(&config.api)?;
    let mut session = SessionStore::open(db, client, config.checkout_policy()).await?;

    let result = commands::dispatch(&mut session, &config, cli.command, cli.json).await;

    session.storage().close().await;
    result
}
