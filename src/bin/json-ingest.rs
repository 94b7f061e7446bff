//! # json-ingest
//!
//! HTTP service that takes a request carrying an `Authorization` token and a
//! JSON body, and upserts the body's values into the table registered for that
//! token.
//!
//! ## Usage
//!
//! ```bash
//! json-ingest --config config.json --tables tables.json --verbose
//! ```
//!
//! Both files are read once at startup. A missing or malformed file stops the
//! process before it starts listening.

use clap::Parser;
use json_ingest::{IngestHandler, MappingRegistry, ServerConfig, SqlStore, http};
use log::{LevelFilter, error, info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Takes an HTTP request carrying a JSON body and puts it into a preconfigured SQL database.
#[derive(Debug, Parser)]
#[command(name = "json-ingest", version)]
struct Cli {
    /// Process configuration file (listen port, database connection)
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Token to table mapping file
    #[arg(long, default_value = "tables.json")]
    tables: PathBuf,

    /// Log per-request outcomes and failure causes
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_path(&cli.config)?;
    let registry = MappingRegistry::from_path(&cli.tables)?;

    for (token, descriptor) in registry.iter() {
        if let Err(e) = descriptor.validate() {
            warn!(
                "mapping for table '{}' (token: {}) will reject every request: {}",
                descriptor.table(),
                json_ingest::handler::token_fingerprint(token),
                e
            );
        }
    }

    let store = SqlStore::connect_lazy(&config.database_url(), config.acquire_timeout())?;
    let token_count = registry.len();
    let handler = Arc::new(IngestHandler::new(Arc::new(registry), store));

    let address = config.listen_address();
    let listener = TcpListener::bind(&address).await?;
    info!("json-ingest listening on http://{address} ({token_count} tokens registered)");

    http::serve(listener, handler).await?;
    Ok(())
}
