//! Binary entry point: parse flags, open the SQLite store, then either serve
//! the HTTP API or run the terminal UI.
use std::sync::Arc;

use anyhow::{Context, Result};
use brew_log::cli::{Cli, Commands, StorageArgs};
use brew_log::client::{BrewBackend, HttpBackend, LocalBackend};
use brew_log::config::Config;
use brew_log::logging::{init_server_logging, init_tui_logging};
use brew_log::server::start_server;
use brew_log::{run_app, App, BrewStore, SqliteStore};
use clap::Parser;
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            init_server_logging();
            let config = Config::load(&cli.storage)?;
            info!("Opening database at {}", config.db_path.display());
            let store: Arc<dyn BrewStore> = Arc::new(SqliteStore::open(&config.db_path)?);

            let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            runtime.block_on(start_server(store, &host, port))
        }
        Some(Commands::Tui) | None => tui(&cli.storage, cli.remote.remote),
    }
}

/// Run the terminal UI against either a remote server or the local database.
fn tui(storage: &StorageArgs, remote: Option<String>) -> Result<()> {
    let config = Config::load(storage)?;
    init_tui_logging(&config.tui_log_path())?;

    let backend: Box<dyn BrewBackend> = match remote {
        Some(url) => {
            info!("Using remote brew server at {url}");
            Box::new(HttpBackend::new(url))
        }
        None => {
            info!("Opening database at {}", config.db_path.display());
            let store: Arc<dyn BrewStore> = Arc::new(SqliteStore::open(&config.db_path)?);
            Box::new(LocalBackend::new(store))
        }
    };

    let mut app = App::new(backend);
    run_app(&mut app)
}
