use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "brew-log")]
#[command(version, about = "Log pour-over brews and browse past ones")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(flatten)]
    pub remote: RemoteArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Default)]
pub struct StorageArgs {
    /// SQLite database file (defaults to ~/.brew-log/brews.sqlite)
    #[arg(long, env = "BREW_LOG_DB", global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct RemoteArgs {
    /// Talk to a running server instead of opening the database directly
    #[arg(long, env = "BREW_LOG_REMOTE", global = true, value_name = "URL")]
    pub remote: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the JSON API over HTTP
    Serve {
        /// Interface to bind
        #[arg(long, env = "BREW_LOG_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(long, env = "BREW_LOG_PORT", default_value_t = 3000)]
        port: u16,
    },

    /// Open the interactive brew log (default)
    Tui,
}
