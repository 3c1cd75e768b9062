//! `tracing` subscriber setup. `RUST_LOG` always wins over the defaults.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to stderr for the HTTP server.
pub fn init_server_logging() {
    fmt().with_env_filter(env_filter("info")).init();
}

/// Log to a file while the TUI owns the terminal.
pub fn init_tui_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create log directory")?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    fmt()
        .with_env_filter(env_filter("warn"))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
