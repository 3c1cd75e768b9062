//! Resolved runtime settings. Flags and environment variables are parsed by
//! [`crate::cli`]; this module fills in the defaults that need the filesystem.

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::StorageArgs;
use crate::db::default_db_path;

/// Log file written next to the database while the TUI owns the terminal.
const TUI_LOG_FILE: &str = "brew-log.log";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    pub fn load(storage: &StorageArgs) -> Result<Self> {
        let db_path = match &storage.db {
            Some(path) => path.clone(),
            None => default_db_path()?,
        };
        Ok(Self { db_path })
    }

    pub fn tui_log_path(&self) -> PathBuf {
        self.db_path.with_file_name(TUI_LOG_FILE)
    }
}
