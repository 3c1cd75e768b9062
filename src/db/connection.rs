use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::Connection;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".brew-log";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "brews.sqlite";

/// Ensure the database file exists, run lazy migrations, and return a live
/// connection.
pub fn ensure_schema(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    let conn = Connection::open(db_path).context("failed to open SQLite database")?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Same schema as [`ensure_schema`] but without touching the filesystem.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Create the single `brews` table. Required attributes are `NOT NULL`; the
/// three notes columns stay nullable because they are optional on input.
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS brews (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            coffee TEXT NOT NULL,
            roaster TEXT NOT NULL,
            origin TEXT NOT NULL,
            process TEXT NOT NULL,
            notes TEXT,
            grind TEXT NOT NULL,
            grinder TEXT NOT NULL,
            dripper TEXT NOT NULL,
            filter TEXT NOT NULL,
            water_type TEXT NOT NULL,
            water_temp TEXT NOT NULL,
            dose TEXT NOT NULL,
            water_weight TEXT NOT NULL,
            brew_time TEXT NOT NULL,
            bloom TEXT NOT NULL,
            pours TEXT NOT NULL,
            agitation TEXT NOT NULL,
            flavor_hot TEXT NOT NULL,
            acidity TEXT NOT NULL,
            sweetness TEXT NOT NULL,
            body TEXT NOT NULL,
            bitterness TEXT NOT NULL,
            flavor_cool TEXT NOT NULL,
            new_notes TEXT,
            balance TEXT NOT NULL,
            score TEXT NOT NULL,
            extra_notes TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create brews table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_brews_created_at ON brews(created_at)",
        [],
    )
    .context("failed to create created_at index")?;

    Ok(())
}

/// Resolve the default database path inside the user's home.
pub fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_schema_creates_nested_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("brews.sqlite");
        let _conn = ensure_schema(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("brews.sqlite");
        drop(ensure_schema(&path).unwrap());
        let conn = ensure_schema(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM brews", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
