use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::models::{Brew, BrewField, BrewFields};

use super::brews::{fetch_brews, fetch_distinct_values, fetch_latest_brew, insert_brew};
use super::connection::{ensure_schema, open_in_memory};

/// Generic query/insert surface over whatever holds the brew table. The API
/// and the TUI only ever talk to this trait.
pub trait BrewStore: Send + Sync {
    /// Persist one brew atomically and return it with its assigned id.
    fn insert(&self, fields: &BrewFields, created_at: DateTime<Utc>) -> Result<Brew>;

    /// All brews, newest first.
    fn list(&self) -> Result<Vec<Brew>>;

    /// The newest brew, or `None` for an empty store.
    fn latest(&self) -> Result<Option<Brew>>;

    /// Up to `limit` distinct values of `field`, ranked by brew date. Raw
    /// values are returned as stored, so callers still filter blanks.
    fn distinct_values(&self, field: BrewField, limit: usize) -> Result<Vec<Option<String>>>;
}

/// SQLite-backed store sharing one connection between requests.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and migrate) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_connection(ensure_schema(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }
}

impl BrewStore for SqliteStore {
    fn insert(&self, fields: &BrewFields, created_at: DateTime<Utc>) -> Result<Brew> {
        let conn = self.conn()?;
        insert_brew(&conn, fields, created_at)
    }

    fn list(&self) -> Result<Vec<Brew>> {
        let conn = self.conn()?;
        fetch_brews(&conn)
    }

    fn latest(&self) -> Result<Option<Brew>> {
        let conn = self.conn()?;
        fetch_latest_brew(&conn)
    }

    fn distinct_values(&self, field: BrewField, limit: usize) -> Result<Vec<Option<String>>> {
        let conn = self.conn()?;
        fetch_distinct_values(&conn, field, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::sample_draft;
    use chrono::SubsecRound;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_persists_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("brews.sqlite");
        let fields = sample_draft().validate().unwrap();

        let created = {
            let store = SqliteStore::open(&path).unwrap();
            store.insert(&fields, Utc::now()).unwrap()
        };

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.latest().unwrap().map(|b| b.id), Some(created.id));
        assert_eq!(reopened.list().unwrap().len(), 1);
    }

    #[test]
    fn test_in_memory_store_round_trips_every_operation() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.latest().unwrap().is_none());

        let fields = sample_draft().validate().unwrap();
        let created = store.insert(&fields, Utc::now().trunc_subsecs(3)).unwrap();

        assert_eq!(store.list().unwrap(), vec![created.clone()]);
        assert_eq!(store.latest().unwrap(), Some(created));
        assert_eq!(
            store.distinct_values(BrewField::Dripper, 20).unwrap(),
            vec![Some("V60".to_string())]
        );
    }
}
