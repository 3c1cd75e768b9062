//! Persistence module split across logical submodules.

mod brews;
mod connection;
mod store;

pub use brews::{fetch_brews, fetch_distinct_values, fetch_latest_brew, insert_brew};
pub use connection::{default_db_path, ensure_schema, open_in_memory};
pub use store::{BrewStore, SqliteStore};
