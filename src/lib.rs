//! Core library surface for the brew log.
//!
//! The binary wires these pieces together in two shapes: `serve` exposes the
//! brew operations over HTTP, and `tui` drives them from the terminal, either
//! in-process or against a running server.
pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod service;
pub mod ui;

/// Persistence entry points used by `main.rs` and the integration tests.
pub use db::{BrewStore, SqliteStore};

/// Domain types that every layer passes around.
pub use models::{Brew, BrewDraft, BrewField, BrewFields, Suggestions, ValidationError};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
