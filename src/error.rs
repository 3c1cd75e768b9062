//! Error types shared across the service, the HTTP layer, and the TUI client.

use anyhow::Error;
use thiserror::Error as ThisError;

use crate::models::ValidationError;

/// Why a create request did not produce a brew.
#[derive(Debug, ThisError)]
pub enum CreateError {
    /// The payload was refused before touching the store.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The store itself failed; carries the deepest underlying message.
    #[error("{0}")]
    Storage(String),
}

/// Extract the most relevant error message from a chained error.
pub fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
