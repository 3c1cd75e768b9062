//! Backends the TUI uses to reach the brew operations: either in-process
//! against the local store, or over HTTP against `brew-log serve`.

use std::sync::Arc;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::db::BrewStore;
use crate::error::surface_error;
use crate::models::{Brew, Suggestions};
use crate::service;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The operation ran and refused the request; the message is shown as is.
    #[error("{0}")]
    Rejected(String),

    /// The request never produced a usable answer.
    #[error("Network error: {0}")]
    Network(String),
}

/// The operations the form and list screens need.
pub trait BrewBackend {
    fn list(&self) -> Result<Vec<Brew>, ClientError>;
    fn suggestions(&self) -> Result<Suggestions, ClientError>;
    fn create(&self, payload: &Map<String, Value>) -> Result<Brew, ClientError>;
}

/// Calls the service functions directly against a store in this process.
pub struct LocalBackend {
    store: Arc<dyn BrewStore>,
}

impl LocalBackend {
    pub fn new(store: Arc<dyn BrewStore>) -> Self {
        Self { store }
    }
}

impl BrewBackend for LocalBackend {
    fn list(&self) -> Result<Vec<Brew>, ClientError> {
        service::list_brews(self.store.as_ref()).map_err(|err| ClientError::Rejected(surface_error(&err)))
    }

    fn suggestions(&self) -> Result<Suggestions, ClientError> {
        service::suggestions(self.store.as_ref()).map_err(|err| ClientError::Rejected(surface_error(&err)))
    }

    fn create(&self, payload: &Map<String, Value>) -> Result<Brew, ClientError> {
        service::create_brew(self.store.as_ref(), payload).map_err(|err| ClientError::Rejected(err.to_string()))
    }
}

/// Body of every non-2xx response from the API.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Blocking HTTP client for a remote `brew-log serve`.
pub struct HttpBackend {
    base_url: String,
    http: Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.http.get(self.url(path)).send().map_err(network)?;
        read_json(response)
    }
}

impl BrewBackend for HttpBackend {
    fn list(&self) -> Result<Vec<Brew>, ClientError> {
        self.get("/brews")
    }

    fn suggestions(&self) -> Result<Suggestions, ClientError> {
        self.get("/brews/suggestions")
    }

    fn create(&self, payload: &Map<String, Value>) -> Result<Brew, ClientError> {
        let response = self
            .http
            .post(self.url("/brews"))
            .json(payload)
            .send()
            .map_err(network)?;
        read_json(response)
    }
}

fn network(err: reqwest::Error) -> ClientError {
    warn!("brew server unreachable: {err}");
    ClientError::Network(err.to_string())
}

/// Decode a success body, or turn an error body into [`ClientError::Rejected`].
fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return response.json().map_err(network);
    }

    let message = response
        .json::<ErrorBody>()
        .map(|body| body.error)
        .unwrap_or_else(|_| format!("Request failed ({status})."));
    Err(ClientError::Rejected(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::models::tests::sample_draft;

    fn local() -> LocalBackend {
        LocalBackend::new(Arc::new(SqliteStore::open_in_memory().unwrap()))
    }

    #[test]
    fn test_local_backend_create_then_list() {
        let backend = local();
        let brew = backend.create(&sample_draft().to_payload()).unwrap();
        assert_eq!(backend.list().unwrap(), vec![brew]);
        assert_eq!(backend.suggestions().unwrap()["dripper"], vec!["V60".to_string()]);
    }

    #[test]
    fn test_local_backend_surfaces_validation_message() {
        let err = local().create(&Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "Missing field: date");
    }

    #[test]
    fn test_unreachable_server_is_a_network_error() {
        let backend = HttpBackend::new("http://127.0.0.1:9/");
        let err = backend.list().unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert!(err.to_string().starts_with("Network error: "));
    }
}
