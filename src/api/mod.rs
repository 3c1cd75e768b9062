//! HTTP surface for the brew log.
//!
//! | Method | Path                | Success                     |
//! |--------|---------------------|-----------------------------|
//! | GET    | `/brews`            | 200, newest first           |
//! | GET    | `/brews/latest`     | 200, or 404 with `{}`       |
//! | POST   | `/brews`            | 200 with the stored record  |
//! | GET    | `/brews/suggestions`| 200, field → recent values  |
//!
//! Failures answer `{ "error": "<message>" }` (see [`error::ApiError`]).

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::BrewStore;

pub mod error;
pub mod routes;

use routes::{create_handler, latest_handler, list_handler, suggestions_handler};

/// Shared handler state: nothing but the store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BrewStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn BrewStore>) -> Self {
        Self { store }
    }
}

/// Build the router with CORS and request tracing applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/brews", get(list_handler).post(create_handler))
        .route("/brews/latest", get(latest_handler))
        .route("/brews/suggestions", get(suggestions_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
