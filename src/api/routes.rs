use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::models::{Brew, Suggestions};
use crate::service;

use super::error::ApiError;
use super::AppState;

pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Vec<Brew>>, ApiError> {
    let brews = service::list_brews(state.store.as_ref())?;
    debug!(count = brews.len(), "listed brews");
    Ok(Json(brews))
}

pub async fn latest_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let response = match service::latest_brew(state.store.as_ref())? {
        Some(brew) => Json(brew).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    };
    Ok(response)
}

/// The body is parsed as JSON whatever its `Content-Type`; anything other
/// than a JSON object is a malformed payload.
pub async fn create_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<Brew>, ApiError> {
    let payload = serde_json::from_slice::<Map<String, Value>>(&body).map_err(|err| {
        debug!(%err, "unreadable brew payload");
        ApiError::MalformedPayload
    })?;

    let brew = service::create_brew(state.store.as_ref(), &payload)?;
    Ok(Json(brew))
}

pub async fn suggestions_handler(State(state): State<AppState>) -> Result<Json<Suggestions>, ApiError> {
    Ok(Json(service::suggestions(state.store.as_ref())?))
}
