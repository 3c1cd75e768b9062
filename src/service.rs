//! The four brew operations, independent of transport. The axum handlers and
//! the in-process TUI backend both call straight into these functions, so the
//! validation and ordering rules live in exactly one place.

use anyhow::Result;
use chrono::{SubsecRound, Utc};
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::db::BrewStore;
use crate::error::{surface_error, CreateError};
use crate::models::{Brew, BrewField, BrewFields, Suggestions, ValidationError, SUGGESTION_LIMIT};

/// Validate `payload` and persist it. Nothing is written when validation
/// fails; the caller gets the first missing field in canonical order.
pub fn create_brew(store: &dyn BrewStore, payload: &Map<String, Value>) -> Result<Brew, CreateError> {
    let fields = BrewFields::from_values(|field| payload_value(payload, field)).map_err(|err| {
        warn!(%err, "rejected brew");
        err
    })?;

    let created_at = Utc::now().trunc_subsecs(3);
    match store.insert(&fields, created_at) {
        Ok(brew) => {
            info!(id = brew.id, coffee = %brew.fields.coffee, "brew created");
            Ok(brew)
        }
        Err(err) => {
            error!("failed to store brew: {err:#}");
            Err(CreateError::Storage(surface_error(&err)))
        }
    }
}

/// Read one field from a JSON payload. Strings pass through; numbers and
/// booleans are stored in their textual form; `null` counts as absent.
fn payload_value(payload: &Map<String, Value>, field: BrewField) -> Result<Option<String>, ValidationError> {
    match payload.get(field.name()) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(Value::Number(value)) => Ok(Some(value.to_string())),
        Some(Value::Bool(value)) => Ok(Some(value.to_string())),
        Some(Value::Array(_)) | Some(Value::Object(_)) => Err(ValidationError::InvalidField(field)),
    }
}

pub fn list_brews(store: &dyn BrewStore) -> Result<Vec<Brew>> {
    store.list()
}

pub fn latest_brew(store: &dyn BrewStore) -> Result<Option<Brew>> {
    store.latest()
}

/// Recently used distinct values for every suggestible field. Recomputed on
/// each call; one query per field.
pub fn suggestions(store: &dyn BrewStore) -> Result<Suggestions> {
    let mut suggestions = Suggestions::new();
    for field in BrewField::suggestible() {
        let values = store
            .distinct_values(field, SUGGESTION_LIMIT)?
            .into_iter()
            .flatten()
            .filter(|value| !value.is_empty())
            .take(SUGGESTION_LIMIT)
            .collect();
        suggestions.insert(field.name().to_string(), values);
    }
    Ok(suggestions)
}
