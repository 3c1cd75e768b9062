use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use axum::Router;
use brew_log::api::{router, AppState};
use brew_log::{Brew, BrewField, BrewFields, BrewStore, SqliteStore};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Store whose writes fail with a fixed message and whose reads see nothing.
struct FailingStore;

impl BrewStore for FailingStore {
    fn insert(&self, _fields: &BrewFields, _created_at: DateTime<Utc>) -> Result<Brew> {
        Err(anyhow!("db fail"))
    }

    fn list(&self) -> Result<Vec<Brew>> {
        Ok(Vec::new())
    }

    fn latest(&self) -> Result<Option<Brew>> {
        Ok(None)
    }

    fn distinct_values(&self, _field: BrewField, _limit: usize) -> Result<Vec<Option<String>>> {
        Ok(Vec::new())
    }
}

/// Store whose every read fails.
struct BrokenReads;

impl BrewStore for BrokenReads {
    fn insert(&self, _fields: &BrewFields, _created_at: DateTime<Utc>) -> Result<Brew> {
        Err(anyhow!("find error"))
    }

    fn list(&self) -> Result<Vec<Brew>> {
        Err(anyhow!("find error"))
    }

    fn latest(&self) -> Result<Option<Brew>> {
        Err(anyhow!("find error"))
    }

    fn distinct_values(&self, _field: BrewField, _limit: usize) -> Result<Vec<Option<String>>> {
        Err(anyhow!("suggest error"))
    }
}

fn app_with(store: Arc<dyn BrewStore>) -> Router {
    router(AppState::new(store))
}

fn memory_app() -> Router {
    app_with(Arc::new(SqliteStore::open_in_memory().unwrap()))
}

fn sample_brew() -> Value {
    json!({
        "date": "2024-01-01",
        "coffee": "Coffee",
        "roaster": "Roaster",
        "origin": "Origin",
        "process": "Process",
        "grind": "Medium",
        "grinder": "Grinder",
        "dripper": "V60",
        "filter": "paper",
        "waterType": "tap",
        "waterTemp": "92",
        "dose": "20",
        "waterWeight": "300",
        "brewTime": "2:30",
        "bloom": "30",
        "pours": "2",
        "agitation": "swirl",
        "flavorHot": "tasty",
        "acidity": "medium",
        "sweetness": "medium",
        "body": "full",
        "bitterness": "low",
        "flavorCool": "sweet",
        "balance": "good",
        "score": "9"
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post_brew(app: &Router, body: &Value) -> (StatusCode, Value) {
    send(app, Method::POST, "/brews", Some(body.to_string())).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

#[tokio::test]
async fn test_empty_post_is_missing_date() {
    let app = memory_app();
    let (status, body) = post_brew(&app, &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing field: date" }));
}

#[tokio::test]
async fn test_each_missing_field_is_named() {
    let app = memory_app();
    for field in BrewField::required() {
        let mut omitted = sample_brew();
        omitted.as_object_mut().unwrap().remove(field.name());
        let (status, body) = post_brew(&app, &omitted).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], format!("Missing field: {}", field.name()));

        let mut blank = sample_brew();
        blank[field.name()] = json!("");
        let (status, body) = post_brew(&app, &blank).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], format!("Missing field: {}", field.name()));
    }

    let (_, list) = get(&app, "/brews").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_valid_post_echoes_input_with_identity() {
    let app = memory_app();
    let (status, body) = post_brew(&app, &sample_brew()).await;
    assert_eq!(status, StatusCode::OK);

    let mut echoed = body.as_object().unwrap().clone();
    let id = echoed.remove("id").unwrap();
    let created_at = echoed.remove("createdAt").unwrap();
    assert!(id.as_i64().unwrap() > 0);
    assert!(created_at.as_str().unwrap().parse::<DateTime<Utc>>().is_ok());
    assert_eq!(Value::Object(echoed), sample_brew());
}

#[tokio::test]
async fn test_optional_notes_are_kept() {
    let app = memory_app();
    let mut brew = sample_brew();
    brew["extraNotes"] = json!("try finer next time");
    let (status, body) = post_brew(&app, &brew).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["extraNotes"], "try finer next time");
    assert!(body.get("notes").is_none());
}

#[tokio::test]
async fn test_bad_date_is_rejected() {
    let app = memory_app();
    let mut brew = sample_brew();
    brew["date"] = json!("01/01/2024");
    let (status, body) = post_brew(&app, &brew).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid date: 01/01/2024");
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = memory_app();
    let (status, body) = send(&app, Method::POST, "/brews", Some("not json".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Malformed payload");
}

#[tokio::test]
async fn test_body_without_content_type_is_still_json() {
    let app = memory_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/brews")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "Missing field: date" }));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/brews")
        .header(CONTENT_TYPE, "text/plain")
        .body(Body::from(sample_brew().to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_non_object_body_is_malformed() {
    let app = memory_app();
    let (status, body) = send(&app, Method::POST, "/brews", Some("[1, 2]".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Malformed payload");
}

#[tokio::test]
async fn test_storage_failure_returns_500_and_writes_nothing() {
    let app = app_with(Arc::new(FailingStore));
    let (status, body) = post_brew(&app, &sample_brew()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "db fail" }));

    let (status, list) = get(&app, "/brews").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = memory_app();
    let mut ids = Vec::new();
    for coffee in ["first", "second", "third"] {
        let mut brew = sample_brew();
        brew["coffee"] = json!(coffee);
        let (_, body) = post_brew(&app, &brew).await;
        ids.push(body["id"].as_i64().unwrap());
    }

    let (status, list) = get(&app, "/brews").await;
    assert_eq!(status, StatusCode::OK);
    let coffees: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|brew| brew["coffee"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(coffees, vec!["third", "second", "first"]);
    assert_eq!(list[0]["id"].as_i64(), ids.last().copied());
}

#[tokio::test]
async fn test_latest_is_404_until_first_brew() {
    let app = memory_app();
    let (status, body) = get(&app, "/brews/latest").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({}));

    let (_, created) = post_brew(&app, &sample_brew()).await;
    let (status, latest) = get(&app, "/brews/latest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest, created);
}

#[tokio::test]
async fn test_suggestions_cover_suggestible_fields() {
    let app = memory_app();
    let mut older = sample_brew();
    older["date"] = json!("2023-12-01");
    older["dripper"] = json!("Kalita");
    post_brew(&app, &older).await;
    post_brew(&app, &sample_brew()).await;

    let (status, body) = get(&app, "/brews/suggestions").await;
    assert_eq!(status, StatusCode::OK);
    let suggestions = body.as_object().unwrap();
    assert_eq!(suggestions.len(), 23);
    assert_eq!(body["dripper"], json!(["V60", "Kalita"]));
    assert_eq!(body["coffee"], json!(["Coffee"]));
    assert!(suggestions.get("score").is_none());
    assert!(suggestions.get("date").is_none());
}

#[tokio::test]
async fn test_suggestions_cap_at_twenty() {
    let app = memory_app();
    for idx in 0..25 {
        let mut brew = sample_brew();
        brew["origin"] = json!(format!("origin-{idx}"));
        post_brew(&app, &brew).await;
    }
    let (_, body) = get(&app, "/brews/suggestions").await;
    assert_eq!(body["origin"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_read_faults_answer_500() {
    let app = app_with(Arc::new(BrokenReads));
    for uri in ["/brews", "/brews/latest", "/brews/suggestions"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body["error"], "Internal server error");
    }
}

#[tokio::test]
async fn test_brews_survive_restart() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("brews.sqlite");

    let app = app_with(Arc::new(SqliteStore::open(&path).unwrap()));
    let (_, created) = post_brew(&app, &sample_brew()).await;
    drop(app);

    let app = app_with(Arc::new(SqliteStore::open(&path).unwrap()));
    let (_, list) = get(&app, "/brews").await;
    assert_eq!(list, json!([created]));
}
