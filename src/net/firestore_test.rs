use super::*;
use crate::test_helpers::spawn_stub;
use axum::Json;
use axum::Router;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

// =============================================================
// parse_document
// =============================================================

#[test]
fn parse_document_reads_string_fields() {
    let json = serde_json::json!({
        "name": "projects/p/databases/(default)/documents/users/u1",
        "fields": {
            "name": { "stringValue": "Ada" },
            "org": { "stringValue": "acme" },
            "role": { "stringValue": "admin" }
        }
    })
    .to_string();
    let doc = parse_document(&json).unwrap();
    assert_eq!(doc.name.as_deref(), Some("Ada"));
    assert_eq!(doc.org.as_deref(), Some("acme"));
    assert_eq!(doc.role.as_deref(), Some("admin"));
    assert_eq!(doc.stage, None);
    assert_eq!(doc.status, None);
}

#[test]
fn parse_document_flattens_scalars() {
    let json = serde_json::json!({
        "fields": {
            "stage": { "integerValue": "3" },
            "status": { "booleanValue": true },
            "role": { "doubleValue": 1.5 }
        }
    })
    .to_string();
    let doc = parse_document(&json).unwrap();
    assert_eq!(doc.stage.as_deref(), Some("3"));
    assert_eq!(doc.status.as_deref(), Some("true"));
    assert_eq!(doc.role.as_deref(), Some("1.5"));
}

#[test]
fn parse_document_ignores_structured_values() {
    let json = serde_json::json!({
        "fields": {
            "org": { "mapValue": { "fields": {} } },
            "role": { "nullValue": null }
        }
    })
    .to_string();
    let doc = parse_document(&json).unwrap();
    assert_eq!(doc, ProfileDocument::default());
}

#[test]
fn parse_document_without_fields_is_empty() {
    let doc = parse_document("{}").unwrap();
    assert_eq!(doc, ProfileDocument::default());
}

#[test]
fn parse_document_rejects_garbage() {
    assert!(matches!(parse_document("<html>"), Err(ApiError::Parse(_))));
}

// =============================================================
// FirestoreStore over HTTP
// =============================================================

async fn document_handler(
    Path(uid): Path<String>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Response {
    if params.get("key").map(String::as_str) != Some("k1") {
        return StatusCode::FORBIDDEN.into_response();
    }
    match uid.as_str() {
        "u1" => Json(serde_json::json!({
            "fields": { "org": { "stringValue": "acme" } }
        }))
        .into_response(),
        "team" => Json(serde_json::json!({
            "fields": { "org": { "stringValue": "wrong-team" } }
        }))
        .into_response(),
        "team#1" | "a?b%c/d" => Json(serde_json::json!({
            "fields": { "org": { "stringValue": uid } }
        }))
        .into_response(),
        "broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn stub_router() -> Router {
    Router::new().route(
        "/v1/projects/demo/databases/(default)/documents/users/{uid}",
        get(document_handler),
    )
}

#[tokio::test]
async fn user_document_returns_existing_document() {
    let base = spawn_stub(stub_router()).await;
    let store = FirestoreStore::new(&format!("{base}/v1"), "demo", Some("k1".into())).unwrap();

    let doc = store.user_document("u1").await.unwrap().unwrap();
    assert_eq!(doc.org.as_deref(), Some("acme"));
}

#[tokio::test]
async fn user_document_missing_is_none() {
    let base = spawn_stub(stub_router()).await;
    let store = FirestoreStore::new(&format!("{base}/v1/"), "demo", Some("k1".into())).unwrap();

    assert!(store.user_document("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn user_document_server_error_is_status_error() {
    let base = spawn_stub(stub_router()).await;
    let store = FirestoreStore::new(&format!("{base}/v1"), "demo", Some("k1".into())).unwrap();

    let err = store.user_document("broken").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn user_document_escapes_reserved_characters_in_uid() {
    let base = spawn_stub(stub_router()).await;
    let store = FirestoreStore::new(&format!("{base}/v1"), "demo", Some("k1".into())).unwrap();

    let doc = store.user_document("team#1").await.unwrap().unwrap();
    assert_eq!(doc.org.as_deref(), Some("team#1"));

    let doc = store.user_document("a?b%c/d").await.unwrap().unwrap();
    assert_eq!(doc.org.as_deref(), Some("a?b%c/d"));
}

#[test]
fn document_url_keeps_uid_in_one_segment() {
    let store = FirestoreStore::new("https://firestore.example.test/v1/", "demo", None).unwrap();
    assert_eq!(
        store.document_url("team#1?x").as_str(),
        "https://firestore.example.test/v1/projects/demo/databases/(default)/documents/users/team%231%3Fx"
    );
}

#[test]
fn new_rejects_relative_base_url() {
    let err = FirestoreStore::new("firestore/v1", "demo", None).err().unwrap();
    assert!(matches!(err, ApiError::HttpClientBuild(_)));
}
