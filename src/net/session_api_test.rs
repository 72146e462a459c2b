use super::*;
use crate::test_helpers::spawn_stub;
use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;

async fn status_handler(headers: HeaderMap, body: String) -> Response {
    let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());
    if content_type != Some("application/json") || body != "{}" {
        return (StatusCode::BAD_REQUEST, "expected empty json body").into_response();
    }
    match headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        Some("session=good") => Json(serde_json::json!({
            "success": true,
            "user": { "uid": "u1", "email": "a@b.com" }
        }))
        .into_response(),
        Some("session=garbled") => "not json".into_response(),
        Some(_) => Json(serde_json::json!({ "success": false, "error": "expired" })).into_response(),
        None => (StatusCode::UNAUTHORIZED, "no session").into_response(),
    }
}

fn stub_router() -> Router {
    Router::new()
        .route("/auth/status", post(status_handler))
        .route("/auth/signout", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
}

#[tokio::test]
async fn status_sends_cookie_and_parses_user() {
    let base = spawn_stub(stub_router()).await;
    let api = HttpSessionApi::new(&format!("{base}/auth/"), Some("session=good")).unwrap();

    let resp = api.status().await.unwrap();
    assert!(resp.success);
    assert_eq!(resp.user.unwrap().uid, "u1");
}

#[tokio::test]
async fn status_reports_unsuccessful_body() {
    let base = spawn_stub(stub_router()).await;
    let api = HttpSessionApi::new(&format!("{base}/auth"), Some("session=stale")).unwrap();

    let resp = api.status().await.unwrap();
    assert!(!resp.success);
    assert_eq!(resp.error.as_deref(), Some("expired"));
}

#[tokio::test]
async fn status_maps_unauthorized_to_status_error() {
    let base = spawn_stub(stub_router()).await;
    let api = HttpSessionApi::new(&format!("{base}/auth"), None).unwrap();

    let err = api.status().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn status_rejects_non_json_body() {
    let base = spawn_stub(stub_router()).await;
    let api = HttpSessionApi::new(&format!("{base}/auth"), Some("session=garbled")).unwrap();

    assert!(matches!(api.status().await, Err(ApiError::Parse(_))));
}

#[tokio::test]
async fn status_unreachable_host_is_request_error() {
    let api = HttpSessionApi::new("http://127.0.0.1:1/auth", None).unwrap();
    assert!(matches!(api.status().await, Err(ApiError::Request(_))));
}

#[tokio::test]
async fn sign_out_accepts_any_status() {
    let base = spawn_stub(stub_router()).await;
    let api = HttpSessionApi::new(&format!("{base}/auth"), Some("session=good")).unwrap();

    assert!(api.sign_out().await.is_ok());
}

/// Answer one request with a 401 whose body is cut short.
async fn spawn_truncated_unauthorized() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.ends_with(b"{}") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 401 Unauthorized\r\ncontent-length: 100\r\nconnection: close\r\n\r\nno sess")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn status_keeps_unauthorized_when_body_is_truncated() {
    let base = spawn_truncated_unauthorized().await;
    let api = HttpSessionApi::new(&format!("{base}/auth"), None).unwrap();

    let err = api.status().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[test]
fn new_rejects_cookie_with_newline() {
    let err = HttpSessionApi::new("http://localhost/auth", Some("a=b\nc=d")).err().unwrap();
    assert!(err.to_string().contains("invalid cookie"));
}

#[test]
fn parse_status_response_reads_minimal_body() {
    let resp = parse_status_response(r#"{"success":true}"#).unwrap();
    assert!(resp.success);
    assert!(resp.user.is_none());
}
