//! Shared test doubles for the collaborator traits.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::time::Instant;

use crate::net::types::{ApiError, DocumentStore, Identity, ProfileDocument, SessionApi, SessionUser, StatusResponse};
use crate::observer::{IdentityHub, IdentityProvider, IdentitySubscription};
use crate::redirect::Navigator;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_stub(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Fresh state-file path under the temp dir; the file does not exist yet.
pub fn temp_state_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    std::env::temp_dir()
        .join(format!("session-gate-{tag}-{}-{nanos}", std::process::id()))
        .join("state.json")
}

pub fn identity(uid: &str, email: Option<&str>, display_name: Option<&str>) -> Identity {
    Identity {
        uid: uid.to_string(),
        email: email.map(str::to_string),
        display_name: display_name.map(str::to_string),
    }
}

// =========================================================================
// MockSessionApi
// =========================================================================

/// Canned answer for `POST /status`.
#[derive(Clone)]
pub enum StatusScript {
    Body(StatusResponse),
    HttpStatus(u16),
    Unreachable,
}

impl StatusScript {
    pub fn valid(uid: &str, email: &str) -> Self {
        Self::Body(StatusResponse {
            success: true,
            user: Some(SessionUser { uid: uid.into(), email: email.into(), name: None, org: None }),
            error: None,
        })
    }

    pub fn rejected() -> Self {
        Self::Body(StatusResponse { success: false, user: None, error: Some("expired".into()) })
    }
}

pub struct MockSessionApi {
    status: StatusScript,
    sign_out_fails: bool,
    pub status_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
}

impl MockSessionApi {
    pub fn new(status: StatusScript) -> Self {
        Self { status, sign_out_fails: false, status_calls: AtomicUsize::new(0), sign_out_calls: AtomicUsize::new(0) }
    }

    pub fn with_failing_sign_out(mut self) -> Self {
        self.sign_out_fails = true;
        self
    }
}

#[async_trait::async_trait]
impl SessionApi for MockSessionApi {
    async fn status(&self) -> Result<StatusResponse, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        match &self.status {
            StatusScript::Body(resp) => Ok(resp.clone()),
            StatusScript::HttpStatus(status) => Err(ApiError::Status { status: *status, body: String::new() }),
            StatusScript::Unreachable => Err(ApiError::Request("connection refused".into())),
        }
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.sign_out_fails {
            return Err(ApiError::Request("connection reset".into()));
        }
        Ok(())
    }
}

// =========================================================================
// MockStore
// =========================================================================

#[derive(Default)]
pub struct MockStore {
    docs: HashMap<String, ProfileDocument>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl MockStore {
    pub fn with_doc(mut self, uid: &str, doc: ProfileDocument) -> Self {
        self.docs.insert(uid.to_string(), doc);
        self
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }
}

#[async_trait::async_trait]
impl DocumentStore for MockStore {
    async fn user_document(&self, uid: &str) -> Result<Option<ProfileDocument>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ApiError::Status { status: 503, body: "unavailable".into() });
        }
        Ok(self.docs.get(uid).cloned())
    }
}

// =========================================================================
// RecordingNavigator
// =========================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<(String, Instant)>>,
}

impl RecordingNavigator {
    pub fn urls(&self) -> Vec<String> {
        self.visits.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }

    pub fn visits(&self) -> Vec<(String, Instant)> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.visits.lock().unwrap().push((url.to_string(), Instant::now()));
    }
}

// =========================================================================
// CountingProvider
// =========================================================================

/// Identity hub that counts subscribe calls.
#[derive(Default)]
pub struct CountingProvider {
    pub hub: IdentityHub,
    pub subscriptions: AtomicUsize,
}

impl IdentityProvider for CountingProvider {
    fn subscribe(&self) -> IdentitySubscription {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        self.hub.subscribe()
    }
}
