//! Wire types and collaborator traits shared by the HTTP clients.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gate talks to three external services: the auth functions (status and
//! sign-out), the document store, and the identity provider. Each is reached
//! through a trait defined here so the app can be wired with real HTTP
//! clients or with in-process doubles.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by the HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, TLS, body read).
    #[error("request failed: {0}")]
    Request(String),

    /// The remote returned a status the caller does not accept.
    #[error("unexpected response status {status}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the remote answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// AUTH FUNCTIONS
// =============================================================================

/// User record attached to a valid session by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub uid: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
}

/// Body of `POST {apiBase}/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub user: Option<SessionUser>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Credentialed calls against the auth functions.
#[async_trait::async_trait]
pub trait SessionApi: Send + Sync {
    /// Ask whether the attached session cookie is valid.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] for any non-2xx answer and
    /// [`ApiError::Request`]/[`ApiError::Parse`] for transport or body failures.
    async fn status(&self) -> Result<StatusResponse, ApiError>;

    /// Invalidate the session server-side. Any HTTP status counts as done.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] when no response was received.
    async fn sign_out(&self) -> Result<(), ApiError>;
}

// =============================================================================
// DOCUMENT STORE
// =============================================================================

/// Supplementary profile fields stored at `users/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Read access to the user profile collection.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch `users/{uid}`; `Ok(None)` when the document does not exist.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the store cannot be reached or answers
    /// with something other than a document or a not-found.
    async fn user_document(&self, uid: &str) -> Result<Option<ProfileDocument>, ApiError>;
}

// =============================================================================
// IDENTITY PROVIDER
// =============================================================================

/// Identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
