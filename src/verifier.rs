//! Session-cookie verification.
//!
//! ERROR HANDLING
//! ==============
//! Three causes (unsuccessful body, HTTP 401, anything else) are kept apart
//! in [`AuthFailure`] for logging, but callers react to all of them the same
//! way: show the failure text and redirect to login. There is exactly one
//! attempt per call.

use std::sync::Arc;

use serde::Serialize;

use crate::net::types::{SessionApi, SessionUser};

/// Why the session check did not produce an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    /// The status endpoint answered `success: false`.
    #[error("No valid session found")]
    NoSession,

    /// The status endpoint answered HTTP 401.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Transport failure or any other unexpected answer.
    #[error("{0}")]
    Request(String),
}

impl AuthFailure {
    /// Status line shown while the redirect is pending.
    #[must_use]
    pub fn status_message(&self) -> String {
        match self {
            Self::NoSession => "No valid session, redirecting...".to_string(),
            other => format!("{other}, redirecting..."),
        }
    }
}

pub struct SessionVerifier {
    api: Arc<dyn SessionApi>,
}

impl SessionVerifier {
    #[must_use]
    pub fn new(api: Arc<dyn SessionApi>) -> Self {
        Self { api }
    }

    /// Check the session cookie with the status endpoint.
    ///
    /// A successful answer without a user object still counts as an
    /// authenticated session and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFailure`] for any outcome other than `success: true`.
    pub async fn check_auth(&self) -> Result<Option<SessionUser>, AuthFailure> {
        match self.api.status().await {
            Ok(resp) if resp.success => {
                if let Some(user) = &resp.user {
                    tracing::info!(uid = %user.uid, "session cookie valid");
                } else {
                    tracing::info!("session cookie valid; no user attached");
                }
                Ok(resp.user)
            }
            Ok(resp) => {
                tracing::warn!(server_error = ?resp.error, "status endpoint reported no session");
                Err(AuthFailure::NoSession)
            }
            Err(e) if e.status() == Some(401) => {
                tracing::warn!("status endpoint answered 401");
                Err(AuthFailure::NotAuthenticated)
            }
            Err(e) => {
                tracing::warn!(error = %e, "auth check failed");
                Err(AuthFailure::Request(e.to_string()))
            }
        }
    }
}

/// Serializable summary of one session check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCheck {
    pub is_authenticated: bool,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Result<Option<SessionUser>, AuthFailure>> for SessionCheck {
    fn from(result: &Result<Option<SessionUser>, AuthFailure>) -> Self {
        match result {
            Ok(user) => Self { is_authenticated: true, success: true, user: user.clone(), error: None },
            Err(failure) => Self {
                is_authenticated: false,
                success: false,
                user: None,
                error: Some(failure.to_string()),
            },
        }
    }
}

#[cfg(test)]
#[path = "verifier_test.rs"]
mod tests;
