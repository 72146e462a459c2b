//! Identity Toolkit `accounts:lookup` client.
//!
//! Resolves an ID token to the provider's view of the user and feeds the
//! result into an [`IdentityHub`]. The hub starts out empty, so subscribers
//! see "no identity" until the lookup lands.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use super::types::{ApiError, Identity};
use crate::observer::IdentityHub;

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

pub struct IdentityToolkit {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl IdentityToolkit {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: String) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string(), api_key })
    }

    /// Look up the account behind `id_token`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, a non-2xx answer, or an
    /// unparseable body.
    pub async fn lookup(&self, id_token: &str) -> Result<Option<Identity>, ApiError> {
        let url = format!("{}/accounts:lookup", self.base_url);
        let response = self
            .http
            .post(url)
            .query(&[("key", &self.api_key)])
            .json(&LookupRequest { id_token })
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(ApiError::Status { status, body: text });
        }
        parse_lookup_response(&text)
    }
}

pub(crate) fn parse_lookup_response(text: &str) -> Result<Option<Identity>, ApiError> {
    let resp: LookupResponse = serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(resp.users.into_iter().next().map(|u| Identity {
        uid: u.local_id,
        email: u.email,
        display_name: u.display_name,
    }))
}

/// Resolve `id_token` in the background and publish the identity to `hub`.
///
/// A failed lookup leaves the hub in its "no identity" state.
pub fn spawn_identity_feed(hub: Arc<IdentityHub>, toolkit: IdentityToolkit, id_token: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        match toolkit.lookup(&id_token).await {
            Ok(Some(identity)) => {
                tracing::info!(uid = %identity.uid, "identity provider resolved user");
                hub.publish(Some(identity));
            }
            Ok(None) => tracing::warn!("identity lookup returned no user"),
            Err(e) => tracing::warn!(error = %e, "identity lookup failed"),
        }
    })
}

#[cfg(test)]
#[path = "identity_toolkit_test.rs"]
mod tests;
