//! Firestore REST reader for the `users` collection.
//!
//! Documents come back in Firestore's typed-value encoding
//! (`{"fields": {"org": {"stringValue": "acme"}}}`). Scalar values are
//! flattened to strings; maps, arrays and nulls are treated as missing.

use std::collections::HashMap;

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use super::types::{ApiError, DocumentStore, ProfileDocument};

pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

pub struct FirestoreStore {
    http: reqwest::Client,
    documents_url: Url,
    api_key: Option<String>,
    id_token: Option<String>,
}

impl FirestoreStore {
    /// Build a reader for the default database of `project_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the base URL is not an absolute
    /// URL or the HTTP client cannot be built.
    pub fn new(base_url: &str, project_id: &str, api_key: Option<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        let mut documents_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::HttpClientBuild(format!("invalid firestore url {base_url}: {e}")))?;
        documents_url
            .path_segments_mut()
            .map_err(|()| ApiError::HttpClientBuild(format!("firestore url cannot take a path: {base_url}")))?
            .pop_if_empty()
            .extend(["projects", project_id, "databases", "(default)", "documents"]);
        Ok(Self { http, documents_url, api_key, id_token: None })
    }

    /// Authenticate reads with the identity provider's ID token.
    #[must_use]
    pub fn with_id_token(mut self, id_token: Option<String>) -> Self {
        self.id_token = id_token;
        self
    }

    /// `uid` becomes a single path segment; reserved characters are escaped.
    fn document_url(&self, uid: &str) -> Url {
        let mut url = self.documents_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push("users").push(uid);
        }
        url
    }
}

#[async_trait::async_trait]
impl DocumentStore for FirestoreStore {
    async fn user_document(&self, uid: &str) -> Result<Option<ProfileDocument>, ApiError> {
        let mut request = self.http.get(self.document_url(uid));
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }
        if let Some(token) = &self.id_token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 404 {
            return Ok(None);
        }
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(ApiError::Status { status, body: text });
        }
        parse_document(&text).map(Some)
    }
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    fields: HashMap<String, Value>,
}

pub(crate) fn parse_document(text: &str) -> Result<ProfileDocument, ApiError> {
    let raw: RawDocument = serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))?;
    let field = |name: &str| raw.fields.get(name).and_then(scalar_value);
    Ok(ProfileDocument {
        name: field("name"),
        org: field("org"),
        role: field("role"),
        stage: field("stage"),
        status: field("status"),
    })
}

/// Flatten one typed Firestore value to a string.
fn scalar_value(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    if let Some(s) = obj.get("stringValue").and_then(Value::as_str) {
        return Some(s.to_string());
    }
    // integerValue is encoded as a JSON string to keep 64-bit precision.
    if let Some(i) = obj.get("integerValue") {
        return match i {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
    }
    if let Some(d) = obj.get("doubleValue").and_then(Value::as_f64) {
        return Some(d.to_string());
    }
    if let Some(b) = obj.get("booleanValue").and_then(Value::as_bool) {
        return Some(b.to_string());
    }
    obj.get("timestampValue")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
#[path = "firestore_test.rs"]
mod tests;
