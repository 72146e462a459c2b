//! HTTP client for the auth functions (`/status`, `/signout`).
//!
//! DESIGN
//! ======
//! Both endpoints take an empty JSON body and authenticate with the session
//! cookie alone. No request timeout is configured: a slow status check only
//! delays the loading state, it never turns into a failure on its own.

use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderValue};

use super::types::{ApiError, SessionApi, StatusResponse};

pub struct HttpSessionApi {
    http: reqwest::Client,
    base_url: String,
    cookie: Option<HeaderValue>,
}

impl HttpSessionApi {
    /// Build a client for `base_url` (e.g. `https://functions.example.com/auth`).
    ///
    /// `cookie` is the raw `Cookie` header value to attach to every request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the cookie is not a valid header
    /// value or the HTTP client cannot be constructed.
    pub fn new(base_url: &str, cookie: Option<&str>) -> Result<Self, ApiError> {
        let cookie = cookie
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| ApiError::HttpClientBuild(format!("invalid cookie: {e}")))?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string(), cookie })
    }

    async fn post_empty(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body("{}");
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie.clone());
        }
        request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))
    }
}

#[async_trait::async_trait]
impl SessionApi for HttpSessionApi {
    async fn status(&self) -> Result<StatusResponse, ApiError> {
        let response = self.post_empty("/status").await?;
        let status = response.status();
        if !status.is_success() {
            // The status alone decides the failure; the body is only context.
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        parse_status_response(&text)
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        let response = self.post_empty("/signout").await?;
        tracing::debug!(status = response.status().as_u16(), "sign-out endpoint answered");
        Ok(())
    }
}

pub(crate) fn parse_status_response(text: &str) -> Result<StatusResponse, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "session_api_test.rs"]
mod tests;
