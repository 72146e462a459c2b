//! Login redirect gate.
//!
//! SYSTEM CONTEXT
//! ==============
//! Redirecting to the external login page is the only terminal action the
//! gate knows: it follows a failed session check (after a short delay) and
//! every sign-out. The login page sends the user back via `redirect_uri`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tokio::task::JoinHandle;

/// Full-page navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

pub struct RedirectGate {
    login_endpoint: Url,
    current_url: String,
    navigator: Arc<dyn Navigator>,
}

impl RedirectGate {
    /// `login_endpoint` is `{authBase}/login`; `current_url` is the page to
    /// return to when no explicit target is given.
    #[must_use]
    pub fn new(login_endpoint: Url, current_url: String, navigator: Arc<dyn Navigator>) -> Self {
        Self { login_endpoint, current_url, navigator }
    }

    /// `{authBase}/login?redirect_uri={return_url or current page}`.
    #[must_use]
    pub fn login_url(&self, return_url: Option<&str>) -> Url {
        let target = return_url.unwrap_or(&self.current_url);
        let mut url = self.login_endpoint.clone();
        url.query_pairs_mut().append_pair("redirect_uri", target);
        url
    }

    /// Navigate to the login page.
    pub fn redirect_to_login(&self, return_url: Option<&str>) {
        let url = self.login_url(return_url);
        tracing::info!(%url, "redirecting to login");
        self.navigator.navigate(url.as_str());
    }

    /// Redirect to the login page once `delay` has elapsed.
    #[must_use]
    pub fn schedule(self: &Arc<Self>, delay: Duration) -> PendingRedirect {
        let gate = Arc::clone(self);
        let deadline = tokio::time::Instant::now() + delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            gate.redirect_to_login(None);
        });
        PendingRedirect { task }
    }
}

/// A redirect waiting on its timer.
///
/// Dropping the handle does not cancel it; call [`PendingRedirect::cancel`].
#[derive(Debug)]
pub struct PendingRedirect {
    task: JoinHandle<()>,
}

impl PendingRedirect {
    /// Stop the redirect if it has not fired yet.
    pub fn cancel(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the redirect has fired (or was cancelled).
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                tracing::error!(error = %e, "redirect task failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "redirect_test.rs"]
mod tests;
