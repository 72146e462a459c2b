//! Sign-out action.
//!
//! The server call, the local wipe and the redirect are independent: a failed
//! sign-out request is logged and the other two steps still run.

use std::sync::Arc;

use crate::local_state::LocalState;
use crate::net::types::SessionApi;
use crate::redirect::RedirectGate;

pub struct SignOutAction {
    api: Arc<dyn SessionApi>,
    storage: LocalState,
    gate: Arc<RedirectGate>,
}

impl SignOutAction {
    #[must_use]
    pub fn new(api: Arc<dyn SessionApi>, storage: LocalState, gate: Arc<RedirectGate>) -> Self {
        Self { api, storage, gate }
    }

    /// End the session and hand control to the login page.
    pub async fn sign_out(&self) {
        match self.api.sign_out().await {
            Ok(()) => tracing::info!("signed out"),
            Err(e) => tracing::warn!(error = %e, "sign out failed; redirecting anyway"),
        }
        if let Err(e) = self.storage.clear_all() {
            tracing::warn!(error = %e, "failed to clear local state");
        }
        self.gate.redirect_to_login(None);
    }
}

#[cfg(test)]
#[path = "signout_test.rs"]
mod tests;
