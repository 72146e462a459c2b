//! Application bootstrap: session check, identity observation, sign-out.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` owns the collaborators and the published [`ViewState`]. `mount`
//! runs the session check once; success subscribes to identity changes and
//! feeds each one through the profile loader, failure arms the delayed login
//! redirect. Renderers watch the view channel.
//!
//! TRADE-OFFS
//! ==========
//! There is no retry path. A failed check always ends in the login redirect,
//! and the login page brings the user back once a session exists.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::config::{ConfigError, GateConfig};
use crate::local_state::LocalState;
use crate::net::types::{DocumentStore, SessionApi};
use crate::observer::{IdentityProvider, ObserverHandle};
use crate::profile::{ProfileLoader, UserProfile};
use crate::redirect::{Navigator, PendingRedirect, RedirectGate};
use crate::signout::SignOutAction;
use crate::verifier::{AuthFailure, SessionVerifier};
use crate::view::{DistinctScreens, STATUS_VALID, ViewState};

/// External collaborators, injected at construction.
#[derive(Clone)]
pub struct Services {
    pub session_api: Arc<dyn SessionApi>,
    pub documents: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub navigator: Arc<dyn Navigator>,
    pub storage: LocalState,
}

pub struct App {
    verifier: SessionVerifier,
    loader: Arc<ProfileLoader>,
    identity: Arc<dyn IdentityProvider>,
    gate: Arc<RedirectGate>,
    sign_out: SignOutAction,
    view: Arc<watch::Sender<ViewState>>,
    redirect_delay: Duration,
}

impl App {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the login endpoint cannot be built.
    pub fn new(config: &GateConfig, services: Services) -> Result<Self, ConfigError> {
        let gate = Arc::new(RedirectGate::new(
            config.login_endpoint()?,
            config.current_url.clone(),
            services.navigator,
        ));
        let (view, _) = watch::channel(ViewState::default());
        Ok(Self {
            verifier: SessionVerifier::new(Arc::clone(&services.session_api)),
            loader: Arc::new(ProfileLoader::new(services.documents)),
            identity: services.identity,
            sign_out: SignOutAction::new(services.session_api, services.storage, Arc::clone(&gate)),
            gate,
            view: Arc::new(view),
            redirect_delay: config.redirect_delay,
        })
    }

    /// Subscribe to view-state changes.
    #[must_use]
    pub fn view(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        self.view.borrow().clone()
    }

    #[must_use]
    pub fn gate(&self) -> &Arc<RedirectGate> {
        &self.gate
    }

    /// Run the session check and arm whatever follows from it.
    pub async fn mount(&self) -> Mounted {
        match self.verifier.check_auth().await {
            Ok(_) => {
                self.view.send_modify(|v| {
                    v.loading = false;
                    v.authenticated = true;
                    v.session_status = STATUS_VALID.to_string();
                });
                Mounted { observer: Some(self.observe_identity()), redirect: None }
            }
            Err(failure) => Mounted { observer: None, redirect: Some(self.fail(&failure)) },
        }
    }

    /// Mount, hand each distinct screen to `on_screen`, and wait for the
    /// outcome: the login redirect, or a loaded profile within `settle`.
    ///
    /// The identity subscription is released before returning.
    pub async fn run(&self, settle: Duration, mut on_screen: impl FnMut(&str)) -> RunOutcome {
        let mut rx = self.view();
        let mut screens = DistinctScreens::default();
        let mut show = |state: &ViewState| {
            if let Some(text) = screens.next(state) {
                on_screen(&text);
            }
        };

        show(&rx.borrow_and_update().clone());
        let mut mounted = self.mount().await;
        show(&rx.borrow_and_update().clone());

        if let Some(pending) = mounted.take_redirect() {
            pending.wait().await;
            return RunOutcome::Redirected;
        }

        let settled = tokio::time::timeout(settle, async {
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                show(&state);
                if state.user_data.as_ref().is_some_and(|p| !p.is_placeholder()) {
                    return true;
                }
            }
            false
        })
        .await;
        mounted.teardown();

        match settled {
            Ok(true) => RunOutcome::ProfileShown,
            Ok(false) | Err(_) => {
                tracing::warn!(?settle, "identity provider did not report a user in time");
                RunOutcome::TimedOut
            }
        }
    }

    /// Sign out and redirect to login.
    pub async fn sign_out(&self) {
        self.sign_out.sign_out().await;
    }

    fn fail(&self, failure: &AuthFailure) -> PendingRedirect {
        let status = failure.status_message();
        tracing::info!(%status, delay = ?self.redirect_delay, "scheduling login redirect");
        self.view.send_modify(|v| {
            v.loading = false;
            v.authenticated = false;
            v.session_status = status;
        });
        self.gate.schedule(self.redirect_delay)
    }

    fn observe_identity(&self) -> ObserverHandle {
        let mut subscription = self.identity.subscribe();
        let loader = Arc::clone(&self.loader);
        let view = Arc::clone(&self.view);
        ObserverHandle::spawn(move |gate| async move {
            while let Some(state) = subscription.next().await {
                // A confirmed cookie with no provider user yet is the provider
                // still initializing, not a failed login.
                let profile = match state {
                    Some(identity) => loader.load_profile(&identity).await,
                    None => {
                        tracing::debug!("identity provider has no user yet");
                        UserProfile::loading_placeholder()
                    }
                };
                if !gate.publish(|| view.send_modify(|v| v.user_data = Some(profile))) {
                    break;
                }
            }
        })
    }
}

/// How [`App::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The session check failed and the login redirect fired.
    Redirected,
    /// A profile from the identity provider was shown.
    ProfileShown,
    /// The session was valid but no user arrived in time.
    TimedOut,
}

/// What `mount` left running. Dropping it stops identity observation.
pub struct Mounted {
    observer: Option<ObserverHandle>,
    redirect: Option<PendingRedirect>,
}

impl Mounted {
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.observer.as_ref().is_some_and(ObserverHandle::is_active)
    }

    #[must_use]
    pub fn pending_redirect(&self) -> Option<&PendingRedirect> {
        self.redirect.as_ref()
    }

    pub fn take_redirect(&mut self) -> Option<PendingRedirect> {
        self.redirect.take()
    }

    /// Cancel a redirect that has not fired yet. Returns whether one was pending.
    pub fn cancel_redirect(&mut self) -> bool {
        match self.redirect.take() {
            Some(pending) if !pending.is_finished() => {
                pending.cancel();
                true
            }
            _ => false,
        }
    }

    /// Release the identity subscription. Once this returns the view no longer
    /// changes for identity events. A pending redirect still fires.
    pub fn teardown(self) {
        if let Some(observer) = self.observer {
            observer.unsubscribe();
        }
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
