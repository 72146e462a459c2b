//! Identity-change notifications.
//!
//! DESIGN
//! ======
//! The provider's auth-state callback is modelled as a stream: each
//! [`IdentitySubscription`] yields the current state first and then every
//! later change. Rapid changes may coalesce to the latest value, which is all
//! the profile view needs. Dropping the subscription is the unsubscribe.
//!
//! Aborting a task does not stop a poll already running on another worker,
//! so observer tasks publish through an [`ObserverGate`]. Releasing the
//! [`ObserverHandle`] closes the gate and waits out any publish in progress;
//! nothing lands after the release returns.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::net::types::Identity;

/// Source of identity-change notifications.
pub trait IdentityProvider: Send + Sync {
    fn subscribe(&self) -> IdentitySubscription;
}

/// Receiving end of an identity subscription.
pub struct IdentitySubscription {
    rx: watch::Receiver<Option<Identity>>,
    delivered_initial: bool,
}

impl IdentitySubscription {
    #[must_use]
    pub fn new(rx: watch::Receiver<Option<Identity>>) -> Self {
        Self { rx, delivered_initial: false }
    }

    /// Wait for the next identity state.
    ///
    /// Returns `None` once the provider side has gone away.
    pub async fn next(&mut self) -> Option<Option<Identity>> {
        if !self.delivered_initial {
            self.delivered_initial = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Release the subscription explicitly.
    pub fn unsubscribe(self) {}
}

/// In-process identity provider backed by a watch channel.
pub struct IdentityHub {
    tx: watch::Sender<Option<Identity>>,
}

impl IdentityHub {
    /// A hub with no identity yet.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Replace the current identity and notify subscribers.
    pub fn publish(&self, identity: Option<Identity>) {
        self.tx.send_replace(identity);
    }

    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for IdentityHub {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for IdentityHub {
    fn subscribe(&self) -> IdentitySubscription {
        IdentitySubscription::new(self.tx.subscribe())
    }
}

/// Switch shared by an observer task and its handle.
#[derive(Clone)]
pub struct ObserverGate {
    open: Arc<Mutex<bool>>,
}

impl ObserverGate {
    fn new() -> Self {
        Self { open: Arc::new(Mutex::new(true)) }
    }

    /// Run `publish` unless the observer has been released.
    ///
    /// Returns `false` once released; the task should stop then.
    pub fn publish(&self, publish: impl FnOnce()) -> bool {
        let open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if *open {
            publish();
        }
        *open
    }

    fn close(&self) {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }
}

/// Background task draining a subscription; released when dropped.
pub struct ObserverHandle {
    task: JoinHandle<()>,
    gate: ObserverGate,
}

impl ObserverHandle {
    /// Spawn the task built by `observe`, handing it the gate to publish through.
    pub fn spawn<F, Fut>(observe: F) -> Self
    where
        F: FnOnce(ObserverGate) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let gate = ObserverGate::new();
        let task = tokio::spawn(observe(gate.clone()));
        Self { task, gate }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop observing. The subscription is released with the task.
    pub fn unsubscribe(self) {}
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.gate.close();
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "observer_test.rs"]
mod tests;
