//! Profile view model and loader.
//!
//! ERROR HANDLING
//! ==============
//! A failed document read is logged and treated as "no document". The view
//! only ever degrades to sentinel values; it never shows a fetch error.

use std::sync::Arc;

use serde::Serialize;

use crate::net::types::{DocumentStore, Identity, ProfileDocument};

/// Shown for a field no source can supply.
pub const NOT_AVAILABLE: &str = "N/A";
/// Shown while the identity provider has not reported a user yet.
pub const LOADING: &str = "Loading...";

/// Fully resolved profile as rendered by the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub org: String,
    pub role: String,
    pub stage: String,
    pub status: String,
}

impl UserProfile {
    /// Every field reads [`LOADING`].
    #[must_use]
    pub fn loading_placeholder() -> Self {
        Self {
            uid: LOADING.to_string(),
            email: LOADING.to_string(),
            name: LOADING.to_string(),
            org: LOADING.to_string(),
            role: LOADING.to_string(),
            stage: LOADING.to_string(),
            status: LOADING.to_string(),
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.uid == LOADING
    }
}

/// First non-empty value wins, otherwise [`NOT_AVAILABLE`].
fn resolve(candidates: &[Option<&str>]) -> String {
    candidates
        .iter()
        .flatten()
        .find(|v| !v.is_empty())
        .map_or_else(|| NOT_AVAILABLE.to_string(), |v| (*v).to_string())
}

/// Merge a profile document with the provider's identity fields.
#[must_use]
pub fn merge_profile(identity: &Identity, doc: Option<&ProfileDocument>) -> UserProfile {
    let doc = doc.cloned().unwrap_or_default();
    UserProfile {
        uid: identity.uid.clone(),
        email: resolve(&[identity.email.as_deref()]),
        name: resolve(&[doc.name.as_deref(), identity.display_name.as_deref()]),
        org: resolve(&[doc.org.as_deref()]),
        role: resolve(&[doc.role.as_deref()]),
        stage: resolve(&[doc.stage.as_deref()]),
        status: resolve(&[doc.status.as_deref()]),
    }
}

/// Builds [`UserProfile`]s from the document store on demand.
pub struct ProfileLoader {
    store: Arc<dyn DocumentStore>,
}

impl ProfileLoader {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch `users/{uid}` and merge it with `identity`. Never fails.
    pub async fn load_profile(&self, identity: &Identity) -> UserProfile {
        let doc = match self.store.user_document(&identity.uid).await {
            Ok(doc) => {
                if doc.is_none() {
                    tracing::debug!(uid = %identity.uid, "no profile document");
                }
                doc
            }
            Err(e) => {
                tracing::warn!(uid = %identity.uid, error = %e, "profile fetch failed; using identity fields only");
                None
            }
        };
        merge_profile(identity, doc.as_ref())
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
