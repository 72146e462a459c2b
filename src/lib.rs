//! # session-gate
//!
//! Test harness for a cross-subdomain session cookie. It checks the cookie
//! with the auth functions, shows the user's profile from the document store
//! once the identity provider reports a user, and signs out by wiping local
//! state and handing control back to the login page.
//!
//! Every external collaborator sits behind a trait and is injected through
//! [`app::Services`]; the `net` module provides the HTTP implementations.

pub mod app;
pub mod config;
pub mod local_state;
pub mod net;
pub mod observer;
pub mod profile;
pub mod redirect;
pub mod signout;
pub mod verifier;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
