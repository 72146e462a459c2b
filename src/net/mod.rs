//! Networking modules for the external collaborators.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session_api` talks to the auth functions, `firestore` reads profile
//! documents, `identity_toolkit` resolves the provider identity, and `types`
//! defines the shared wire schema and collaborator traits.

pub mod firestore;
pub mod identity_toolkit;
pub mod session_api;
pub mod types;
