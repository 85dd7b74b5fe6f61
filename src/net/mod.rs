//! Networking and collaborator modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! `types` defines the shared data model, `api` the collaborator traits, and
//! `firestore` the REST-backed document store.

pub mod api;
pub mod firestore;
pub mod types;
