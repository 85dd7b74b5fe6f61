//! Concrete collaborators used outside of tests.
//!
//! ARCHITECTURE
//! ============
//! Service modules implement the `net::api` traits against real backends so
//! pages can stay focused on state transitions.

pub mod auth;
pub mod qr;
