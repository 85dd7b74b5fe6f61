//! Student attendance dashboard core.
//!
//! ARCHITECTURE
//! ============
//! - `net`: wire types, collaborator traits, and the Firestore REST client.
//! - `services`: concrete auth and QR collaborators.
//! - `scan`: scan engine interface and the scan-input state machine.
//! - `state`: dashboard state and record normalization.
//! - `pages`: the dashboard orchestrator driving all of the above.

pub mod config;
pub mod net;
pub mod pages;
pub mod scan;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;
