//! Local state models.
//!
//! ARCHITECTURE
//! ============
//! State structs are plain data plus pure view helpers. Pages own the async
//! orchestration that mutates them.

pub mod dashboard;
pub mod records;
