//! QR scanning: the external engine interface and the scan-input state machine.

pub mod engine;
pub mod headless;
pub mod input;
