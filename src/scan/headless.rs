//! Engine factory for hosts without a camera.
//!
//! Every construction attempt fails, so a mounted scanner lands in its error
//! state with the manual entry form available.

#[cfg(test)]
#[path = "headless_test.rs"]
mod headless_test;

use crate::scan::engine::{ScanConfig, ScanEngine, ScanEngineFactory, ScanError};

pub const NO_CAMERA_REASON: &str = "no camera device available";

#[derive(Clone, Copy, Debug, Default)]
pub struct NoCamera;

impl ScanEngineFactory for NoCamera {
    fn create(&self, config: &ScanConfig) -> Result<Box<dyn ScanEngine>, ScanError> {
        tracing::debug!(fps = config.fps, "camera requested on headless host");
        Err(ScanError::Construction(NO_CAMERA_REASON.to_owned()))
    }
}
