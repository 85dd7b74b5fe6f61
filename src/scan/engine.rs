//! Scan-engine capability interface and its configuration.
//!
//! DESIGN
//! ======
//! The camera/decoder is an external engine we cannot control beyond
//! construct/start/stop. It reports through two callback slots: a success
//! slot fired with the decoded payload and an error slot that may fire
//! repeatedly with transient decode noise.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

pub const DEFAULT_FPS: u32 = 20;
pub const DEFAULT_BOX_SIZE: u32 = 200;
pub const DEFAULT_ASPECT_RATIO: f64 = 1.0;

/// Decode-error substrings that mean the camera itself is unusable.
pub const CAMERA_UNAVAILABLE_PATTERNS: [&str; 2] = ["NotReadableError", "Failed to allocate videosource"];

/// Errors produced by the engine or the completion handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// The engine could not be constructed (no camera, permission denied, ...).
    #[error("{0}")]
    Construction(String),

    /// The engine was constructed but refused to start scanning.
    #[error("start failed: {0}")]
    Start(String),

    /// Releasing the engine failed.
    #[error("stop failed: {0}")]
    Stop(String),

    /// The completion handler rejected the identifier.
    #[error("{0}")]
    Handler(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarcodeFormat {
    QrCode,
    Aztec,
    DataMatrix,
    Code128,
    Ean13,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FocusMode {
    #[default]
    Continuous,
    Single,
    Manual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanType {
    Camera,
    File,
}

/// Target box the decoder looks in, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanBox {
    pub width: u32,
    pub height: u32,
}

/// Construction-time configuration handed to the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanConfig {
    pub fps: u32,
    pub qrbox: ScanBox,
    pub aspect_ratio: f64,
    pub allow_flip: bool,
    pub formats: Vec<BarcodeFormat>,
    pub remember_last_camera: bool,
    pub show_torch_button: bool,
    pub focus_mode: FocusMode,
    pub scan_types: Vec<ScanType>,
    /// Hint to prefer the platform's native barcode detector when available.
    pub use_native_detector: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            qrbox: ScanBox { width: DEFAULT_BOX_SIZE, height: DEFAULT_BOX_SIZE },
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            allow_flip: true,
            formats: vec![BarcodeFormat::QrCode],
            remember_last_camera: true,
            show_torch_button: true,
            focus_mode: FocusMode::Continuous,
            scan_types: vec![ScanType::Camera],
            use_native_detector: true,
        }
    }
}

type Slot = Box<dyn FnMut(String) + Send>;

/// The two callback slots an engine reports through.
pub struct ScanCallbacks {
    on_success: Slot,
    on_error: Slot,
}

impl ScanCallbacks {
    pub fn new<S, E>(on_success: S, on_error: E) -> Self
    where
        S: FnMut(String) + Send + 'static,
        E: FnMut(String) + Send + 'static,
    {
        Self { on_success: Box::new(on_success), on_error: Box::new(on_error) }
    }

    /// Report a decoded payload.
    pub fn success(&mut self, payload: String) {
        (self.on_success)(payload);
    }

    /// Report a decode or device error.
    pub fn error(&mut self, message: String) {
        (self.on_error)(message);
    }
}

impl std::fmt::Debug for ScanCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanCallbacks").finish_non_exhaustive()
    }
}

/// A live camera/decoder instance.
#[async_trait::async_trait]
pub trait ScanEngine: Send {
    /// Begin decoding; results arrive through `callbacks`.
    async fn start(&mut self, callbacks: ScanCallbacks) -> Result<(), ScanError>;

    /// Release the camera.
    async fn stop(&mut self) -> Result<(), ScanError>;
}

/// Constructs engine instances.
pub trait ScanEngineFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns `ScanError::Construction` when no engine can be built.
    fn create(&self, config: &ScanConfig) -> Result<Box<dyn ScanEngine>, ScanError>;
}

/// Completion handler receiving one identifier per successful scan or entry.
#[async_trait::async_trait]
pub trait ScanHandler: Send + Sync {
    async fn on_scan(&self, identifier: String) -> Result<(), ScanError>;
}

/// Whether a decode error means the camera is unusable rather than a missed frame.
#[must_use]
pub fn is_camera_unavailable(message: &str) -> bool {
    CAMERA_UNAVAILABLE_PATTERNS.iter().any(|p| message.contains(p))
}
