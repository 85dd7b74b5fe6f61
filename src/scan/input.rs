//! Scan input: camera scanning with a manual-entry fallback.
//!
//! DESIGN
//! ======
//! `ScanInput` owns at most one live engine. Engine callbacks only enqueue
//! events tagged with the engine instance id; `pump`/`next_event` apply them
//! through the named transitions below, so every state change happens on
//! the owner's task. Events from an engine that has since been released are
//! dropped by id.
//!
//! States: `Initializing -> Scanning -> (Error | ManualEntry)`, with a
//! decode success resetting to `Initializing` after the handler runs.
//!
//! ERROR HANDLING
//! ==============
//! Construction failures and camera-unavailable decode errors become the
//! `Error` state; both are recoverable via `retry` or `enter_manual`. Other
//! decode errors are noise and only logged. Release failures are logged and
//! never surfaced.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::engine::{ScanCallbacks, ScanConfig, ScanEngine, ScanEngineFactory, ScanHandler, is_camera_unavailable};

/// How long the manual-entry success indicator stays visible.
pub const SUCCESS_DISPLAY: Duration = Duration::from_secs(3);

pub const CAMERA_ACCESS_MESSAGE: &str =
    "Camera access error: The camera may be in use by another application or there might be a hardware issue.";
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter an ID number";

/// Which affordance the scan input is presenting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ScannerState {
    #[default]
    Initializing,
    Scanning,
    Error(String),
    ManualEntry,
}

/// Snapshot of everything the scan UI renders.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanView {
    pub state: ScannerState,
    pub manual_code: String,
    pub is_submitting: bool,
    pub submit_success: bool,
    /// Validation or submission error shown above the manual form.
    pub inline_error: Option<String>,
}

impl ScanView {
    #[must_use]
    pub fn show_spinner(&self) -> bool {
        self.state == ScannerState::Initializing
    }

    #[must_use]
    pub fn show_scan_hint(&self) -> bool {
        self.state == ScannerState::Scanning
    }

    /// The "enter ID manually" link is offered while the camera path is active.
    #[must_use]
    pub fn show_manual_link(&self) -> bool {
        matches!(self.state, ScannerState::Initializing | ScannerState::Scanning)
    }

    #[must_use]
    pub fn manual_form_visible(&self) -> bool {
        matches!(self.state, ScannerState::Error(_) | ScannerState::ManualEntry)
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            ScannerState::Error(message) => Some(message),
            _ => self.inline_error.as_deref(),
        }
    }

    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.is_submitting { "Submitting..." } else { "Submit" }
    }
}

#[derive(Debug)]
enum EngineEvent {
    Decoded(String),
    DecodeError(String),
}

struct LiveEngine {
    id: Uuid,
    engine: Box<dyn ScanEngine>,
}

pub struct ScanInput {
    factory: Arc<dyn ScanEngineFactory>,
    handler: Arc<dyn ScanHandler>,
    config: ScanConfig,
    engine: Option<LiveEngine>,
    events_tx: mpsc::UnboundedSender<(Uuid, EngineEvent)>,
    events_rx: mpsc::UnboundedReceiver<(Uuid, EngineEvent)>,
    view: Arc<Mutex<ScanView>>,
    success_timer: Option<JoinHandle<()>>,
}

impl ScanInput {
    #[must_use]
    pub fn new(factory: Arc<dyn ScanEngineFactory>, handler: Arc<dyn ScanHandler>, config: ScanConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            factory,
            handler,
            config,
            engine: None,
            events_tx,
            events_rx,
            view: Arc::new(Mutex::new(ScanView::default())),
            success_timer: None,
        }
    }

    #[must_use]
    pub fn view(&self) -> ScanView {
        lock(&self.view).clone()
    }

    #[must_use]
    pub fn state(&self) -> ScannerState {
        lock(&self.view).state.clone()
    }

    /// Id of the live engine instance, if any.
    #[must_use]
    pub fn engine_id(&self) -> Option<Uuid> {
        self.engine.as_ref().map(|live| live.id)
    }

    // =========================================================================
    // CAMERA PATH
    // =========================================================================

    /// Construct and start a fresh engine, releasing any previous one first.
    pub async fn initialize(&mut self) -> ScannerState {
        self.release_engine().await;
        self.set_state(ScannerState::Initializing);

        let mut engine = match self.factory.create(&self.config) {
            Ok(engine) => engine,
            Err(e) => {
                tracing::error!(error = %e, "scanner initialization failed");
                return self.fail_initialization(&e.to_string());
            }
        };

        let id = Uuid::new_v4();
        if let Err(e) = engine.start(self.callbacks_for(id)).await {
            tracing::error!(engine_id = %id, error = %e, "scanner start failed");
            if let Err(stop_err) = engine.stop().await {
                tracing::error!(engine_id = %id, error = %stop_err, "failed to clear scanner");
            }
            return self.fail_initialization(&e.to_string());
        }

        tracing::debug!(engine_id = %id, "scanner started");
        self.engine = Some(LiveEngine { id, engine });
        self.set_state(ScannerState::Scanning);
        ScannerState::Scanning
    }

    /// Decode success: release the engine, hand the payload to the handler
    /// once, and reset. Returns `false` when not scanning.
    pub async fn on_decode_success(&mut self, payload: String) -> bool {
        if self.state() != ScannerState::Scanning {
            tracing::debug!("decode result ignored outside scanning");
            return false;
        }
        tracing::info!(%payload, "QR code scanned");
        self.release_engine().await;

        if let Err(e) = self.handler.on_scan(payload).await {
            tracing::error!(error = %e, "scan handler failed");
            lock(&self.view).inline_error = Some(record_failed_message(&e.to_string()));
        }
        self.set_state(ScannerState::Initializing);
        true
    }

    /// Decode error: camera-unavailable errors surface, anything else is noise.
    pub fn on_decode_error(&mut self, message: &str) {
        if self.state() != ScannerState::Scanning {
            return;
        }
        if is_camera_unavailable(message) {
            tracing::warn!(%message, "camera unavailable");
            self.set_state(ScannerState::Error(CAMERA_ACCESS_MESSAGE.to_owned()));
        } else {
            tracing::debug!(%message, "QR code scan error");
        }
    }

    /// Full reload of the scanning session.
    pub async fn retry(&mut self) -> ScannerState {
        lock(&self.view).inline_error = None;
        self.initialize().await
    }

    /// Apply every queued engine event. Returns the last payload delivered to
    /// the handler, if any.
    pub async fn pump(&mut self) -> Option<String> {
        let mut delivered = None;
        while let Ok((id, event)) = self.events_rx.try_recv() {
            if let Some(payload) = self.apply(id, event).await {
                delivered = Some(payload);
            }
        }
        delivered
    }

    /// Wait for the next engine event and apply it. Pending forever when no
    /// engine is live, so callers should race it against their own events.
    pub async fn next_event(&mut self) -> Option<String> {
        let (id, event) = self.events_rx.recv().await?;
        self.apply(id, event).await
    }

    async fn apply(&mut self, id: Uuid, event: EngineEvent) -> Option<String> {
        if self.engine_id() != Some(id) {
            tracing::debug!(engine_id = %id, ?event, "event from released engine dropped");
            return None;
        }
        match event {
            EngineEvent::Decoded(payload) => {
                let delivered = payload.clone();
                self.on_decode_success(payload).await.then_some(delivered)
            }
            EngineEvent::DecodeError(message) => {
                self.on_decode_error(&message);
                None
            }
        }
    }

    // =========================================================================
    // MANUAL PATH
    // =========================================================================

    /// Switch to manual entry. The camera is released while the form is active.
    pub async fn enter_manual(&mut self) {
        self.release_engine().await;
        self.set_state(ScannerState::ManualEntry);
    }

    pub fn set_manual_code(&mut self, code: &str) {
        lock(&self.view).manual_code = code.to_owned();
    }

    /// Dismiss the visible error. A live camera resumes scanning; otherwise
    /// the manual form stays up.
    pub fn dismiss_error(&mut self) {
        let live = self.engine.is_some();
        let mut view = lock(&self.view);
        view.inline_error = None;
        if matches!(view.state, ScannerState::Error(_)) {
            view.state = if live { ScannerState::Scanning } else { ScannerState::ManualEntry };
        }
    }

    /// Submit the manual code. Returns `true` when the handler accepted it.
    pub async fn submit_manual(&mut self) -> bool {
        {
            let view = lock(&self.view);
            if !view.manual_form_visible() || view.is_submitting {
                return false;
            }
        }

        // Submitting from the error fallback commits to manual entry, so the
        // form's own messages replace the scanner error.
        if matches!(self.state(), ScannerState::Error(_)) {
            self.enter_manual().await;
        }

        let code = {
            let mut view = lock(&self.view);
            let code = view.manual_code.trim().to_owned();
            if code.is_empty() {
                view.inline_error = Some(EMPTY_INPUT_MESSAGE.to_owned());
                return false;
            }
            code
        };

        {
            let mut view = lock(&self.view);
            view.is_submitting = true;
            view.inline_error = None;
        }

        tracing::info!(%code, "manual code submitted");
        let result = self.handler.on_scan(code).await;

        let accepted = {
            let mut view = lock(&self.view);
            view.is_submitting = false;
            match result {
                Ok(()) => {
                    view.submit_success = true;
                    view.manual_code.clear();
                    true
                }
                Err(e) => {
                    tracing::error!(error = %e, "manual submission failed");
                    view.inline_error = Some(record_failed_message(&e.to_string()));
                    false
                }
            }
        };
        if accepted {
            self.schedule_success_clear();
        }
        accepted
    }

    // =========================================================================
    // TEARDOWN
    // =========================================================================

    /// Release the engine and stop the success timer. Safe to call repeatedly.
    pub async fn teardown(&mut self) {
        if let Some(timer) = self.success_timer.take() {
            timer.abort();
        }
        self.release_engine().await;
    }

    async fn release_engine(&mut self) {
        let Some(mut live) = self.engine.take() else {
            return;
        };
        if let Err(e) = live.engine.stop().await {
            tracing::error!(engine_id = %live.id, error = %e, "failed to clear scanner");
        }
    }

    fn schedule_success_clear(&mut self) {
        if let Some(previous) = self.success_timer.take() {
            previous.abort();
        }
        let view = Arc::clone(&self.view);
        self.success_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(SUCCESS_DISPLAY).await;
            lock(&view).submit_success = false;
        }));
    }

    fn callbacks_for(&self, id: Uuid) -> ScanCallbacks {
        let success_tx = self.events_tx.clone();
        let error_tx = self.events_tx.clone();
        ScanCallbacks::new(
            move |payload| {
                let _ = success_tx.send((id, EngineEvent::Decoded(payload)));
            },
            move |message| {
                let _ = error_tx.send((id, EngineEvent::DecodeError(message)));
            },
        )
    }

    fn fail_initialization(&mut self, reason: &str) -> ScannerState {
        let state = ScannerState::Error(format!("Failed to initialize scanner: {reason}"));
        self.set_state(state.clone());
        state
    }

    fn set_state(&self, state: ScannerState) {
        lock(&self.view).state = state;
    }
}

impl Drop for ScanInput {
    fn drop(&mut self) {
        if let Some(timer) = self.success_timer.take() {
            timer.abort();
        }
        let Some(mut live) = self.engine.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = live.engine.stop().await {
                        tracing::error!(engine_id = %live.id, error = %e, "failed to clear scanner");
                    }
                });
            }
            Err(_) => tracing::error!(engine_id = %live.id, "scanner dropped outside a runtime; camera not released"),
        }
    }
}

fn record_failed_message(reason: &str) -> String {
    let reason = if reason.is_empty() { "Unknown error" } else { reason };
    format!("Failed to record attendance: {reason}")
}

fn lock(view: &Mutex<ScanView>) -> MutexGuard<'_, ScanView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}
