//! Hand-written collaborator mocks shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::net::api::{ApiError, AuthProvider, DocumentStore, QrGenerator};
use crate::net::types::{FieldValue, QrImage, RawDocument, Role, SessionUser, UserProfile};
use crate::scan::engine::{ScanCallbacks, ScanConfig, ScanEngine, ScanEngineFactory, ScanError, ScanHandler};

// =========================================================================
// Scan engine
// =========================================================================

#[derive(Default)]
struct EngineProbe {
    created: AtomicUsize,
    starts: AtomicUsize,
    stops: AtomicUsize,
    live: AtomicUsize,
    max_live: AtomicUsize,
    fail_create: Mutex<Option<String>>,
    fail_start: Mutex<Option<String>>,
    fail_stop: Mutex<Option<String>>,
    callbacks: Mutex<Vec<ScanCallbacks>>,
}

/// Factory producing scripted engines whose callbacks tests fire by hand.
#[derive(Clone, Default)]
pub struct MockScanFactory {
    probe: Arc<EngineProbe>,
}

impl MockScanFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create(&self, reason: &str) {
        *self.probe.fail_create.lock().unwrap() = Some(reason.to_owned());
    }

    pub fn fail_start(&self, reason: &str) {
        *self.probe.fail_start.lock().unwrap() = Some(reason.to_owned());
    }

    pub fn fail_stop(&self, reason: &str) {
        *self.probe.fail_stop.lock().unwrap() = Some(reason.to_owned());
    }

    pub fn allow_create(&self) {
        *self.probe.fail_create.lock().unwrap() = None;
    }

    pub fn created(&self) -> usize {
        self.probe.created.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.probe.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.probe.stops.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.probe.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.probe.max_live.load(Ordering::SeqCst)
    }

    /// Fire the success slot of the most recently started engine.
    pub fn emit_success(&self, payload: &str) {
        if let Some(cb) = self.probe.callbacks.lock().unwrap().last_mut() {
            cb.success(payload.to_owned());
        }
    }

    /// Fire the error slot of the most recently started engine.
    pub fn emit_error(&self, message: &str) {
        if let Some(cb) = self.probe.callbacks.lock().unwrap().last_mut() {
            cb.error(message.to_owned());
        }
    }

    /// Fire the success slot of the `index`-th started engine.
    pub fn emit_success_from(&self, index: usize, payload: &str) {
        if let Some(cb) = self.probe.callbacks.lock().unwrap().get_mut(index) {
            cb.success(payload.to_owned());
        }
    }
}

impl ScanEngineFactory for MockScanFactory {
    fn create(&self, _config: &ScanConfig) -> Result<Box<dyn ScanEngine>, ScanError> {
        if let Some(reason) = self.probe.fail_create.lock().unwrap().clone() {
            return Err(ScanError::Construction(reason));
        }
        self.probe.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockEngine { probe: Arc::clone(&self.probe), running: false }))
    }
}

struct MockEngine {
    probe: Arc<EngineProbe>,
    running: bool,
}

#[async_trait::async_trait]
impl ScanEngine for MockEngine {
    async fn start(&mut self, callbacks: ScanCallbacks) -> Result<(), ScanError> {
        if let Some(reason) = self.probe.fail_start.lock().unwrap().clone() {
            return Err(ScanError::Start(reason));
        }
        self.probe.starts.fetch_add(1, Ordering::SeqCst);
        let live = self.probe.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.max_live.fetch_max(live, Ordering::SeqCst);
        self.probe.callbacks.lock().unwrap().push(callbacks);
        self.running = true;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), ScanError> {
        self.probe.stops.fetch_add(1, Ordering::SeqCst);
        if self.running {
            self.running = false;
            self.probe.live.fetch_sub(1, Ordering::SeqCst);
        }
        match self.probe.fail_stop.lock().unwrap().clone() {
            Some(reason) => Err(ScanError::Stop(reason)),
            None => Ok(()),
        }
    }
}

// =========================================================================
// Scan handler
// =========================================================================

/// Completion handler that records every identifier it receives.
#[derive(Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<String>>,
    fail: Mutex<Option<String>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_with(&self, reason: &str) {
        *self.fail.lock().unwrap() = Some(reason.to_owned());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ScanHandler for RecordingHandler {
    async fn on_scan(&self, identifier: String) -> Result<(), ScanError> {
        self.calls.lock().unwrap().push(identifier);
        match self.fail.lock().unwrap().clone() {
            Some(reason) => Err(ScanError::Handler(reason)),
            None => Ok(()),
        }
    }
}

// =========================================================================
// Auth / store / QR
// =========================================================================

pub struct MockAuth {
    pub session: Mutex<Option<SessionUser>>,
    pub profile: Mutex<Result<UserProfile, String>>,
    pub logout_error: Mutex<Option<String>>,
    pub logouts: AtomicUsize,
}

impl MockAuth {
    pub fn signed_in(profile: UserProfile) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(Some(SessionUser { uid: "uid-1".into(), id_token: "tok".into() })),
            profile: Mutex::new(Ok(profile)),
            logout_error: Mutex::new(None),
            logouts: AtomicUsize::new(0),
        })
    }

    pub fn signed_out() -> Arc<Self> {
        let auth = Self::signed_in(UserProfile::default());
        *auth.session.lock().unwrap() = None;
        auth
    }
}

#[async_trait::async_trait]
impl AuthProvider for MockAuth {
    async fn current_user(&self) -> Option<SessionUser> {
        self.session.lock().unwrap().clone()
    }

    async fn get_user_data(&self) -> Result<UserProfile, ApiError> {
        self.profile.lock().unwrap().clone().map_err(ApiError::Request)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.logout_error.lock().unwrap().clone() {
            return Err(ApiError::Request(reason));
        }
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

/// Store returning a scripted result and recording every query.
pub struct MockStore {
    pub result: Mutex<Result<Vec<RawDocument>, String>>,
    pub queries: Mutex<Vec<(String, String, String)>>,
}

impl MockStore {
    pub fn with_docs(docs: Vec<RawDocument>) -> Arc<Self> {
        Arc::new(Self { result: Mutex::new(Ok(docs)), queries: Mutex::new(Vec::new()) })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self { result: Mutex::new(Err(reason.to_owned())), queries: Mutex::new(Vec::new()) })
    }

    pub fn set_docs(&self, docs: Vec<RawDocument>) {
        *self.result.lock().unwrap() = Ok(docs);
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MockStore {
    async fn query(&self, collection: &str, field: &str, value: &str) -> Result<Vec<RawDocument>, ApiError> {
        self.queries
            .lock()
            .unwrap()
            .push((collection.to_owned(), field.to_owned(), value.to_owned()));
        self.result.lock().unwrap().clone().map_err(ApiError::Request)
    }
}

pub struct MockQr {
    pub fail: bool,
}

#[async_trait::async_trait]
impl QrGenerator for MockQr {
    async fn generate(&self, payload: &str) -> Result<QrImage, ApiError> {
        if self.fail {
            return Err(ApiError::Qr("renderer offline".into()));
        }
        Ok(QrImage(format!("qr://{payload}")))
    }
}

// =========================================================================
// Fixtures
// =========================================================================

pub fn student_profile() -> UserProfile {
    UserProfile { id_number: "S123".into(), email: "a@b.com".into(), role: Role::Student }
}

pub fn admin_profile() -> UserProfile {
    UserProfile { id_number: "A001".into(), email: "admin@b.com".into(), role: Role::Admin }
}

pub fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

pub fn doc_with_timestamp(id: &str, ts: DateTime<Utc>, status: Option<&str>) -> RawDocument {
    let doc = RawDocument::new(id).with_field("timestamp", FieldValue::Timestamp(ts));
    match status {
        Some(s) => doc.with_field("status", FieldValue::String(s.into())),
        None => doc,
    }
}

pub fn doc_with_legacy_date(id: &str, ts: DateTime<Utc>, status: Option<&str>) -> RawDocument {
    let doc = RawDocument::new(id).with_field("date", FieldValue::Timestamp(ts));
    match status {
        Some(s) => doc.with_field("status", FieldValue::String(s.into())),
        None => doc,
    }
}
