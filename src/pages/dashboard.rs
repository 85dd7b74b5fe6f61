//! Attendance dashboard orchestration.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the authenticated landing screen. It loads the signed-in user's
//! profile, derives their QR image, fetches their attendance history, and for
//! administrators hosts the QR scanner on its own tab.
//!
//! DESIGN
//! ======
//! - Collaborators arrive as trait objects so the page runs unchanged against
//!   Firestore or test doubles.
//! - State lives behind `Arc<RwLock<_>>` shared with the scan-result recorder;
//!   the scanner itself is owned here and only exists while the scan tab is
//!   selected.
//!
//! ERROR HANDLING
//! ==============
//! Every failure becomes a message in `DashboardState`. No operation here
//! returns an error to its caller.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::net::api::{AuthProvider, DocumentStore, LOGIN_ROUTE, Navigator, QrGenerator};
use crate::net::types::UserProfile;
use crate::scan::engine::{ScanConfig, ScanEngineFactory, ScanError, ScanHandler};
use crate::scan::input::{ScanInput, ScannerState};
use crate::state::dashboard::{DashboardState, Tab};
use crate::state::records::{MATCH_FIELD, normalize_documents};

pub const MISSING_ID_MESSAGE: &str = "No ID number found in your profile. Please contact an administrator.";

/// External collaborators the dashboard drives.
#[derive(Clone)]
pub struct DashboardDeps {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn DocumentStore>,
    pub qr: Arc<dyn QrGenerator>,
    pub navigator: Arc<dyn Navigator>,
    pub scanner: Arc<dyn ScanEngineFactory>,
    /// Collection holding attendance documents.
    pub attendance_collection: String,
    pub scan_config: ScanConfig,
}

pub struct Dashboard {
    deps: DashboardDeps,
    state: Arc<RwLock<DashboardState>>,
    scan_input: Option<ScanInput>,
}

impl Dashboard {
    #[must_use]
    pub fn new(deps: DashboardDeps) -> Self {
        Self { deps, state: Arc::new(RwLock::new(DashboardState::default())), scan_input: None }
    }

    /// Copy of the current state for rendering.
    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    /// Live scanner, present only while the scan tab is selected.
    pub fn scanner(&mut self) -> Option<&mut ScanInput> {
        self.scan_input.as_mut()
    }

    // =========================================================================
    // PROFILE
    // =========================================================================

    /// Load the profile, then the QR image and attendance history.
    /// Redirects to the login route when nobody is signed in.
    pub async fn load(&mut self) {
        if self.deps.auth.current_user().await.is_none() {
            tracing::info!("no authenticated session; redirecting to login");
            self.deps.navigator.navigate(LOGIN_ROUTE);
            return;
        }

        let profile = match self.deps.auth.get_user_data().await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!(error = %e, "failed to load user data");
                let mut state = self.state.write().await;
                state.error = Some(format!("Failed to load user data: {e}"));
                state.loading = false;
                return;
            }
        };

        let Some(id_number) = profile.id_number().map(str::to_owned) else {
            tracing::warn!(email = %profile.email, "profile has no id number");
            let mut state = self.state.write().await;
            state.profile = Some(profile);
            state.error = Some(MISSING_ID_MESSAGE.to_owned());
            state.loading = false;
            return;
        };

        let qr_code = match self.deps.qr.generate(&id_number).await {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(%id_number, error = %e, "failed to generate QR code");
                None
            }
        };

        {
            let mut state = self.state.write().await;
            state.profile = Some(profile);
            state.qr_code = qr_code;
            state.error = None;
            state.loading = false;
        }

        self.fetch_records(&id_number).await;
    }

    // =========================================================================
    // HISTORY
    // =========================================================================

    /// Query attendance documents for `id_number` and replace the history.
    pub async fn fetch_records(&self, id_number: &str) {
        {
            let mut state = self.state.write().await;
            state.loading_records = true;
            state.records_error = None;
        }

        tracing::info!(%id_number, "fetching attendance records");
        let result = self
            .deps
            .store
            .query(&self.deps.attendance_collection, MATCH_FIELD, id_number)
            .await;

        let mut state = self.state.write().await;
        state.loading_records = false;
        match result {
            Ok(docs) => {
                tracing::info!(count = docs.len(), "attendance documents received");
                state.records = normalize_documents(&docs, Utc::now());
            }
            Err(e) => {
                tracing::error!(%id_number, error = %e, "failed to fetch attendance records");
                state.records_error = Some(format!("Failed to fetch attendance records: {e}"));
            }
        }
    }

    /// Re-run the history fetch for the loaded profile. Returns `false` when
    /// there is no usable profile or a fetch is already in flight.
    pub async fn refresh_records(&self) -> bool {
        let id_number = {
            let state = self.state.read().await;
            if state.loading_records {
                return false;
            }
            match state.profile.as_ref().and_then(UserProfile::id_number) {
                Some(id) => id.to_owned(),
                None => return false,
            }
        };
        self.fetch_records(&id_number).await;
        true
    }

    // =========================================================================
    // TABS
    // =========================================================================

    /// Switch tabs. Entering the scan tab mounts a scanner; leaving it tears
    /// the scanner down. Non-administrators cannot select the scan tab.
    pub async fn select_tab(&mut self, tab: Tab) -> bool {
        let current = {
            let state = self.state.read().await;
            if !state.available_tabs().contains(&tab) {
                tracing::warn!(tab = tab.label(), "tab not available for this profile");
                return false;
            }
            state.tab
        };
        if current == tab {
            return true;
        }

        if current == Tab::Scan {
            self.unmount_scanner().await;
        }
        self.state.write().await.tab = tab;

        if tab == Tab::Scan {
            let recorder = Arc::new(ScanResultRecorder { state: Arc::clone(&self.state) });
            let mut input = ScanInput::new(Arc::clone(&self.deps.scanner), recorder, self.deps.scan_config.clone());
            input.initialize().await;
            self.scan_input = Some(input);
        }
        true
    }

    /// Apply queued scanner events. After a completed camera scan the scanner
    /// is re-initialized for the next student. Returns the delivered payload.
    pub async fn pump_scanner(&mut self) -> Option<String> {
        let input = self.scan_input.as_mut()?;
        let delivered = input.pump().await;
        if delivered.is_some() && input.state() == ScannerState::Initializing {
            input.initialize().await;
        }
        delivered
    }

    async fn unmount_scanner(&mut self) {
        if let Some(mut input) = self.scan_input.take() {
            input.teardown().await;
        }
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Sign out and return to the login route.
    pub async fn logout(&mut self) -> bool {
        match self.deps.auth.logout().await {
            Ok(()) => {
                self.unmount_scanner().await;
                self.deps.navigator.navigate(LOGIN_ROUTE);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "logout failed");
                self.state.write().await.error = Some(format!("Failed to log out: {e}"));
                false
            }
        }
    }

    /// Release the scanner, if any.
    pub async fn shutdown(&mut self) {
        self.unmount_scanner().await;
    }
}

/// Scan completion handler that stores the identifier for display.
struct ScanResultRecorder {
    state: Arc<RwLock<DashboardState>>,
}

#[async_trait::async_trait]
impl ScanHandler for ScanResultRecorder {
    async fn on_scan(&self, identifier: String) -> Result<(), ScanError> {
        tracing::info!(%identifier, "scan result recorded");
        self.state.write().await.scan_result = Some(identifier);
        Ok(())
    }
}
