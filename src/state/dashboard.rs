//! Dashboard state for the signed-in student.
//!
//! SYSTEM CONTEXT
//! ==============
//! This model is the local projection of one user's profile, their QR image
//! reference, the attendance history, and the currently selected tab. The
//! dashboard page mutates it; views only read snapshots.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use chrono::FixedOffset;

use crate::net::types::{AttendanceRecord, QrImage, UserProfile};
use crate::state::records::RecordRow;

pub const NO_RECORDS_MESSAGE: &str = "No attendance records found.";
pub const QR_FAILED_MESSAGE: &str = "Failed to generate QR code";

/// Dashboard tabs. `Scan` is only offered to administrators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Profile,
    Records,
    Scan,
}

impl Tab {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Records => "Attendance Records",
            Self::Scan => "Scan QR",
        }
    }
}

/// Tabs the given profile may select.
#[must_use]
pub fn available_tabs(profile: Option<&UserProfile>) -> Vec<Tab> {
    let mut tabs = vec![Tab::Profile, Tab::Records];
    if profile.is_some_and(UserProfile::is_admin) {
        tabs.push(Tab::Scan);
    }
    tabs
}

/// Full dashboard state.
#[derive(Clone, Debug)]
pub struct DashboardState {
    /// Profile of the signed-in user once loaded.
    pub profile: Option<UserProfile>,
    /// QR image for the user's ID number; `None` when generation failed.
    pub qr_code: Option<QrImage>,
    /// True until the initial profile load completes.
    pub loading: bool,
    /// Page-level error (profile load, missing ID number, logout).
    pub error: Option<String>,
    pub tab: Tab,
    /// Attendance history, newest first.
    pub records: Vec<AttendanceRecord>,
    pub loading_records: bool,
    pub records_error: Option<String>,
    /// Last identifier decoded by the admin scanner.
    pub scan_result: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            profile: None,
            qr_code: None,
            loading: true,
            error: None,
            tab: Tab::Profile,
            records: Vec::new(),
            loading_records: false,
            records_error: None,
            scan_result: None,
        }
    }
}

/// What the history tab should show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordsView {
    Loading,
    /// Fetch failed; shown with a "Try Again" affordance.
    Error(String),
    Empty(&'static str),
    Rows(Vec<RecordRow>),
}

/// What the profile tab shows in place of the QR code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QrView<'a> {
    Image(&'a str),
    Failed(&'static str),
}

impl DashboardState {
    #[must_use]
    pub fn available_tabs(&self) -> Vec<Tab> {
        available_tabs(self.profile.as_ref())
    }

    #[must_use]
    pub fn records_view(&self, offset: &FixedOffset) -> RecordsView {
        if self.loading_records {
            return RecordsView::Loading;
        }
        if let Some(error) = &self.records_error {
            return RecordsView::Error(error.clone());
        }
        if self.records.is_empty() {
            return RecordsView::Empty(NO_RECORDS_MESSAGE);
        }
        RecordsView::Rows(self.records.iter().map(|r| RecordRow::from_record(r, offset)).collect())
    }

    #[must_use]
    pub fn qr_view(&self) -> QrView<'_> {
        match &self.qr_code {
            Some(image) => QrView::Image(image.src()),
            None => QrView::Failed(QR_FAILED_MESSAGE),
        }
    }
}
