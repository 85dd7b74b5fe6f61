use super::*;
use crate::net::types::AttendanceStatus;
use crate::test_helpers::{admin_profile, student_profile};
use chrono::{TimeZone, Utc};

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

#[test]
fn default_state_is_loading_on_profile_tab() {
    let state = DashboardState::default();
    assert!(state.loading);
    assert!(!state.loading_records);
    assert_eq!(state.tab, Tab::Profile);
    assert!(state.profile.is_none());
    assert!(state.error.is_none());
}

#[test]
fn scan_tab_offered_to_admins_only() {
    assert_eq!(available_tabs(None), vec![Tab::Profile, Tab::Records]);
    assert_eq!(available_tabs(Some(&student_profile())), vec![Tab::Profile, Tab::Records]);
    assert_eq!(available_tabs(Some(&admin_profile())), vec![Tab::Profile, Tab::Records, Tab::Scan]);
}

#[test]
fn tab_labels() {
    assert_eq!(Tab::Profile.label(), "Profile");
    assert_eq!(Tab::Records.label(), "Attendance Records");
    assert_eq!(Tab::Scan.label(), "Scan QR");
}

#[test]
fn records_view_prefers_loading_then_error_then_empty() {
    let mut state = DashboardState { loading_records: true, ..DashboardState::default() };
    assert_eq!(state.records_view(&utc()), RecordsView::Loading);

    state.loading_records = false;
    state.records_error = Some("Failed to fetch attendance records: boom".into());
    assert_eq!(
        state.records_view(&utc()),
        RecordsView::Error("Failed to fetch attendance records: boom".into())
    );

    state.records_error = None;
    assert_eq!(state.records_view(&utc()), RecordsView::Empty("No attendance records found."));
}

#[test]
fn records_view_renders_rows_in_order() {
    let state = DashboardState {
        records: vec![
            AttendanceRecord {
                id: "new".into(),
                date: Utc.with_ymd_and_hms(2025, 3, 2, 14, 5, 0).unwrap(),
                status: AttendanceStatus::Present,
            },
            AttendanceRecord {
                id: "old".into(),
                date: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
                status: AttendanceStatus::Absent,
            },
        ],
        ..DashboardState::default()
    };
    let RecordsView::Rows(rows) = state.records_view(&utc()) else {
        panic!("expected rows");
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "new");
    assert_eq!(rows[0].date, "Mar 02, 2025");
    assert_eq!(rows[0].time, "02:05 PM");
    assert_eq!(rows[1].status, "Absent");
}

#[test]
fn qr_view_shows_image_or_failure_text() {
    let mut state = DashboardState::default();
    assert_eq!(state.qr_view(), QrView::Failed("Failed to generate QR code"));
    state.qr_code = Some(QrImage("qr://S123".into()));
    assert_eq!(state.qr_view(), QrView::Image("qr://S123"));
}
