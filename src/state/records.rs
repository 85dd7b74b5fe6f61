//! Attendance record normalization and display rows.
//!
//! DESIGN
//! ======
//! Stored attendance documents carry their date under either `timestamp` or
//! the older `date` field, and may omit `status`. Normalization is pure and
//! total: each document becomes a record with best-effort fields, or an
//! explicit skip reason. Ordering is applied here rather than by the store.

#[cfg(test)]
#[path = "records_test.rs"]
mod records_test;

use chrono::{DateTime, FixedOffset, Utc};

use crate::net::types::{AttendanceRecord, AttendanceStatus, FieldValue, RawDocument, StatusTone};

/// Field matched against the student's identifying number.
pub const MATCH_FIELD: &str = "idNumber";
pub const PRIMARY_DATE_FIELD: &str = "timestamp";
pub const LEGACY_DATE_FIELD: &str = "date";
pub const STATUS_FIELD: &str = "status";

/// Why a document was left out of the normalized collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("document has no id")]
    MissingId,
}

/// Date of a document: `timestamp` first, then `date`, each only if it holds a timestamp.
#[must_use]
pub fn record_date(doc: &RawDocument) -> Option<DateTime<Utc>> {
    [PRIMARY_DATE_FIELD, LEGACY_DATE_FIELD]
        .iter()
        .find_map(|name| doc.field(name).and_then(FieldValue::as_timestamp))
}

/// Status of a document, `Present` when the field is absent or blank.
#[must_use]
pub fn record_status(doc: &RawDocument) -> AttendanceStatus {
    match doc.field(STATUS_FIELD) {
        None => AttendanceStatus::Present,
        Some(value) if value.is_blank() => AttendanceStatus::Present,
        Some(FieldValue::String(raw)) => AttendanceStatus::parse(raw),
        Some(other) => AttendanceStatus::Other(other.to_string()),
    }
}

/// Normalize one document. A missing date falls back to `now`.
///
/// # Errors
///
/// Returns a skip reason when the document cannot be represented at all.
pub fn normalize_document(doc: &RawDocument, now: DateTime<Utc>) -> Result<AttendanceRecord, SkipReason> {
    if doc.id.trim().is_empty() {
        return Err(SkipReason::MissingId);
    }
    let date = record_date(doc).unwrap_or_else(|| {
        tracing::warn!(doc_id = %doc.id, "no valid timestamp found in record; using current time");
        now
    });
    Ok(AttendanceRecord { id: doc.id.clone(), date, status: record_status(doc) })
}

/// Normalize every document, skipping the unrepresentable ones, newest first.
#[must_use]
pub fn normalize_documents(docs: &[RawDocument], now: DateTime<Utc>) -> Vec<AttendanceRecord> {
    let mut records: Vec<AttendanceRecord> = docs
        .iter()
        .filter_map(|doc| match normalize_document(doc, now) {
            Ok(record) => Some(record),
            Err(reason) => {
                tracing::warn!(doc_id = %doc.id, %reason, "skipping attendance record");
                None
            }
        })
        .collect();
    sort_newest_first(&mut records);
    records
}

/// Stable sort by date, most recent first.
pub fn sort_newest_first(records: &mut [AttendanceRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

/// One rendered row of the history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub id: String,
    /// e.g. `Mar 01, 2025`
    pub date: String,
    /// e.g. `08:30 AM`
    pub time: String,
    pub status: String,
    pub tone: StatusTone,
}

impl RecordRow {
    #[must_use]
    pub fn from_record(record: &AttendanceRecord, offset: &FixedOffset) -> Self {
        let local = record.date.with_timezone(offset);
        Self {
            id: record.id.clone(),
            date: local.format("%b %d, %Y").to_string(),
            time: local.format("%I:%M %p").to_string(),
            status: record.status.to_string(),
            tone: record.status.tone(),
        }
    }
}
