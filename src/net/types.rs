//! Shared data model for profiles, stored documents, and attendance records.
//!
//! SYSTEM CONTEXT
//! ==============
//! Profiles and raw documents arrive from the auth and store collaborators.
//! `AttendanceRecord` is the normalized shape the dashboard renders; raw
//! documents keep every field as a `FieldValue` because their layout is not fixed.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeMap;
use std::fmt;
use std::num::FpCategory;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

// =============================================================================
// PROFILE
// =============================================================================

/// Role assigned to a user profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Admin,
}

impl Role {
    /// Parse a stored role string. Anything other than `admin` is a student.
    #[must_use]
    pub fn from_stored(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("admin") { Self::Admin } else { Self::Student }
    }
}

/// Profile of the signed-in user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// School-issued identifying number. Empty when the profile lacks one.
    #[serde(default)]
    pub id_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl UserProfile {
    /// The identifying number, if the profile has a usable one.
    #[must_use]
    pub fn id_number(&self) -> Option<&str> {
        let trimmed = self.id_number.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Handle for an authenticated session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub uid: String,
    pub id_token: String,
}

/// Session slot shared by the auth collaborator and the store client.
pub type SharedSession = Arc<RwLock<Option<SessionUser>>>;

// =============================================================================
// RAW DOCUMENTS
// =============================================================================

/// A single loosely-typed field value from the document store.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    String(String),
    Map(BTreeMap<String, FieldValue>),
    Array(Vec<FieldValue>),
}

impl FieldValue {
    /// Calendar date for timestamp values; `None` for every other kind.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value counts as "not set" (null, `false`, zero, or empty string).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Boolean(b) => !b,
            Self::Integer(n) => *n == 0,
            Self::Double(n) => matches!(n.classify(), FpCategory::Zero | FpCategory::Nan),
            Self::String(s) => s.is_empty(),
            Self::Timestamp(_) | Self::Map(_) | Self::Array(_) => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Double(n) => write!(f, "{n}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Self::String(s) => f.write_str(s),
            Self::Map(_) => f.write_str("{map}"),
            Self::Array(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

/// A stored document as returned by a query: store-assigned id plus fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawDocument {
    pub id: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl RawDocument {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), fields: BTreeMap::new() }
    }

    /// Builder-style field insert, mostly for fixtures.
    #[must_use]
    pub fn with_field(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.insert(name.to_owned(), value);
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

// =============================================================================
// ATTENDANCE
// =============================================================================

/// Attendance status of one record. Unrecognized stored values are kept verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    #[default]
    Present,
    Late,
    Absent,
    Excused,
    Other(String),
}

impl AttendanceStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Present" => Self::Present,
            "Late" => Self::Late,
            "Absent" => Self::Absent,
            "Excused" => Self::Excused,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Present => "Present",
            Self::Late => "Late",
            Self::Absent => "Absent",
            Self::Excused => "Excused",
            Self::Other(raw) => raw,
        }
    }

    /// Visual tone used for the status chip.
    #[must_use]
    pub fn tone(&self) -> StatusTone {
        match self {
            Self::Present => StatusTone::Success,
            Self::Late => StatusTone::Warning,
            Self::Absent => StatusTone::Error,
            Self::Excused => StatusTone::Info,
            Self::Other(_) => StatusTone::Neutral,
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AttendanceStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AttendanceStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Chip color class for a status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Warning,
    Error,
    Info,
    Neutral,
}

/// A normalized attendance record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
}

// =============================================================================
// QR
// =============================================================================

/// Reference to a rendered QR image (a URL or data URI).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrImage(pub String);

impl QrImage {
    #[must_use]
    pub fn src(&self) -> &str {
        &self.0
    }
}
