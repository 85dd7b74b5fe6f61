//! Application configuration parsed from environment variables.

use crate::net::types::SessionUser;

pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_ATTENDANCE_COLLECTION: &str = "attendance";
pub const DEFAULT_USERS_COLLECTION: &str = "users";
pub const DEFAULT_QR_IMAGE_BASE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";
pub const DEFAULT_QR_IMAGE_SIZE: u32 = 250;
pub const DEFAULT_HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    Missing { var: String },
    #[error("invalid value for {var}: {value}")]
    Invalid { var: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub attendance_collection: String,
    pub users_collection: String,
}

impl FirestoreConfig {
    /// Root of the default database's document tree.
    #[must_use]
    pub fn documents_url(&self) -> String {
        format!("{}/projects/{}/databases/(default)/documents", self.base_url, self.project_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrConfig {
    pub base_url: String,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub firestore: FirestoreConfig,
    pub qr: QrConfig,
    pub timeouts: HttpTimeouts,
    pub session: Option<SessionUser>,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `FIRESTORE_PROJECT_ID`
    ///
    /// Optional:
    /// - `FIRESTORE_BASE_URL`: default Firestore REST v1 endpoint
    /// - `ATTENDANCE_COLLECTION`: default `attendance`
    /// - `USERS_COLLECTION`: default `users`
    /// - `QR_IMAGE_BASE_URL`, `QR_IMAGE_SIZE`: default public QR renderer, 250px
    /// - `HTTP_REQUEST_TIMEOUT_SECS`: default 30
    /// - `HTTP_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SESSION_UID` + `SESSION_ID_TOKEN`: signed-in session; absent means signed out
    ///
    /// # Errors
    ///
    /// Returns an error if the project id is missing or a numeric knob does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let project_id = non_empty_var("FIRESTORE_PROJECT_ID")
            .ok_or_else(|| ConfigError::Missing { var: "FIRESTORE_PROJECT_ID".into() })?;

        let firestore = FirestoreConfig {
            base_url: non_empty_var("FIRESTORE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FIRESTORE_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            project_id,
            attendance_collection: non_empty_var("ATTENDANCE_COLLECTION")
                .unwrap_or_else(|| DEFAULT_ATTENDANCE_COLLECTION.to_string()),
            users_collection: non_empty_var("USERS_COLLECTION").unwrap_or_else(|| DEFAULT_USERS_COLLECTION.to_string()),
        };

        let qr = QrConfig {
            base_url: non_empty_var("QR_IMAGE_BASE_URL").unwrap_or_else(|| DEFAULT_QR_IMAGE_BASE_URL.to_string()),
            size: env_parse("QR_IMAGE_SIZE", DEFAULT_QR_IMAGE_SIZE)?,
        };

        let timeouts = HttpTimeouts {
            request_secs: env_parse("HTTP_REQUEST_TIMEOUT_SECS", DEFAULT_HTTP_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse("HTTP_CONNECT_TIMEOUT_SECS", DEFAULT_HTTP_CONNECT_TIMEOUT_SECS)?,
        };

        let session = match (non_empty_var("SESSION_UID"), non_empty_var("SESSION_ID_TOKEN")) {
            (Some(uid), Some(id_token)) => Some(SessionUser { uid, id_token }),
            _ => None,
        };

        Ok(Self { firestore, qr, timeouts, session })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match non_empty_var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var: key.to_owned(), value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
