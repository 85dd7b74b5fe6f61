//! Collaborator interfaces for auth, document storage, QR images, and navigation.
//!
//! SYSTEM CONTEXT
//! ==============
//! The dashboard talks to every external system through these traits so the
//! Firestore-backed implementations and the test mocks are interchangeable.
//!
//! ERROR HANDLING
//! ==============
//! Every fallible call returns `ApiError`. Callers convert errors into UI
//! state at the action boundary; nothing here panics.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::{Arc, Mutex};

use super::types::{QrImage, RawDocument, SessionUser, UserProfile};

/// Route of the login surface.
pub const LOGIN_ROUTE: &str = "/login";

/// Errors produced by collaborator calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("unexpected response: status {status}{}", body_suffix(body))]
    Response { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The requested document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The call requires a signed-in user.
    #[error("not authenticated")]
    Unauthenticated,

    /// The QR image could not be produced.
    #[error("qr generation failed: {0}")]
    Qr(String),
}

impl ApiError {
    /// Whether retrying the same call could plausibly succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Response { status: 408 | 429 | 500..=599, .. })
    }
}

/// Longest response body echoed into an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

fn body_suffix(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let mut shown: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    if trimmed.chars().count() > MAX_ERROR_BODY_CHARS {
        shown.push_str("...");
    }
    format!(": {shown}")
}

/// Auth collaborator: session handle, profile lookup, and logout.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current session, or `None` when nobody is signed in.
    async fn current_user(&self) -> Option<SessionUser>;

    /// Profile of the current user.
    async fn get_user_data(&self) -> Result<UserProfile, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;
}

/// Document-store collaborator.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in `collection` whose `field` equals `value`, in no particular order.
    async fn query(&self, collection: &str, field: &str, value: &str) -> Result<Vec<RawDocument>, ApiError>;
}

/// QR image collaborator.
#[async_trait::async_trait]
pub trait QrGenerator: Send + Sync {
    async fn generate(&self, payload: &str) -> Result<QrImage, ApiError>;
}

/// Navigation collaborator.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator that records every route it is asked to visit.
#[derive(Clone, Debug, Default)]
pub struct RouteLog {
    routes: Arc<Mutex<Vec<String>>>,
}

impl RouteLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes visited so far, oldest first.
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.routes.lock().map(|r| r.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.routes.lock().ok().and_then(|r| r.last().cloned())
    }
}

impl Navigator for RouteLog {
    fn navigate(&self, route: &str) {
        tracing::info!(%route, "navigate");
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_owned());
        }
    }
}
