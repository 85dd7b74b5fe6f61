//! Session-backed auth collaborator.
//!
//! SYSTEM CONTEXT
//! ==============
//! Signing in happens elsewhere; this service only holds the resulting
//! session and reads the matching `users/{uid}` profile document.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use crate::net::api::{ApiError, AuthProvider};
use crate::net::firestore::FirestoreClient;
use crate::net::types::{FieldValue, RawDocument, Role, SessionUser, SharedSession, UserProfile};

/// Auth collaborator over a shared session slot and the profile store.
pub struct SessionAuth {
    session: SharedSession,
    store: Arc<FirestoreClient>,
}

impl SessionAuth {
    #[must_use]
    pub fn new(session: SharedSession, store: Arc<FirestoreClient>) -> Self {
        Self { session, store }
    }

    /// Replace the current session (sign-in result or token refresh).
    pub async fn set_session(&self, session: Option<SessionUser>) {
        *self.session.write().await = session;
    }
}

#[async_trait::async_trait]
impl AuthProvider for SessionAuth {
    async fn current_user(&self) -> Option<SessionUser> {
        self.session.read().await.clone()
    }

    async fn get_user_data(&self) -> Result<UserProfile, ApiError> {
        let uid = self.current_user().await.ok_or(ApiError::Unauthenticated)?.uid;
        let collection = self.store.config().users_collection.clone();
        let doc = self.store.get_document(&collection, &uid).await?;
        Ok(profile_from_document(&doc))
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let previous = self.session.write().await.take();
        if let Some(session) = previous {
            tracing::info!(uid = %session.uid, "session cleared");
        }
        Ok(())
    }
}

/// Map a stored user document onto a profile. Missing fields stay empty so
/// the dashboard can report an incomplete profile instead of failing here.
pub(crate) fn profile_from_document(doc: &RawDocument) -> UserProfile {
    let text = |name: &str| match doc.field(name) {
        Some(FieldValue::String(s)) => s.trim().to_owned(),
        Some(FieldValue::Integer(n)) => n.to_string(),
        _ => String::new(),
    };
    UserProfile {
        id_number: text("idNumber"),
        email: text("email"),
        role: Role::from_stored(&text("role")),
    }
}
