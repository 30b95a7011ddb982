// server/src/sessions.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::store::{Datastore, StoreError};
use crate::utils::token::create_session_id;
use common::models::{Session, User};

/// Session manager: opaque server-side session ids bound to a user id. The
/// id is the only value that ever reaches the client; user data stays two
/// lookups away behind it.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn Datastore>,
    ttl_seconds: i64,
}

impl SessionManager {
    pub fn new(store: Arc<dyn Datastore>, ttl_seconds: i64) -> Self {
        Self { store, ttl_seconds }
    }

    /// Mint a fresh session for the user
    pub async fn create(&self, user_id: Uuid) -> Result<String, StoreError> {
        let session = Session::new(create_session_id(), user_id);
        let id = session.id.clone();
        self.store.insert_session(session).await?;
        tracing::debug!("Created session for user: {}", user_id);
        Ok(id)
    }

    /// Two-hop resolve: session id to session row to user. Absent (not an
    /// error) on any miss. Sessions past their TTL resolve absent and are
    /// lazily deleted on the way out.
    pub async fn resolve(&self, session_id: &str) -> Result<Option<User>, StoreError> {
        let Some(session) = self.store.find_session(session_id).await? else {
            return Ok(None);
        };

        if session.is_expired(self.ttl_seconds) {
            tracing::debug!("Session expired: {}", session_id);
            self.store.delete_session(session_id).await?;
            return Ok(None);
        }

        self.store.find_user_by_id(session.user_id).await
    }

    /// Idempotent delete; no error when the id does not exist
    pub async fn delete(&self, session_id: &str) -> Result<(), StoreError> {
        self.store.delete_session(session_id).await
    }
}
