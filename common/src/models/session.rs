// common/src/models/session.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-side session row binding an opaque identifier to a user. The id is
/// the only value ever placed in the client's session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: Uuid,
    /// Timestamp when the session was issued
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String, user_id: Uuid) -> Self {
        Self {
            id,
            user_id,
            issued_at: Utc::now(),
        }
    }

    /// Check if the session has expired based on TTL
    pub fn is_expired(&self, ttl_seconds: i64) -> bool {
        let age = Utc::now().signed_duration_since(self.issued_at);
        age.num_seconds() > ttl_seconds
    }
}
