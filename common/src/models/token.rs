// common/src/models/token.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bearer-token row, used solely to authenticate WebSocket upgrades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    pub user_id: Uuid,
    /// Timestamp when the token was minted; newest wins when re-surfacing
    pub issued_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn new(token: String, user_id: Uuid) -> Self {
        Self {
            token,
            user_id,
            issued_at: Utc::now(),
        }
    }
}
