// common/src/models/user.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable user record, unique by username. The digest is an opaque one-way
/// hash; the raw password never touches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_digest: String,
}

/// Client-visible projection of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    // Omit the password digest
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}
