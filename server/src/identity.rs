// server/src/identity.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::store::{Datastore, StoreError};
use crate::utils::token::{digest_password, verify_password};
use common::models::User;

/// Identity store facade: durable user records plus the digest comparison
/// primitive. The raw password is digested here and never stored.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn Datastore>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }

    /// Create a user. Username uniqueness is enforced by the store.
    pub async fn create(&self, username: &str, password: &str) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_digest: digest_password(password),
        };
        self.store.insert_user(user.clone()).await?;
        tracing::info!("Created user: {}", user.username);
        Ok(user)
    }

    /// Resolve credentials to a user. Unknown username and digest mismatch
    /// are indistinguishable to the caller.
    pub async fn verify(&self, username: &str, password: &str) -> Result<Option<User>, StoreError> {
        let user = self.store.find_user_by_username(username).await?;
        Ok(user.filter(|u| verify_password(&u.password_digest, password)))
    }
}
