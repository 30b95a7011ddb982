// server/src/tokens.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::store::{Datastore, StoreError};
use crate::utils::token::generate_secure_token;
use common::models::TokenRecord;

/// Token manager: opaque bearer tokens used solely to authenticate the
/// WebSocket upgrade. Shares the user id namespace with sessions but is
/// otherwise independent of them.
#[derive(Clone)]
pub struct TokenManager {
    store: Arc<dyn Datastore>,
    token_length: usize,
}

impl TokenManager {
    pub fn new(store: Arc<dyn Datastore>, token_length: usize) -> Self {
        Self {
            store,
            token_length,
        }
    }

    /// Mint a token, rotating out any prior tokens for the user so exactly
    /// one deliverable credential exists per active login
    pub async fn create(&self, user_id: Uuid) -> Result<String, StoreError> {
        self.store.delete_tokens_for_user(user_id).await?;

        let record = TokenRecord::new(generate_secure_token(self.token_length), user_id);
        let token = record.token.clone();
        self.store.insert_token(record).await?;
        tracing::debug!("Minted token for user: {}", user_id);
        Ok(token)
    }

    pub async fn resolve(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        Ok(self.store.find_token(token).await?.map(|r| r.user_id))
    }

    /// Idempotent delete; no error when the token does not exist
    pub async fn delete(&self, token: &str) -> Result<(), StoreError> {
        self.store.delete_token(token).await
    }

    /// Re-surface the user's current token for the page. Newest issuance
    /// wins; the token string breaks exact-timestamp ties so the choice is
    /// deterministic even if a foreign writer races the rotation.
    pub async fn token_for_user(&self, user_id: Uuid) -> Result<Option<String>, StoreError> {
        let mut records = self.store.tokens_for_user(user_id).await?;
        records.sort_by(|a, b| {
            b.issued_at
                .cmp(&a.issued_at)
                .then_with(|| b.token.cmp(&a.token))
        });
        Ok(records.into_iter().next().map(|r| r.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;
    use chrono::{Duration, Utc};

    fn manager() -> (Arc<MemStore>, TokenManager) {
        let store = Arc::new(MemStore::new());
        let tokens = TokenManager::new(Arc::clone(&store) as Arc<dyn Datastore>, 32);
        (store, tokens)
    }

    #[tokio::test]
    async fn resolves_minted_token_to_user() {
        let (_store, tokens) = manager();
        let user_id = Uuid::new_v4();

        let token = tokens.create(user_id).await.unwrap();
        assert!(token.len() >= 21);
        assert_eq!(tokens.resolve(&token).await.unwrap(), Some(user_id));
    }

    #[tokio::test]
    async fn creation_rotates_out_prior_tokens() {
        let (_store, tokens) = manager();
        let user_id = Uuid::new_v4();

        let first = tokens.create(user_id).await.unwrap();
        let second = tokens.create(user_id).await.unwrap();

        assert!(tokens.resolve(&first).await.unwrap().is_none());
        assert_eq!(tokens.resolve(&second).await.unwrap(), Some(user_id));
        assert_eq!(
            tokens.token_for_user(user_id).await.unwrap(),
            Some(second)
        );
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_store, tokens) = manager();
        let user_id = Uuid::new_v4();

        let token = tokens.create(user_id).await.unwrap();
        tokens.delete(&token).await.unwrap();
        tokens.delete(&token).await.unwrap();
        assert!(tokens.resolve(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn token_for_user_prefers_newest_issuance() {
        let (store, tokens) = manager();
        let user_id = Uuid::new_v4();

        // A foreign writer leaving several rows behind
        store
            .insert_token(TokenRecord {
                token: "older".to_string(),
                user_id,
                issued_at: Utc::now() - Duration::seconds(60),
            })
            .await
            .unwrap();
        store
            .insert_token(TokenRecord {
                token: "newer".to_string(),
                user_id,
                issued_at: Utc::now(),
            })
            .await
            .unwrap();

        assert_eq!(
            tokens.token_for_user(user_id).await.unwrap(),
            Some("newer".to_string())
        );
        assert!(tokens.token_for_user(Uuid::new_v4()).await.unwrap().is_none());
    }
}
