// server/src/store/mod.rs
pub mod memory;

pub use memory::MemStore;

use actix_web::http::StatusCode;
use actix_web::ResponseError;
use async_trait::async_trait;
use common::models::{Session, Timer, TokenRecord, User};
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the datastore collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already taken: {0}")]
    DuplicateUsername(String),
    #[error("datastore unavailable: {0}")]
    Unavailable(String),
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::DuplicateUsername(_) => StatusCode::CONFLICT,
            // Fatal for the request, not for the process
            StoreError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Async key-value/document store seam. Implementations own durability; the
/// service only finds, inserts, and deletes by filter. Timer rows are
/// read-only here because timer CRUD belongs to an external collaborator.
#[async_trait]
pub trait Datastore: Send + Sync {
    // Users
    async fn insert_user(&self, user: User) -> Result<(), StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    // Sessions
    async fn insert_session(&self, session: Session) -> Result<(), StoreError>;
    async fn find_session(&self, id: &str) -> Result<Option<Session>, StoreError>;
    async fn delete_session(&self, id: &str) -> Result<(), StoreError>;

    // Tokens
    async fn insert_token(&self, record: TokenRecord) -> Result<(), StoreError>;
    async fn find_token(&self, token: &str) -> Result<Option<TokenRecord>, StoreError>;
    async fn delete_token(&self, token: &str) -> Result<(), StoreError>;
    async fn delete_tokens_for_user(&self, user_id: Uuid) -> Result<(), StoreError>;
    async fn tokens_for_user(&self, user_id: Uuid) -> Result<Vec<TokenRecord>, StoreError>;

    // Timers
    async fn timers_for_user(&self, user_id: Uuid) -> Result<Vec<Timer>, StoreError>;
    async fn active_timers_for_user(&self, user_id: Uuid) -> Result<Vec<Timer>, StoreError>;
}
