// server/src/store/memory.rs
use super::{Datastore, StoreError};
use async_trait::async_trait;
use common::models::{Session, Timer, TokenRecord, User};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

/// In-process datastore: one map per collection plus a username uniqueness
/// index. The reference implementation of the `Datastore` seam; a durable
/// backend replaces this without touching call sites.
#[derive(Debug, Default)]
pub struct MemStore {
    users: DashMap<Uuid, User>,
    username_index: DashMap<String, Uuid>,
    sessions: DashMap<String, Session>,
    tokens: DashMap<String, TokenRecord>,
    timers: DashMap<Uuid, Timer>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a timer row. Timer writes are the out-of-scope CRUD
    /// collaborator's job; this exists for tests and demo data.
    pub fn insert_timer(&self, timer: Timer) {
        self.timers.insert(timer.id, timer);
    }
}

#[async_trait]
impl Datastore for MemStore {
    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        match self.username_index.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateUsername(user.username)),
            Entry::Vacant(entry) => {
                entry.insert(user.id);
                self.users.insert(user.id, user);
                Ok(())
            }
        }
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let id = match self.username_index.get(username) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn insert_session(&self, session: Session) -> Result<(), StoreError> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn find_session(&self, id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.get(id).map(|entry| entry.value().clone()))
    }

    async fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        self.sessions.remove(id);
        Ok(())
    }

    async fn insert_token(&self, record: TokenRecord) -> Result<(), StoreError> {
        self.tokens.insert(record.token.clone(), record);
        Ok(())
    }

    async fn find_token(&self, token: &str) -> Result<Option<TokenRecord>, StoreError> {
        Ok(self.tokens.get(token).map(|entry| entry.value().clone()))
    }

    async fn delete_token(&self, token: &str) -> Result<(), StoreError> {
        self.tokens.remove(token);
        Ok(())
    }

    async fn delete_tokens_for_user(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.tokens.retain(|_, record| record.user_id != user_id);
        Ok(())
    }

    async fn tokens_for_user(&self, user_id: Uuid) -> Result<Vec<TokenRecord>, StoreError> {
        Ok(self
            .tokens
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn timers_for_user(&self, user_id: Uuid) -> Result<Vec<Timer>, StoreError> {
        let mut timers: Vec<Timer> = self
            .timers
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        // Stable wire order: oldest start first, id as tiebreak
        timers.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        Ok(timers)
    }

    async fn active_timers_for_user(&self, user_id: Uuid) -> Result<Vec<Timer>, StoreError> {
        let mut timers = self.timers_for_user(user_id).await?;
        timers.retain(|timer| timer.is_active);
        Ok(timers)
    }
}
