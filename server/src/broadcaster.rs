// server/src/broadcaster.rs
use actix::Addr;
use std::sync::Arc;
use uuid::Uuid;

use crate::actors::connection_registry::{ConnectionRegistryActor, Push, RecordIgnoredMessage};
use crate::store::{Datastore, StoreError};
use common::messages::{ClientQuery, ServerPush};

/// Fetches timer snapshots for inbound queries and pushes them back through
/// the registry. Routing the reply through `Push` (instead of writing the
/// socket directly) means a read completing after its socket closed becomes
/// a counted drop rather than a write on a dead connection.
#[derive(Clone)]
pub struct UpdateBroadcaster {
    store: Arc<dyn Datastore>,
    registry: Addr<ConnectionRegistryActor>,
}

impl UpdateBroadcaster {
    pub fn new(store: Arc<dyn Datastore>, registry: Addr<ConnectionRegistryActor>) -> Self {
        Self { store, registry }
    }

    /// Handle one inbound frame. Non-JSON payloads and unknown query types
    /// are dropped without a reply; the connection must stay open.
    pub async fn handle_query(&self, user_id: Uuid, raw: &str) -> Result<(), StoreError> {
        let query = match serde_json::from_str::<ClientQuery>(raw) {
            Ok(query) => query,
            Err(_) => {
                self.registry.do_send(RecordIgnoredMessage);
                tracing::debug!("Ignoring unrecognized message from user: {}", user_id);
                return Ok(());
            }
        };

        let push = match query {
            ClientQuery::AllTimers => ServerPush::AllTimers {
                timers: self.store.timers_for_user(user_id).await?,
            },
            ClientQuery::ActiveTimers => ServerPush::ActiveTimers {
                timers: self.store.active_timers_for_user(user_id).await?,
            },
        };

        match serde_json::to_string(&push) {
            Ok(payload) => self.registry.do_send(Push { user_id, payload }),
            Err(err) => {
                tracing::error!("Failed to serialize push for user {}: {}", user_id, err)
            }
        }

        Ok(())
    }
}
