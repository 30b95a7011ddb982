// common/src/messages.rs
use crate::models::Timer;
use serde::{Deserialize, Serialize};

/// Client-initiated query over an established socket. Anything that fails to
/// parse into one of these shapes is dropped without a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientQuery {
    AllTimers,
    ActiveTimers,
}

/// Snapshot pushed back over the querying user's registered socket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerPush {
    AllTimers { timers: Vec<Timer> },
    ActiveTimers { timers: Vec<Timer> },
}
