// common/src/models/timer.rs
use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timer record, read-only from this subsystem's perspective. Serialization
/// is the wire contract: millisecond epoch timestamps, `end` omitted while
/// the timer runs, and the owning user id never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: Uuid,
    #[serde(skip_serializing, default)]
    pub user_id: Uuid,
    pub description: String,
    #[serde(with = "ts_milliseconds")]
    pub start: DateTime<Utc>,
    #[serde(
        with = "ts_milliseconds_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<DateTime<Utc>>,
    pub is_active: bool,
}
