use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Agency-facing inbox entry. Metadata is denormalized at creation time so the
/// notification stays meaningful even if the source rows later change. Mutated
/// only to flip is_read/read_at.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub agency_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub property_id: Option<Uuid>,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}
