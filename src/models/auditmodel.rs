use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generic operational event log. Free-form event types, unlike the typed
/// per-submission trail in `submission_audit_log`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub agency_id: Option<Uuid>,
    pub actor_id: Option<Uuid>,
    pub actor_kind: Option<String>,
    pub event_type: String,
    pub description: String,
    pub metadata: Option<serde_json::Value>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}
