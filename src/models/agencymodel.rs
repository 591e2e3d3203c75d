use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant root. Created by the superadmin, soft-disabled via is_active,
/// never hard-deleted in the normal flow.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Agency {
    pub id: Uuid,
    pub name: String,
    pub contact_email: String,
    pub is_active: bool,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
