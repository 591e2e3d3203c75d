use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// End-user (property owner / buyer). Authenticated by phone + OTP rather than
/// password; the row is created on first OTP request. `otp_code`/`otp_expires_at`
/// are transient and cleared on successful verification. `updated_at` is also the
/// clock for the per-phone OTP resend cooldown.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Client {
    pub id: Uuid,
    pub phone: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub onboarding_complete: bool,
    pub agent_id: Option<Uuid>,
    pub agency_id: Option<Uuid>,
    pub referral_token: Option<String>,

    #[serde(skip_serializing)]
    pub otp_code: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub session_token: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
