use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::clientmodel::Client;

#[async_trait]
pub trait ClientExt {
    /// Fetch the client row for a phone number, creating it on first contact.
    /// Referral linkage (agent/agency) is captured only at creation time.
    async fn get_or_create_client(
        &self,
        phone: &str,
        agent_id: Option<Uuid>,
        agency_id: Option<Uuid>,
        referral_token: Option<&str>,
    ) -> Result<Client, Error>;

    async fn get_client_by_id(&self, client_id: Uuid) -> Result<Option<Client>, Error>;

    async fn get_client_by_phone(&self, phone: &str) -> Result<Option<Client>, Error>;

    async fn get_client_by_session_token(&self, token: &str) -> Result<Option<Client>, Error>;

    /// Store a fresh OTP with its expiry. Also bumps updated_at, which is the
    /// per-phone resend rate-limit clock.
    async fn set_client_otp(
        &self,
        client_id: Uuid,
        otp_code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Client, Error>;

    /// Clear the OTP and install a new session token in one statement, so a
    /// used code can never be replayed.
    async fn consume_otp(&self, client_id: Uuid, session_token: &str) -> Result<Client, Error>;

    async fn update_client_profile(
        &self,
        client_id: Uuid,
        full_name: Option<&str>,
        email: Option<&str>,
        onboarding_complete: Option<bool>,
    ) -> Result<Client, Error>;
}

#[async_trait]
impl ClientExt for DBClient {
    async fn get_or_create_client(
        &self,
        phone: &str,
        agent_id: Option<Uuid>,
        agency_id: Option<Uuid>,
        referral_token: Option<&str>,
    ) -> Result<Client, Error> {
        if let Some(existing) = self.get_client_by_phone(phone).await? {
            return Ok(existing);
        }

        sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (phone, agent_id, agency_id, referral_token)
            VALUES ($1, $2, $3, $4)
            RETURNING id, phone, full_name, email, onboarding_complete, agent_id,
                      agency_id, referral_token, otp_code, otp_expires_at,
                      session_token, created_at, updated_at
            "#,
        )
        .bind(phone)
        .bind(agent_id)
        .bind(agency_id)
        .bind(referral_token)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_client_by_id(&self, client_id: Uuid) -> Result<Option<Client>, Error> {
        sqlx::query_as::<_, Client>(
            r#"
            SELECT id, phone, full_name, email, onboarding_complete, agent_id,
                   agency_id, referral_token, otp_code, otp_expires_at,
                   session_token, created_at, updated_at
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_client_by_phone(&self, phone: &str) -> Result<Option<Client>, Error> {
        sqlx::query_as::<_, Client>(
            r#"
            SELECT id, phone, full_name, email, onboarding_complete, agent_id,
                   agency_id, referral_token, otp_code, otp_expires_at,
                   session_token, created_at, updated_at
            FROM clients
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_client_by_session_token(&self, token: &str) -> Result<Option<Client>, Error> {
        sqlx::query_as::<_, Client>(
            r#"
            SELECT id, phone, full_name, email, onboarding_complete, agent_id,
                   agency_id, referral_token, otp_code, otp_expires_at,
                   session_token, created_at, updated_at
            FROM clients
            WHERE session_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
    }

    async fn set_client_otp(
        &self,
        client_id: Uuid,
        otp_code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Client, Error> {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET otp_code = $1, otp_expires_at = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, phone, full_name, email, onboarding_complete, agent_id,
                      agency_id, referral_token, otp_code, otp_expires_at,
                      session_token, created_at, updated_at
            "#,
        )
        .bind(otp_code)
        .bind(expires_at)
        .bind(client_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn consume_otp(&self, client_id: Uuid, session_token: &str) -> Result<Client, Error> {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET otp_code = NULL, otp_expires_at = NULL, session_token = $1,
                updated_at = NOW()
            WHERE id = $2
            RETURNING id, phone, full_name, email, onboarding_complete, agent_id,
                      agency_id, referral_token, otp_code, otp_expires_at,
                      session_token, created_at, updated_at
            "#,
        )
        .bind(session_token)
        .bind(client_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_client_profile(
        &self,
        client_id: Uuid,
        full_name: Option<&str>,
        email: Option<&str>,
        onboarding_complete: Option<bool>,
    ) -> Result<Client, Error> {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET full_name = COALESCE($1, full_name),
                email = COALESCE($2, email),
                onboarding_complete = COALESCE($3, onboarding_complete),
                updated_at = NOW()
            WHERE id = $4
            RETURNING id, phone, full_name, email, onboarding_complete, agent_id,
                      agency_id, referral_token, otp_code, otp_expires_at,
                      session_token, created_at, updated_at
            "#,
        )
        .bind(full_name)
        .bind(email)
        .bind(onboarding_complete)
        .bind(client_id)
        .fetch_one(&self.pool)
        .await
    }
}
