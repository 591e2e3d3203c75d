use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::agencymodel::Agency;

#[async_trait]
pub trait AgencyExt {
    async fn create_agency(&self, name: &str, contact_email: &str) -> Result<Agency, Error>;

    async fn get_agency_by_id(&self, agency_id: Uuid) -> Result<Option<Agency>, Error>;

    async fn get_agencies(&self, limit: i64, offset: i64) -> Result<Vec<Agency>, Error>;

    /// Soft-disable; agencies are never hard-deleted in the normal flow.
    async fn set_agency_active(&self, agency_id: Uuid, is_active: bool)
        -> Result<Agency, Error>;
}

#[async_trait]
impl AgencyExt for DBClient {
    async fn create_agency(&self, name: &str, contact_email: &str) -> Result<Agency, Error> {
        sqlx::query_as::<_, Agency>(
            r#"
            INSERT INTO agencies (name, contact_email)
            VALUES ($1, $2)
            RETURNING id, name, contact_email, is_active, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(contact_email)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_agency_by_id(&self, agency_id: Uuid) -> Result<Option<Agency>, Error> {
        sqlx::query_as::<_, Agency>(
            r#"
            SELECT id, name, contact_email, is_active, created_at, updated_at
            FROM agencies
            WHERE id = $1
            "#,
        )
        .bind(agency_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_agencies(&self, limit: i64, offset: i64) -> Result<Vec<Agency>, Error> {
        sqlx::query_as::<_, Agency>(
            r#"
            SELECT id, name, contact_email, is_active, created_at, updated_at
            FROM agencies
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn set_agency_active(
        &self,
        agency_id: Uuid,
        is_active: bool,
    ) -> Result<Agency, Error> {
        sqlx::query_as::<_, Agency>(
            r#"
            UPDATE agencies
            SET is_active = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, name, contact_email, is_active, created_at, updated_at
            "#,
        )
        .bind(is_active)
        .bind(agency_id)
        .fetch_one(&self.pool)
        .await
    }
}
