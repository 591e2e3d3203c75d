use async_trait::async_trait;
use serde_json::Value;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::auditmodel::AuditLog;

#[async_trait]
pub trait AuditExt {
    async fn record_event(
        &self,
        agency_id: Option<Uuid>,
        actor_id: Option<Uuid>,
        actor_kind: Option<&str>,
        event_type: &str,
        description: &str,
        metadata: Option<Value>,
    ) -> Result<AuditLog, Error>;

    async fn get_events(
        &self,
        agency_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLog>, Error>;
}

#[async_trait]
impl AuditExt for DBClient {
    async fn record_event(
        &self,
        agency_id: Option<Uuid>,
        actor_id: Option<Uuid>,
        actor_kind: Option<&str>,
        event_type: &str,
        description: &str,
        metadata: Option<Value>,
    ) -> Result<AuditLog, Error> {
        sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (agency_id, actor_id, actor_kind, event_type,
                                    description, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, agency_id, actor_id, actor_kind, event_type,
                      description, metadata, created_at
            "#,
        )
        .bind(agency_id)
        .bind(actor_id)
        .bind(actor_kind)
        .bind(event_type)
        .bind(description)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_events(
        &self,
        agency_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLog>, Error> {
        sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT id, agency_id, actor_id, actor_kind, event_type, description,
                   metadata, created_at
            FROM audit_logs
            WHERE ($1::uuid IS NULL OR agency_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(agency_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}
