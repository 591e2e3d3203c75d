use async_trait::async_trait;
use serde_json::Value;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::notificationmodel::Notification;

#[async_trait]
pub trait NotificationExt {
    #[allow(clippy::too_many_arguments)]
    async fn create_notification(
        &self,
        agency_id: Uuid,
        agent_id: Option<Uuid>,
        client_id: Option<Uuid>,
        property_id: Option<Uuid>,
        notification_type: &str,
        title: &str,
        message: &str,
        metadata: Option<Value>,
    ) -> Result<Notification, Error>;

    async fn get_notifications_for_agency(
        &self,
        agency_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, Error>;

    async fn get_notification_by_id(
        &self,
        notification_id: Uuid,
    ) -> Result<Option<Notification>, Error>;

    async fn mark_notification_read(&self, notification_id: Uuid)
        -> Result<Notification, Error>;

    async fn mark_all_notifications_read(&self, agency_id: Uuid) -> Result<u64, Error>;

    async fn get_unread_notification_count(&self, agency_id: Uuid) -> Result<i64, Error>;
}

#[async_trait]
impl NotificationExt for DBClient {
    async fn create_notification(
        &self,
        agency_id: Uuid,
        agent_id: Option<Uuid>,
        client_id: Option<Uuid>,
        property_id: Option<Uuid>,
        notification_type: &str,
        title: &str,
        message: &str,
        metadata: Option<Value>,
    ) -> Result<Notification, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (
                agency_id, agent_id, client_id, property_id, notification_type,
                title, message, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, agency_id, agent_id, client_id, property_id,
                      notification_type, title, message, metadata, is_read,
                      read_at, created_at
            "#,
        )
        .bind(agency_id)
        .bind(agent_id)
        .bind(client_id)
        .bind(property_id)
        .bind(notification_type)
        .bind(title)
        .bind(message)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_notifications_for_agency(
        &self,
        agency_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, agency_id, agent_id, client_id, property_id,
                   notification_type, title, message, metadata, is_read,
                   read_at, created_at
            FROM notifications
            WHERE agency_id = $1
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

    async fn get_notification_by_id(
        &self,
        notification_id: Uuid,
    ) -> Result<Option<Notification>, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, agency_id, agent_id, client_id, property_id,
                   notification_type, title, message, metadata, is_read,
                   read_at, created_at
            FROM notifications
            WHERE id = $1
            "#,
        )
        .bind(notification_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
    ) -> Result<Notification, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = true, read_at = NOW()
            WHERE id = $1
            RETURNING id, agency_id, agent_id, client_id, property_id,
                      notification_type, title, message, metadata, is_read,
                      read_at, created_at
            "#,
        )
        .bind(notification_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn mark_all_notifications_read(&self, agency_id: Uuid) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = true, read_at = NOW()
            WHERE agency_id = $1 AND is_read = false
            "#,
        )
        .bind(agency_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_unread_notification_count(&self, agency_id: Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM notifications
            WHERE agency_id = $1 AND is_read = false
            "#,
        )
        .bind(agency_id)
        .fetch_one(&self.pool)
        .await
    }
}
