use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, notificationdb::NotificationExt},
    models::{notificationmodel::Notification, submissionmodel::SubmissionStatus},
    service::error::ServiceError,
};

/// Fans submission events out to the owning agency's feed. Every method is
/// best-effort: a failed insert is logged and dropped, never bubbled up to
/// the write that triggered it.
#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn notify_submission_created(
        &self,
        agency_id: Uuid,
        agent_id: Option<Uuid>,
        client_id: Uuid,
        property_id: Option<Uuid>,
        submission_id: Uuid,
        property_title: Option<&str>,
        client_phone: &str,
    ) {
        // Metadata is denormalized on purpose: the feed must stay readable
        // even after the property row is deleted.
        let (title, message) = match property_title {
            Some(t) => (
                "New property submission".to_string(),
                format!("{t} was submitted by {client_phone}"),
            ),
            None => (
                "New buyer registration".to_string(),
                format!("Identity documents submitted by {client_phone}"),
            ),
        };

        self.insert(
            agency_id,
            agent_id,
            Some(client_id),
            property_id,
            "submission_created",
            &title,
            &message,
            json!({
                "submissionId": submission_id,
                "propertyTitle": property_title,
                "clientPhone": client_phone,
            }),
        )
        .await;
    }

    pub async fn notify_message_posted(
        &self,
        agency_id: Uuid,
        client_id: Uuid,
        submission_id: Uuid,
        client_phone: &str,
        has_attachments: bool,
    ) {
        let message = if has_attachments {
            format!("{client_phone} sent files on a submission")
        } else {
            format!("{client_phone} sent a message on a submission")
        };

        self.insert(
            agency_id,
            None,
            Some(client_id),
            None,
            "message_posted",
            "New client message",
            &message,
            json!({
                "submissionId": submission_id,
                "clientPhone": client_phone,
                "hasAttachments": has_attachments,
            }),
        )
        .await;
    }

    pub async fn notify_status_changed(
        &self,
        agency_id: Uuid,
        client_id: Uuid,
        submission_id: Uuid,
        status: SubmissionStatus,
        property_title: Option<&str>,
    ) {
        let subject = property_title.unwrap_or("A submission");

        self.insert(
            agency_id,
            None,
            Some(client_id),
            None,
            "status_changed",
            "Submission status updated",
            &format!("{subject} is now {}", status.to_str()),
            json!({
                "submissionId": submission_id,
                "status": status.to_str(),
                "propertyTitle": property_title,
            }),
        )
        .await;
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert(
        &self,
        agency_id: Uuid,
        agent_id: Option<Uuid>,
        client_id: Option<Uuid>,
        property_id: Option<Uuid>,
        notification_type: &str,
        title: &str,
        message: &str,
        metadata: serde_json::Value,
    ) {
        let result = self
            .db_client
            .create_notification(
                agency_id,
                agent_id,
                client_id,
                property_id,
                notification_type,
                title,
                message,
                Some(metadata),
            )
            .await;

        if let Err(e) = result {
            tracing::error!(
                agency_id = %agency_id,
                notification_type,
                "failed to insert notification: {e}"
            );
        }
    }

    pub async fn list_for_agency(
        &self,
        agency_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Notification>, i64), ServiceError> {
        let notifications = self
            .db_client
            .get_notifications_for_agency(agency_id, limit, offset)
            .await?;
        let unread = self.db_client.get_unread_notification_count(agency_id).await?;
        Ok((notifications, unread))
    }

    /// Tenant-checked read flip: the notification must belong to the caller's
    /// agency before anything changes.
    pub async fn mark_read(
        &self,
        agency_id: Uuid,
        notification_id: Uuid,
    ) -> Result<Notification, ServiceError> {
        let existing = self
            .db_client
            .get_notification_by_id(notification_id)
            .await?
            .ok_or(ServiceError::NotificationNotFound(notification_id))?;

        if existing.agency_id != agency_id {
            return Err(ServiceError::NotificationNotOwned(notification_id));
        }

        let notification = self.db_client.mark_notification_read(notification_id).await?;
        Ok(notification)
    }

    pub async fn mark_all_read(&self, agency_id: Uuid) -> Result<u64, ServiceError> {
        let updated = self.db_client.mark_all_notifications_read(agency_id).await?;
        Ok(updated)
    }
}
