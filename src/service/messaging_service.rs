use std::{collections::HashMap, sync::Arc};

use uuid::Uuid;

use crate::{
    db::{clientdb::ClientExt, db::DBClient, submissiondb::SubmissionExt},
    dtos::submissiondtos::{PostUpdateDto, UpdateWithAttachments},
    models::submissionmodel::{
        ActorContext, ActorType, AuditAction, SenderRole, UpdateAttachment,
    },
    service::{
        audit_service::AuditService,
        error::ServiceError,
        notification_service::NotificationService,
        storage_service::{content_type_for, decode_base64_payload, StorageService},
    },
};

/// The threaded conversation attached to each submission: posting updates
/// with optional attachments, reading the thread, and read-state flips.
#[derive(Debug, Clone)]
pub struct MessagingService {
    db_client: Arc<DBClient>,
    storage: Arc<StorageService>,
    audit: AuditService,
    notifications: NotificationService,
}

impl MessagingService {
    pub fn new(
        db_client: Arc<DBClient>,
        storage: Arc<StorageService>,
        audit: AuditService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            db_client,
            storage,
            audit,
            notifications,
        }
    }

    pub async fn post_update(
        &self,
        actor: &ActorContext,
        submission_id: Uuid,
        dto: &PostUpdateDto,
    ) -> Result<UpdateWithAttachments, ServiceError> {
        let submission = self
            .db_client
            .get_submission_by_id(submission_id)
            .await?
            .ok_or(ServiceError::SubmissionNotFound(submission_id))?;

        if !actor.is_participant(&submission) {
            return Err(ServiceError::NotAParticipant(submission_id));
        }

        let message = dto
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty());
        if message.is_none() && dto.attachments.is_empty() {
            return Err(ServiceError::EmptyUpdate);
        }

        // Decode and size-check everything before any row or blob is written,
        // so a bad attachment rejects the whole post cleanly.
        let mut payloads = Vec::with_capacity(dto.attachments.len());
        for attachment in &dto.attachments {
            let bytes = decode_base64_payload(&attachment.content_base64)?;
            if bytes.len() > self.storage.max_upload_bytes() {
                return Err(ServiceError::FileTooLarge(attachment.file_name.clone()));
            }
            payloads.push((attachment.file_name.as_str(), bytes));
        }

        let sender_role = actor.sender_role();
        let (sender_user_id, sender_client_id) = match sender_role {
            SenderRole::Admin => (Some(actor.actor_id), None),
            SenderRole::Client => (None, Some(actor.actor_id)),
        };

        let update = self
            .db_client
            .add_update(submission_id, sender_role, sender_user_id, sender_client_id, message)
            .await?;

        let mut stored = Vec::with_capacity(payloads.len());
        for (file_name, bytes) in payloads {
            let path = self.storage.attachment_path(submission_id, file_name);
            self.storage.upload(&path, &bytes).await?;

            // Blob write and row insert are two steps. If the insert fails
            // the blob stays behind; log it so it can be reaped.
            match self
                .db_client
                .add_attachment(
                    update.id,
                    file_name,
                    &path,
                    bytes.len() as i64,
                    content_type_for(file_name),
                )
                .await
            {
                Ok(row) => {
                    self.audit
                        .log_submission_action_best_effort(
                            submission_id,
                            actor.actor_type,
                            Some(actor.actor_id),
                            AuditAction::FileUploaded,
                            Some(file_name),
                        )
                        .await;
                    stored.push(row);
                }
                Err(e) => {
                    tracing::error!(
                        update_id = %update.id,
                        path,
                        "orphaned attachment blob, row insert failed: {e}"
                    );
                }
            }
        }

        if message.is_some() {
            self.audit
                .log_submission_action_best_effort(
                    submission_id,
                    actor.actor_type,
                    Some(actor.actor_id),
                    AuditAction::MessageSent,
                    None,
                )
                .await;
        }

        if actor.actor_type == ActorType::Client {
            let phone = self
                .db_client
                .get_client_by_id(actor.actor_id)
                .await
                .ok()
                .flatten()
                .map(|c| c.phone)
                .unwrap_or_default();
            self.notifications
                .notify_message_posted(
                    submission.agency_id,
                    actor.actor_id,
                    submission_id,
                    &phone,
                    !stored.is_empty(),
                )
                .await;
        }

        Ok(UpdateWithAttachments {
            update,
            attachments: stored,
        })
    }

    /// Full thread oldest-first, each update carrying its attachments, plus
    /// the viewer's unread count. Reading does not mark anything read.
    pub async fn get_thread(
        &self,
        actor: &ActorContext,
        submission_id: Uuid,
    ) -> Result<(Vec<UpdateWithAttachments>, i64), ServiceError> {
        let submission = self
            .db_client
            .get_submission_by_id(submission_id)
            .await?
            .ok_or(ServiceError::SubmissionNotFound(submission_id))?;

        if !actor.is_participant(&submission) {
            return Err(ServiceError::NotAParticipant(submission_id));
        }

        let updates = self.db_client.get_updates(submission_id).await?;
        let attachments = self
            .db_client
            .get_attachments_for_submission(submission_id)
            .await?;

        let mut by_update: HashMap<Uuid, Vec<UpdateAttachment>> = HashMap::new();
        for attachment in attachments {
            by_update
                .entry(attachment.update_id)
                .or_default()
                .push(attachment);
        }

        let thread = updates
            .into_iter()
            .map(|update| UpdateWithAttachments {
                attachments: by_update.remove(&update.id).unwrap_or_default(),
                update,
            })
            .collect();

        let unread = self
            .db_client
            .get_unread_count(submission_id, actor.sender_role())
            .await?;

        Ok((thread, unread))
    }

    /// Marks the other side's messages read. Idempotent: re-running flips
    /// nothing and returns zero.
    pub async fn mark_thread_read(
        &self,
        actor: &ActorContext,
        submission_id: Uuid,
    ) -> Result<u64, ServiceError> {
        let submission = self
            .db_client
            .get_submission_by_id(submission_id)
            .await?
            .ok_or(ServiceError::SubmissionNotFound(submission_id))?;

        if !actor.is_participant(&submission) {
            return Err(ServiceError::NotAParticipant(submission_id));
        }

        let flipped = self
            .db_client
            .mark_thread_read(submission_id, actor.sender_role())
            .await?;
        Ok(flipped)
    }
}
