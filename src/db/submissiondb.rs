use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::{
    propertymodel::PropertyType,
    submissionmodel::{
        ActorType, AuditAction, SenderRole, Submission, SubmissionAuditEntry, SubmissionStatus,
        SubmissionUpdate, UpdateAttachment,
    },
};

/// Flat row for the live-joined actor views. The property and client columns
/// are all optional: a NULL group means the relation is orphaned (or, for
/// property, an identity-only submission) and the read path decides its own
/// missing-relation policy.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmissionJoinRow {
    pub id: Uuid,
    pub property_id: Option<Uuid>,
    pub client_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub agency_id: Uuid,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub property_title: Option<String>,
    pub property_location: Option<String>,
    pub property_type: Option<PropertyType>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
}

#[async_trait]
pub trait SubmissionExt {
    async fn create_submission(
        &self,
        property_id: Option<Uuid>,
        client_id: Uuid,
        agent_id: Option<Uuid>,
        agency_id: Uuid,
    ) -> Result<Submission, Error>;

    async fn get_submission_by_id(
        &self,
        submission_id: Uuid,
    ) -> Result<Option<Submission>, Error>;

    /// Property ids the client has already submitted to this agency; used to
    /// filter duplicates before insert (no DB uniqueness constraint).
    async fn get_submitted_property_ids(
        &self,
        client_id: Uuid,
        agency_id: Uuid,
    ) -> Result<Vec<Uuid>, Error>;

    async fn set_submission_status(
        &self,
        submission_id: Uuid,
        status: SubmissionStatus,
    ) -> Result<Submission, Error>;

    async fn get_submissions_for_agency(
        &self,
        agency_id: Uuid,
    ) -> Result<Vec<SubmissionJoinRow>, Error>;

    async fn get_submissions_for_agent(
        &self,
        agent_id: Uuid,
    ) -> Result<Vec<SubmissionJoinRow>, Error>;

    async fn get_submissions_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<SubmissionJoinRow>, Error>;

    async fn add_update(
        &self,
        submission_id: Uuid,
        sender_role: SenderRole,
        sender_user_id: Option<Uuid>,
        sender_client_id: Option<Uuid>,
        message: Option<&str>,
    ) -> Result<SubmissionUpdate, Error>;

    /// Oldest first, chat-log style.
    async fn get_updates(&self, submission_id: Uuid) -> Result<Vec<SubmissionUpdate>, Error>;

    async fn add_attachment(
        &self,
        update_id: Uuid,
        file_name: &str,
        file_path: &str,
        file_size: i64,
        mime_type: &str,
    ) -> Result<UpdateAttachment, Error>;

    async fn get_attachments_for_submission(
        &self,
        submission_id: Uuid,
    ) -> Result<Vec<UpdateAttachment>, Error>;

    async fn get_attachment_by_path(
        &self,
        file_path: &str,
    ) -> Result<Option<UpdateAttachment>, Error>;

    /// The submission an update belongs to; used to authorize file access by
    /// attachment path.
    async fn get_submission_of_update(
        &self,
        update_id: Uuid,
    ) -> Result<Option<Submission>, Error>;

    /// Flips is_read on updates sent by the role opposite the reader.
    /// Idempotent; never flips true back to false.
    async fn mark_thread_read(
        &self,
        submission_id: Uuid,
        reader_role: SenderRole,
    ) -> Result<u64, Error>;

    async fn get_unread_count(
        &self,
        submission_id: Uuid,
        viewer_role: SenderRole,
    ) -> Result<i64, Error>;

    /// Whether the agency has any submission touching this client (and, when
    /// given, this property). Gates staff access to stored documents.
    async fn agency_has_submission_for(
        &self,
        agency_id: Uuid,
        client_id: Uuid,
        property_id: Option<Uuid>,
    ) -> Result<bool, Error>;

    /// Append-only. There is deliberately no update/delete counterpart.
    async fn add_audit_entry(
        &self,
        submission_id: Uuid,
        actor_type: ActorType,
        actor_id: Option<Uuid>,
        action: AuditAction,
        file_name: Option<&str>,
    ) -> Result<SubmissionAuditEntry, Error>;

    /// Newest first for display; the underlying log is append-time ordered.
    async fn get_audit_trail(
        &self,
        submission_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SubmissionAuditEntry>, Error>;
}

const JOIN_VIEW_SELECT: &str = r#"
    SELECT s.id, s.property_id, s.client_id, s.agent_id, s.agency_id, s.status,
           s.created_at,
           p.title AS property_title, p.location AS property_location,
           p.property_type AS property_type,
           c.full_name AS client_name, c.phone AS client_phone,
           c.email AS client_email
    FROM submissions s
    LEFT JOIN properties p ON p.id = s.property_id
    LEFT JOIN clients c ON c.id = s.client_id
"#;

#[async_trait]
impl SubmissionExt for DBClient {
    async fn create_submission(
        &self,
        property_id: Option<Uuid>,
        client_id: Uuid,
        agent_id: Option<Uuid>,
        agency_id: Uuid,
    ) -> Result<Submission, Error> {
        sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (property_id, client_id, agent_id, agency_id, status)
            VALUES ($1, $2, $3, $4, 'submitted'::submission_status)
            RETURNING id, property_id, client_id, agent_id, agency_id, status, created_at
            "#,
        )
        .bind(property_id)
        .bind(client_id)
        .bind(agent_id)
        .bind(agency_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_submission_by_id(
        &self,
        submission_id: Uuid,
    ) -> Result<Option<Submission>, Error> {
        sqlx::query_as::<_, Submission>(
            r#"
            SELECT id, property_id, client_id, agent_id, agency_id, status, created_at
            FROM submissions
            WHERE id = $1
            "#,
        )
        .bind(submission_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_submitted_property_ids(
        &self,
        client_id: Uuid,
        agency_id: Uuid,
    ) -> Result<Vec<Uuid>, Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT property_id
            FROM submissions
            WHERE client_id = $1 AND agency_id = $2 AND property_id IS NOT NULL
            "#,
        )
        .bind(client_id)
        .bind(agency_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn set_submission_status(
        &self,
        submission_id: Uuid,
        status: SubmissionStatus,
    ) -> Result<Submission, Error> {
        // Updates the submission row only; the property's own status is
        // independently mutable and must not be cascaded here.
        sqlx::query_as::<_, Submission>(
            r#"
            UPDATE submissions
            SET status = $1
            WHERE id = $2
            RETURNING id, property_id, client_id, agent_id, agency_id, status, created_at
            "#,
        )
        .bind(status)
        .bind(submission_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_submissions_for_agency(
        &self,
        agency_id: Uuid,
    ) -> Result<Vec<SubmissionJoinRow>, Error> {
        sqlx::query_as::<_, SubmissionJoinRow>(&format!(
            "{JOIN_VIEW_SELECT} WHERE s.agency_id = $1 ORDER BY s.created_at DESC"
        ))
        .bind(agency_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_submissions_for_agent(
        &self,
        agent_id: Uuid,
    ) -> Result<Vec<SubmissionJoinRow>, Error> {
        sqlx::query_as::<_, SubmissionJoinRow>(&format!(
            "{JOIN_VIEW_SELECT} WHERE s.agent_id = $1 ORDER BY s.created_at DESC"
        ))
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_submissions_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<SubmissionJoinRow>, Error> {
        sqlx::query_as::<_, SubmissionJoinRow>(&format!(
            "{JOIN_VIEW_SELECT} WHERE s.client_id = $1 ORDER BY s.created_at DESC"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn add_update(
        &self,
        submission_id: Uuid,
        sender_role: SenderRole,
        sender_user_id: Option<Uuid>,
        sender_client_id: Option<Uuid>,
        message: Option<&str>,
    ) -> Result<SubmissionUpdate, Error> {
        sqlx::query_as::<_, SubmissionUpdate>(
            r#"
            INSERT INTO submission_updates
                (submission_id, sender_role, sender_user_id, sender_client_id, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, submission_id, sender_role, sender_user_id,
                      sender_client_id, message, is_read, created_at
            "#,
        )
        .bind(submission_id)
        .bind(sender_role)
        .bind(sender_user_id)
        .bind(sender_client_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_updates(&self, submission_id: Uuid) -> Result<Vec<SubmissionUpdate>, Error> {
        sqlx::query_as::<_, SubmissionUpdate>(
            r#"
            SELECT id, submission_id, sender_role, sender_user_id,
                   sender_client_id, message, is_read, created_at
            FROM submission_updates
            WHERE submission_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn add_attachment(
        &self,
        update_id: Uuid,
        file_name: &str,
        file_path: &str,
        file_size: i64,
        mime_type: &str,
    ) -> Result<UpdateAttachment, Error> {
        sqlx::query_as::<_, UpdateAttachment>(
            r#"
            INSERT INTO update_attachments
                (update_id, file_name, file_path, file_size, mime_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, update_id, file_name, file_path, file_size, mime_type,
                      created_at
            "#,
        )
        .bind(update_id)
        .bind(file_name)
        .bind(file_path)
        .bind(file_size)
        .bind(mime_type)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_attachments_for_submission(
        &self,
        submission_id: Uuid,
    ) -> Result<Vec<UpdateAttachment>, Error> {
        sqlx::query_as::<_, UpdateAttachment>(
            r#"
            SELECT a.id, a.update_id, a.file_name, a.file_path, a.file_size,
                   a.mime_type, a.created_at
            FROM update_attachments a
            INNER JOIN submission_updates u ON u.id = a.update_id
            WHERE u.submission_id = $1
            ORDER BY a.created_at ASC
            "#,
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_attachment_by_path(
        &self,
        file_path: &str,
    ) -> Result<Option<UpdateAttachment>, Error> {
        sqlx::query_as::<_, UpdateAttachment>(
            r#"
            SELECT id, update_id, file_name, file_path, file_size, mime_type,
                   created_at
            FROM update_attachments
            WHERE file_path = $1
            "#,
        )
        .bind(file_path)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_submission_of_update(
        &self,
        update_id: Uuid,
    ) -> Result<Option<Submission>, Error> {
        sqlx::query_as::<_, Submission>(
            r#"
            SELECT s.id, s.property_id, s.client_id, s.agent_id, s.agency_id,
                   s.status, s.created_at
            FROM submissions s
            INNER JOIN submission_updates u ON u.submission_id = s.id
            WHERE u.id = $1
            "#,
        )
        .bind(update_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn mark_thread_read(
        &self,
        submission_id: Uuid,
        reader_role: SenderRole,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE submission_updates
            SET is_read = true
            WHERE submission_id = $1
              AND sender_role = $2
              AND is_read = false
            "#,
        )
        .bind(submission_id)
        .bind(reader_role.opposite())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_unread_count(
        &self,
        submission_id: Uuid,
        viewer_role: SenderRole,
    ) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM submission_updates
            WHERE submission_id = $1
              AND sender_role = $2
              AND is_read = false
            "#,
        )
        .bind(submission_id)
        .bind(viewer_role.opposite())
        .fetch_one(&self.pool)
        .await
    }

    async fn agency_has_submission_for(
        &self,
        agency_id: Uuid,
        client_id: Uuid,
        property_id: Option<Uuid>,
    ) -> Result<bool, Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM submissions
                WHERE agency_id = $1
                  AND client_id = $2
                  AND ($3::uuid IS NULL OR property_id = $3)
            )
            "#,
        )
        .bind(agency_id)
        .bind(client_id)
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn add_audit_entry(
        &self,
        submission_id: Uuid,
        actor_type: ActorType,
        actor_id: Option<Uuid>,
        action: AuditAction,
        file_name: Option<&str>,
    ) -> Result<SubmissionAuditEntry, Error> {
        sqlx::query_as::<_, SubmissionAuditEntry>(
            r#"
            INSERT INTO submission_audit_log
                (submission_id, actor_type, actor_id, action, file_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, submission_id, actor_type, actor_id, action, file_name,
                      created_at
            "#,
        )
        .bind(submission_id)
        .bind(actor_type)
        .bind(actor_id)
        .bind(action)
        .bind(file_name)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_audit_trail(
        &self,
        submission_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SubmissionAuditEntry>, Error> {
        sqlx::query_as::<_, SubmissionAuditEntry>(
            r#"
            SELECT id, submission_id, actor_type, actor_id, action, file_name,
                   created_at
            FROM submission_audit_log
            WHERE submission_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(submission_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}
