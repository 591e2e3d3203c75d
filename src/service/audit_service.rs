use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::{
    db::{auditdb::AuditExt, db::DBClient, submissiondb::SubmissionExt},
    models::{
        auditmodel::AuditLog,
        submissionmodel::{ActorType, AuditAction, SubmissionAuditEntry},
    },
    service::error::ServiceError,
};

/// Writes to the two audit surfaces: the typed, append-only per-submission
/// trail shown to agencies, and the free-form operational log.
#[derive(Debug, Clone)]
pub struct AuditService {
    db_client: Arc<DBClient>,
}

impl AuditService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn log_submission_action(
        &self,
        submission_id: Uuid,
        actor_type: ActorType,
        actor_id: Option<Uuid>,
        action: AuditAction,
        file_name: Option<&str>,
    ) -> Result<SubmissionAuditEntry, ServiceError> {
        let entry = self
            .db_client
            .add_audit_entry(submission_id, actor_type, actor_id, action, file_name)
            .await?;
        Ok(entry)
    }

    /// Same as `log_submission_action` but swallows the error after logging
    /// it; used on paths where the primary write must not be rolled back by
    /// a failed audit insert.
    pub async fn log_submission_action_best_effort(
        &self,
        submission_id: Uuid,
        actor_type: ActorType,
        actor_id: Option<Uuid>,
        action: AuditAction,
        file_name: Option<&str>,
    ) {
        if let Err(e) = self
            .log_submission_action(submission_id, actor_type, actor_id, action, file_name)
            .await
        {
            tracing::error!(
                submission_id = %submission_id,
                action = action.to_str(),
                "failed to write submission audit entry: {e}"
            );
        }
    }

    pub async fn log_event(
        &self,
        agency_id: Option<Uuid>,
        actor_id: Option<Uuid>,
        actor_kind: Option<&str>,
        event_type: &str,
        description: &str,
        metadata: Option<Value>,
    ) -> Result<AuditLog, ServiceError> {
        let log = self
            .db_client
            .record_event(agency_id, actor_id, actor_kind, event_type, description, metadata)
            .await?;
        Ok(log)
    }

    pub async fn log_event_best_effort(
        &self,
        agency_id: Option<Uuid>,
        actor_id: Option<Uuid>,
        actor_kind: Option<&str>,
        event_type: &str,
        description: &str,
        metadata: Option<Value>,
    ) {
        if let Err(e) = self
            .log_event(agency_id, actor_id, actor_kind, event_type, description, metadata)
            .await
        {
            tracing::error!(event_type, "failed to write audit log: {e}");
        }
    }

    /// Operational log reader, newest first. A None agency returns events
    /// across all agencies.
    pub async fn get_events(
        &self,
        agency_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditLog>, ServiceError> {
        let events = self.db_client.get_events(agency_id, limit, offset).await?;
        Ok(events)
    }

    pub async fn get_submission_trail(
        &self,
        submission_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SubmissionAuditEntry>, ServiceError> {
        let entries = self
            .db_client
            .get_audit_trail(submission_id, limit, offset)
            .await?;
        Ok(entries)
    }
}
