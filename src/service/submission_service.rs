use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{
        agencydb::AgencyExt,
        db::DBClient,
        propertydb::PropertyExt,
        submissiondb::{SubmissionExt, SubmissionJoinRow},
    },
    dtos::submissiondtos::{CreateSubmissionsDto, PropertySnapshot, SubmissionView},
    models::{
        clientmodel::Client,
        propertymodel::PropertyStatus,
        submissionmodel::{
            ActorContext, ActorType, AuditAction, SenderRole, Submission, SubmissionStatus,
        },
    },
    service::{
        audit_service::AuditService, error::ServiceError,
        notification_service::NotificationService,
    },
};

/// What a list view does with a submission whose property row no longer
/// exists. Staff dashboards drop them; clients get a placeholder so their
/// history never silently shrinks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingRelationPolicy {
    FilterOut,
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct CreateSubmissionsOutcome {
    pub submissions: Vec<Submission>,
    /// Properties skipped because they were already submitted to this agency.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct SubmissionService {
    db_client: Arc<DBClient>,
    audit: AuditService,
    notifications: NotificationService,
}

impl SubmissionService {
    pub fn new(
        db_client: Arc<DBClient>,
        audit: AuditService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            db_client,
            audit,
            notifications,
        }
    }

    /// Hands a batch of portfolio properties to an agency. Each property gets
    /// its own submission row; already-submitted properties are skipped, not
    /// rejected, so a retried request is harmless.
    pub async fn create_submissions(
        &self,
        client: &Client,
        dto: &CreateSubmissionsDto,
    ) -> Result<CreateSubmissionsOutcome, ServiceError> {
        let agency = self
            .db_client
            .get_agency_by_id(dto.agency_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or(ServiceError::AgencyUnavailable(dto.agency_id))?;

        let already_submitted = self
            .db_client
            .get_submitted_property_ids(client.id, agency.id)
            .await?;

        let mut submissions = Vec::new();
        let mut skipped = 0usize;

        for property_id in &dto.property_ids {
            if already_submitted.contains(property_id) {
                skipped += 1;
                continue;
            }

            let property = self
                .db_client
                .get_property_by_id(*property_id)
                .await?
                .ok_or(ServiceError::PropertyNotFound(*property_id))?;

            if property.client_id != client.id {
                return Err(ServiceError::PropertyNotOwned(*property_id));
            }
            if property.status != PropertyStatus::InPortfolio {
                return Err(ServiceError::PropertyNotInPortfolio(*property_id));
            }

            let submission = self
                .db_client
                .create_submission(Some(property.id), client.id, dto.agent_id, agency.id)
                .await?;

            self.db_client
                .update_property_status(property.id, PropertyStatus::Submitted)
                .await?;

            // Audit and notification are side channels: their failure must
            // never undo the submission that already exists.
            self.audit
                .log_submission_action_best_effort(
                    submission.id,
                    ActorType::Client,
                    Some(client.id),
                    AuditAction::Submitted,
                    None,
                )
                .await;

            self.notifications
                .notify_submission_created(
                    agency.id,
                    dto.agent_id,
                    client.id,
                    Some(property.id),
                    submission.id,
                    Some(&property.title),
                    &client.phone,
                )
                .await;

            submissions.push(submission);
        }

        Ok(CreateSubmissionsOutcome {
            submissions,
            skipped,
        })
    }

    /// Buyer registration: a submission with no property, carried by the
    /// client's identity documents. Requires at least one on file.
    pub async fn create_identity_submission(
        &self,
        client: &Client,
        agency_id: Uuid,
        agent_id: Option<Uuid>,
    ) -> Result<Submission, ServiceError> {
        let agency = self
            .db_client
            .get_agency_by_id(agency_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or(ServiceError::AgencyUnavailable(agency_id))?;

        let identity_documents = self
            .db_client
            .get_identity_documents_for_client(client.id)
            .await?;
        if identity_documents.is_empty() {
            return Err(ServiceError::NoIdentityDocuments);
        }

        let submission = self
            .db_client
            .create_submission(None, client.id, agent_id, agency.id)
            .await?;

        self.audit
            .log_submission_action_best_effort(
                submission.id,
                ActorType::Client,
                Some(client.id),
                AuditAction::IdDocumentsSubmitted,
                None,
            )
            .await;

        self.notifications
            .notify_submission_created(
                agency.id,
                agent_id,
                client.id,
                None,
                submission.id,
                None,
                &client.phone,
            )
            .await;

        Ok(submission)
    }

    /// Staff-driven status change. The property's own status is deliberately
    /// left alone: a rejected submission does not un-submit the property.
    pub async fn transition_status(
        &self,
        actor: &ActorContext,
        submission_id: Uuid,
        new_status: SubmissionStatus,
    ) -> Result<Submission, ServiceError> {
        let submission = self
            .db_client
            .get_submission_by_id(submission_id)
            .await?
            .ok_or(ServiceError::SubmissionNotFound(submission_id))?;

        if !actor.is_participant(&submission) {
            return Err(ServiceError::NotAParticipant(submission_id));
        }

        if !is_valid_transition(submission.status, new_status) {
            return Err(ServiceError::InvalidStatusTransition(
                submission_id,
                submission.status,
                new_status,
            ));
        }

        let updated = self
            .db_client
            .set_submission_status(submission_id, new_status)
            .await?;

        self.audit
            .log_submission_action_best_effort(
                submission_id,
                actor.actor_type,
                Some(actor.actor_id),
                AuditAction::StatusChanged,
                None,
            )
            .await;

        let property_title = match submission.property_id {
            Some(pid) => self
                .db_client
                .get_property_by_id(pid)
                .await
                .ok()
                .flatten()
                .map(|p| p.title),
            None => None,
        };

        self.notifications
            .notify_status_changed(
                submission.agency_id,
                submission.client_id,
                submission_id,
                new_status,
                property_title.as_deref(),
            )
            .await;

        Ok(updated)
    }

    pub async fn get_submission_for_actor(
        &self,
        actor: &ActorContext,
        submission_id: Uuid,
    ) -> Result<Submission, ServiceError> {
        let submission = self
            .db_client
            .get_submission_by_id(submission_id)
            .await?
            .ok_or(ServiceError::SubmissionNotFound(submission_id))?;

        if !actor.is_participant(&submission) {
            return Err(ServiceError::NotAParticipant(submission_id));
        }
        Ok(submission)
    }

    pub async fn list_for_agency(&self, agency_id: Uuid) -> Result<Vec<SubmissionView>, ServiceError> {
        let rows = self.db_client.get_submissions_for_agency(agency_id).await?;
        self.build_views(rows, SenderRole::Admin, MissingRelationPolicy::FilterOut)
            .await
    }

    pub async fn list_for_agent(&self, agent_id: Uuid) -> Result<Vec<SubmissionView>, ServiceError> {
        let rows = self.db_client.get_submissions_for_agent(agent_id).await?;
        self.build_views(rows, SenderRole::Admin, MissingRelationPolicy::FilterOut)
            .await
    }

    pub async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<SubmissionView>, ServiceError> {
        let rows = self.db_client.get_submissions_for_client(client_id).await?;
        self.build_views(rows, SenderRole::Client, MissingRelationPolicy::Placeholder)
            .await
    }

    async fn build_views(
        &self,
        rows: Vec<SubmissionJoinRow>,
        viewer: SenderRole,
        policy: MissingRelationPolicy,
    ) -> Result<Vec<SubmissionView>, ServiceError> {
        let mut views = Vec::with_capacity(rows.len());

        for row in &rows {
            let unread = self.db_client.get_unread_count(row.id, viewer).await?;
            let mut view = SubmissionView::from_row(row, unread);

            if view.has_orphaned_property() {
                match policy {
                    MissingRelationPolicy::FilterOut => continue,
                    MissingRelationPolicy::Placeholder => {
                        view.property = Some(PropertySnapshot::placeholder());
                    }
                }
            }
            views.push(view);
        }

        Ok(views)
    }
}

/// Submitted may move anywhere; under_review may resolve; approved and
/// rejected are terminal.
pub fn is_valid_transition(from: SubmissionStatus, to: SubmissionStatus) -> bool {
    use SubmissionStatus::*;
    match from {
        Submitted => matches!(to, UnderReview | Approved | Rejected),
        UnderReview => matches!(to, Approved | Rejected),
        Approved | Rejected => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        use SubmissionStatus::*;
        assert!(is_valid_transition(Submitted, UnderReview));
        assert!(is_valid_transition(Submitted, Approved));
        assert!(is_valid_transition(Submitted, Rejected));
        assert!(is_valid_transition(UnderReview, Approved));
        assert!(is_valid_transition(UnderReview, Rejected));
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        use SubmissionStatus::*;
        assert!(!is_valid_transition(Approved, Rejected));
        assert!(!is_valid_transition(Rejected, UnderReview));
        assert!(!is_valid_transition(Approved, Submitted));
        // No-op transitions are rejected too
        assert!(!is_valid_transition(UnderReview, UnderReview));
    }
}
