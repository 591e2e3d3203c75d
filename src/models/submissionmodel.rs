use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "submission_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn to_str(&self) -> &str {
        match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::UnderReview => "under_review",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

/// Links a property (or nothing, for identity-only buyer registrations) to one
/// agency and optionally one agent, for one client. Never deleted.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Submission {
    pub id: Uuid,
    pub property_id: Option<Uuid>,
    pub client_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub agency_id: Uuid,
    pub status: SubmissionStatus,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "sender_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    Admin,
    Client,
}

impl SenderRole {
    pub fn to_str(&self) -> &str {
        match self {
            SenderRole::Admin => "admin",
            SenderRole::Client => "client",
        }
    }

    /// The role on the other side of the thread.
    pub fn opposite(&self) -> SenderRole {
        match self {
            SenderRole::Admin => SenderRole::Client,
            SenderRole::Client => SenderRole::Admin,
        }
    }
}

/// One message in a submission's thread. Exactly one of sender_user_id /
/// sender_client_id is set, matching sender_role. Read state is flipped by the
/// opposite party's mark-read call, never by the sender.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct SubmissionUpdate {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub sender_role: SenderRole,
    pub sender_user_id: Option<Uuid>,
    pub sender_client_id: Option<Uuid>,
    pub message: Option<String>,
    pub is_read: bool,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct UpdateAttachment {
    pub id: Uuid,
    pub update_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "actor_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    Client,
    Agent,
    AgencyAdmin,
}

impl ActorType {
    pub fn to_str(&self) -> &str {
        match self {
            ActorType::Client => "client",
            ActorType::Agent => "agent",
            ActorType::AgencyAdmin => "agency_admin",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "audit_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Submitted,
    ViewedFile,
    DownloadedFile,
    MessageSent,
    FileUploaded,
    IdDocumentsSubmitted,
    StatusChanged,
}

impl AuditAction {
    pub fn to_str(&self) -> &str {
        match self {
            AuditAction::Submitted => "submitted",
            AuditAction::ViewedFile => "viewed_file",
            AuditAction::DownloadedFile => "downloaded_file",
            AuditAction::MessageSent => "message_sent",
            AuditAction::FileUploaded => "file_uploaded",
            AuditAction::IdDocumentsSubmitted => "id_documents_submitted",
            AuditAction::StatusChanged => "status_changed",
        }
    }
}

/// Who is performing an operation, resolved once by the auth middleware and
/// passed explicitly through every service call. There is no ambient actor.
#[derive(Debug, Clone, Copy)]
pub struct ActorContext {
    pub actor_type: ActorType,
    pub actor_id: Uuid,
    /// Tenant scope. None for the super admin and for clients that have not
    /// been linked to an agency yet.
    pub agency_id: Option<Uuid>,
    pub is_super_admin: bool,
}

impl ActorContext {
    pub fn sender_role(&self) -> SenderRole {
        match self.actor_type {
            ActorType::Client => SenderRole::Client,
            ActorType::Agent | ActorType::AgencyAdmin => SenderRole::Admin,
        }
    }

    /// Whether this actor may read or write a given submission's thread.
    pub fn is_participant(&self, submission: &Submission) -> bool {
        if self.is_super_admin {
            return true;
        }
        match self.actor_type {
            ActorType::Client => submission.client_id == self.actor_id,
            ActorType::Agent => {
                submission.agent_id == Some(self.actor_id)
                    || self.agency_id == Some(submission.agency_id)
            }
            ActorType::AgencyAdmin => self.agency_id == Some(submission.agency_id),
        }
    }
}

/// Append-only compliance record of who touched a submission and when.
/// Nothing in this crate updates or deletes these rows after insert.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct SubmissionAuditEntry {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub actor_type: ActorType,
    pub actor_id: Option<Uuid>,
    pub action: AuditAction,
    pub file_name: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Derived, never stored: updates the viewer has not read yet, i.e. unread
/// messages sent by the opposite role.
pub fn unread_count_for(updates: &[SubmissionUpdate], viewer: SenderRole) -> usize {
    updates
        .iter()
        .filter(|u| !u.is_read && u.sender_role == viewer.opposite())
        .count()
}

/// The read-state contract of a mark-read call, in memory: only the opposite
/// role's unread rows flip, so repeating the call changes nothing and a read
/// row can never become unread again. Returns how many rows flipped.
pub fn apply_mark_read(updates: &mut [SubmissionUpdate], reader: SenderRole) -> usize {
    let mut flipped = 0;
    for update in updates.iter_mut() {
        if update.sender_role == reader.opposite() && !update.is_read {
            update.is_read = true;
            flipped += 1;
        }
    }
    flipped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(sender: SenderRole, is_read: bool) -> SubmissionUpdate {
        SubmissionUpdate {
            id: Uuid::new_v4(),
            submission_id: Uuid::new_v4(),
            sender_role: sender,
            sender_user_id: (sender == SenderRole::Admin).then(Uuid::new_v4),
            sender_client_id: (sender == SenderRole::Client).then(Uuid::new_v4),
            message: Some("hello".to_string()),
            is_read,
            created_at: Utc::now(),
        }
    }

    fn submission(client_id: Uuid, agency_id: Uuid, agent_id: Option<Uuid>) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            property_id: None,
            client_id,
            agent_id,
            agency_id,
            status: SubmissionStatus::Submitted,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_participant_checks() {
        let client_id = Uuid::new_v4();
        let agency_id = Uuid::new_v4();
        let agent_id = Uuid::new_v4();
        let s = submission(client_id, agency_id, Some(agent_id));

        let owner = ActorContext {
            actor_type: ActorType::Client,
            actor_id: client_id,
            agency_id: None,
            is_super_admin: false,
        };
        assert!(owner.is_participant(&s));

        let other_client = ActorContext {
            actor_id: Uuid::new_v4(),
            ..owner
        };
        assert!(!other_client.is_participant(&s));

        let assigned_agent = ActorContext {
            actor_type: ActorType::Agent,
            actor_id: agent_id,
            agency_id: Some(agency_id),
            is_super_admin: false,
        };
        assert!(assigned_agent.is_participant(&s));

        let foreign_admin = ActorContext {
            actor_type: ActorType::AgencyAdmin,
            actor_id: Uuid::new_v4(),
            agency_id: Some(Uuid::new_v4()),
            is_super_admin: false,
        };
        assert!(!foreign_admin.is_participant(&s));

        let super_admin = ActorContext {
            is_super_admin: true,
            ..foreign_admin
        };
        assert!(super_admin.is_participant(&s));
    }

    #[test]
    fn test_sender_role_from_actor() {
        let base = ActorContext {
            actor_type: ActorType::Client,
            actor_id: Uuid::new_v4(),
            agency_id: None,
            is_super_admin: false,
        };
        assert_eq!(base.sender_role(), SenderRole::Client);

        let agent = ActorContext {
            actor_type: ActorType::Agent,
            ..base
        };
        assert_eq!(agent.sender_role(), SenderRole::Admin);
    }

    #[test]
    fn test_opposite_role() {
        assert_eq!(SenderRole::Admin.opposite(), SenderRole::Client);
        assert_eq!(SenderRole::Client.opposite(), SenderRole::Admin);
    }

    #[test]
    fn test_unread_count_ignores_own_messages() {
        let updates = vec![
            update(SenderRole::Admin, false),
            update(SenderRole::Admin, false),
            update(SenderRole::Client, false),
        ];

        // Client sees only the two unread admin messages
        assert_eq!(unread_count_for(&updates, SenderRole::Client), 2);
        // Admin sees only the one unread client message
        assert_eq!(unread_count_for(&updates, SenderRole::Admin), 1);
    }

    #[test]
    fn test_unread_count_excludes_read_messages() {
        let updates = vec![
            update(SenderRole::Admin, true),
            update(SenderRole::Admin, false),
        ];
        assert_eq!(unread_count_for(&updates, SenderRole::Client), 1);
    }

    #[test]
    fn test_mark_read_flips_only_opposite_unread() {
        let mut updates = vec![
            update(SenderRole::Admin, false),
            update(SenderRole::Admin, true),
            update(SenderRole::Client, false),
        ];

        let flipped = apply_mark_read(&mut updates, SenderRole::Client);
        assert_eq!(flipped, 1);
        // Admin rows all read now; the client's own unread row is untouched.
        assert!(updates[0].is_read);
        assert!(updates[1].is_read);
        assert!(!updates[2].is_read);
        assert_eq!(unread_count_for(&updates, SenderRole::Client), 0);
        assert_eq!(unread_count_for(&updates, SenderRole::Admin), 1);
    }

    #[test]
    fn test_mark_read_is_idempotent_and_never_unreads() {
        let mut updates = vec![
            update(SenderRole::Admin, false),
            update(SenderRole::Admin, false),
        ];

        assert_eq!(apply_mark_read(&mut updates, SenderRole::Client), 2);
        let after_first: Vec<bool> = updates.iter().map(|u| u.is_read).collect();

        // Re-running flips nothing and no row moves back to unread.
        assert_eq!(apply_mark_read(&mut updates, SenderRole::Client), 0);
        let after_second: Vec<bool> = updates.iter().map(|u| u.is_read).collect();
        assert_eq!(after_first, after_second);
        assert!(after_second.iter().all(|read| *read));
    }

    #[test]
    fn test_unread_count_matches_direct_filter() {
        let updates = vec![
            update(SenderRole::Admin, false),
            update(SenderRole::Client, true),
            update(SenderRole::Admin, true),
            update(SenderRole::Client, false),
        ];
        let direct = updates
            .iter()
            .filter(|u| !u.is_read && u.sender_role == SenderRole::Admin)
            .count();
        assert_eq!(unread_count_for(&updates, SenderRole::Client), direct);
    }
}
