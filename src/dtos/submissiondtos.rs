use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::submissiondb::SubmissionJoinRow,
    models::{
        propertymodel::PropertyType,
        submissionmodel::{
            SubmissionAuditEntry, SubmissionStatus, SubmissionUpdate, UpdateAttachment,
        },
    },
};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmissionsDto {
    /// Properties to hand to the agency. Already-submitted ones are silently
    /// skipped rather than rejected.
    #[validate(length(min = 1, message = "At least one property is required"))]
    #[serde(rename = "propertyIds")]
    pub property_ids: Vec<Uuid>,

    #[serde(rename = "agencyId")]
    pub agency_id: Uuid,

    #[serde(rename = "agentId")]
    pub agent_id: Option<Uuid>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySubmissionDto {
    #[serde(rename = "agencyId")]
    pub agency_id: Uuid,

    #[serde(rename = "agentId")]
    pub agent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionStatusDto {
    pub status: SubmissionStatus,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentUploadDto {
    #[validate(length(min = 1, max = 255, message = "File name is required"))]
    #[serde(rename = "fileName")]
    pub file_name: String,

    #[validate(length(min = 1, message = "File content is required"))]
    #[serde(rename = "contentBase64")]
    pub content_base64: String,
}

/// A thread post: free text, attachments, or both. An empty post is rejected
/// in the handler since neither field alone is mandatory.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct PostUpdateDto {
    #[validate(length(max = 5000, message = "Message is too long"))]
    pub message: Option<String>,

    #[validate]
    #[serde(default)]
    pub attachments: Vec<AttachmentUploadDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySnapshot {
    pub title: String,
    pub location: String,
    #[serde(rename = "propertyType")]
    pub property_type: Option<PropertyType>,
}

impl PropertySnapshot {
    /// Stand-in shown to clients when the referenced property row is gone.
    pub fn placeholder() -> Self {
        PropertySnapshot {
            title: "Property Details Unavailable".to_string(),
            location: String::new(),
            property_type: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSnapshot {
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
}

/// A submission as an actor sees it in a list: live-joined relations plus the
/// viewer's unread message count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionView {
    pub id: Uuid,
    #[serde(rename = "propertyId")]
    pub property_id: Option<Uuid>,
    #[serde(rename = "clientId")]
    pub client_id: Uuid,
    #[serde(rename = "agentId")]
    pub agent_id: Option<Uuid>,
    #[serde(rename = "agencyId")]
    pub agency_id: Uuid,
    pub status: SubmissionStatus,
    pub property: Option<PropertySnapshot>,
    pub client: Option<ClientSnapshot>,
    #[serde(rename = "unreadCount")]
    pub unread_count: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl SubmissionView {
    /// Builds the view from a joined row; the caller decides what to do with
    /// orphaned relations before or after this.
    pub fn from_row(row: &SubmissionJoinRow, unread_count: i64) -> Self {
        let property = match (&row.property_title, &row.property_location) {
            (Some(title), Some(location)) => Some(PropertySnapshot {
                title: title.to_owned(),
                location: location.to_owned(),
                property_type: row.property_type,
            }),
            _ => None,
        };

        let client = row.client_phone.as_ref().map(|phone| ClientSnapshot {
            full_name: row.client_name.to_owned(),
            phone: phone.to_owned(),
            email: row.client_email.to_owned(),
        });

        SubmissionView {
            id: row.id,
            property_id: row.property_id,
            client_id: row.client_id,
            agent_id: row.agent_id,
            agency_id: row.agency_id,
            status: row.status,
            property,
            client,
            unread_count,
            created_at: row.created_at,
        }
    }

    /// True when the submission references a property whose row is gone.
    /// Identity-only submissions (no property_id) are never orphaned.
    pub fn has_orphaned_property(&self) -> bool {
        self.property_id.is_some() && self.property.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionListResponseDto {
    pub status: String,
    pub submissions: Vec<SubmissionView>,
    pub results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWithAttachments {
    #[serde(flatten)]
    pub update: SubmissionUpdate,
    pub attachments: Vec<UpdateAttachment>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThreadResponseDto {
    pub status: String,
    pub updates: Vec<UpdateWithAttachments>,
    #[serde(rename = "unreadCount")]
    pub unread_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditTrailResponseDto {
    pub status: String,
    pub entries: Vec<SubmissionAuditEntry>,
    pub results: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submissionmodel::SubmissionStatus;

    fn row(property_id: Option<Uuid>, with_property: bool) -> SubmissionJoinRow {
        SubmissionJoinRow {
            id: Uuid::new_v4(),
            property_id,
            client_id: Uuid::new_v4(),
            agent_id: None,
            agency_id: Uuid::new_v4(),
            status: SubmissionStatus::Submitted,
            created_at: Utc::now(),
            property_title: with_property.then(|| "Marina View 2BR".to_string()),
            property_location: with_property.then(|| "Dubai Marina".to_string()),
            property_type: with_property.then_some(PropertyType::Apartment),
            client_name: Some("Omar".to_string()),
            client_phone: Some("+971501234567".to_string()),
            client_email: None,
        }
    }

    #[test]
    fn test_view_with_live_property() {
        let view = SubmissionView::from_row(&row(Some(Uuid::new_v4()), true), 3);
        assert!(view.property.is_some());
        assert!(!view.has_orphaned_property());
        assert_eq!(view.unread_count, 3);
    }

    #[test]
    fn test_view_detects_orphaned_property() {
        let view = SubmissionView::from_row(&row(Some(Uuid::new_v4()), false), 0);
        assert!(view.property.is_none());
        assert!(view.has_orphaned_property());
    }

    #[test]
    fn test_identity_only_view_is_not_orphaned() {
        let view = SubmissionView::from_row(&row(None, false), 0);
        assert!(!view.has_orphaned_property());
    }
}
