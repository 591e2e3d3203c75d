use thiserror::Error;
use uuid::Uuid;

use crate::{error::HttpError, models::submissionmodel::SubmissionStatus};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Property {0} not found")]
    PropertyNotFound(Uuid),

    #[error("Submission {0} not found")]
    SubmissionNotFound(Uuid),

    #[error("Agency {0} not found or inactive")]
    AgencyUnavailable(Uuid),

    #[error("Property {0} does not belong to this client")]
    PropertyNotOwned(Uuid),

    #[error("Property {0} is not in the portfolio")]
    PropertyNotInPortfolio(Uuid),

    #[error("Submission {0} cannot move from {1:?} to {2:?}")]
    InvalidStatusTransition(Uuid, SubmissionStatus, SubmissionStatus),

    #[error("Actor is not a participant of submission {0}")]
    NotAParticipant(Uuid),

    #[error("Notification {0} not found")]
    NotificationNotFound(Uuid),

    #[error("Notification {0} belongs to another agency")]
    NotificationNotOwned(Uuid),

    #[error("An update needs a message, attachments, or both")]
    EmptyUpdate,

    #[error("At least one identity document is required")]
    NoIdentityDocuments,

    #[error("File {0} exceeds the upload size limit")]
    FileTooLarge(String),

    #[error("File content is not valid base64")]
    InvalidFilePayload,

    #[error("File not found in storage: {0}")]
    FileNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("SMS delivery failed: {0}")]
    SmsDelivery(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::PropertyNotFound(_)
            | ServiceError::SubmissionNotFound(_)
            | ServiceError::AgencyUnavailable(_)
            | ServiceError::NotificationNotFound(_)
            | ServiceError::FileNotFound(_) => HttpError::not_found(error.to_string()),

            ServiceError::InvalidStatusTransition(_, _, _)
            | ServiceError::EmptyUpdate
            | ServiceError::NoIdentityDocuments
            | ServiceError::FileTooLarge(_)
            | ServiceError::InvalidFilePayload
            | ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),

            ServiceError::PropertyNotOwned(_)
            | ServiceError::NotAParticipant(_)
            | ServiceError::NotificationNotOwned(_) => HttpError::forbidden(error.to_string()),

            ServiceError::PropertyNotInPortfolio(_) => HttpError::bad_request(error.to_string()),

            ServiceError::SmsDelivery(_) => HttpError::bad_gateway(error.to_string()),

            _ => HttpError::server_error(error.to_string()),
        }
    }
}
