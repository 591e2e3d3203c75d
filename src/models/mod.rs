pub mod agencymodel;
pub mod auditmodel;
pub mod clientmodel;
pub mod notificationmodel;
pub mod propertymodel;
pub mod submissionmodel;
pub mod usermodel;
