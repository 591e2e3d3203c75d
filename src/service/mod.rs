pub mod audit_service;
pub mod error;
pub mod messaging_service;
pub mod notification_service;
pub mod sms_service;
pub mod storage_service;
pub mod submission_service;
