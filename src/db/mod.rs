pub mod agencydb;
pub mod auditdb;
pub mod clientdb;
#[allow(clippy::module_inception)]
pub mod db;
pub mod notificationdb;
pub mod propertydb;
pub mod submissiondb;
pub mod userdb;
