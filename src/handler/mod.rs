pub mod agencies;
pub mod auth;
pub mod clients;
pub mod files;
pub mod notifications;
pub mod properties;
pub mod submissions;
pub mod users;
