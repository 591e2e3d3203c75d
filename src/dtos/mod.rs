pub mod clientdtos;
pub mod filedtos;
pub mod notificationdtos;
pub mod propertydtos;
pub mod submissiondtos;
pub mod userdtos;
