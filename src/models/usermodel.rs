use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    AgencyAdmin,
    Agent,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::SuperAdmin => "super_admin",
            UserRole::AgencyAdmin => "agency_admin",
            UserRole::Agent => "agent",
        }
    }
}

/// Staff account. Agents and agency admins belong to exactly one agency;
/// the superadmin has no agency linkage.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: UserRole,
    pub agency_id: Option<Uuid>,
    pub is_active: bool,
    pub created_by: Option<Uuid>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_to_str() {
        assert_eq!(UserRole::SuperAdmin.to_str(), "super_admin");
        assert_eq!(UserRole::AgencyAdmin.to_str(), "agency_admin");
        assert_eq!(UserRole::Agent.to_str(), "agent");
    }
}
