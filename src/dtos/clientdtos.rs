use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::clientmodel::Client;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RequestOtpDto {
    #[validate(length(min = 7, max = 20, message = "Phone must be between 7-20 characters"))]
    pub phone: String,

    /// Agent referral token from a shared onboarding link, if any.
    #[serde(rename = "referralToken")]
    pub referral_token: Option<String>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct VerifyOtpDto {
    #[validate(length(min = 7, max = 20, message = "Phone must be between 7-20 characters"))]
    pub phone: String,

    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub otp: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateClientProfileDto {
    #[validate(length(min = 1, max = 120, message = "Name must be between 1-120 characters"))]
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,

    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,

    #[serde(rename = "onboardingComplete")]
    pub onboarding_complete: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterClientDto {
    pub id: String,
    pub phone: String,
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "onboardingComplete")]
    pub onboarding_complete: bool,
    #[serde(rename = "agentId")]
    pub agent_id: Option<Uuid>,
    #[serde(rename = "agencyId")]
    pub agency_id: Option<Uuid>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl FilterClientDto {
    pub fn filter_client(client: &Client) -> Self {
        FilterClientDto {
            id: client.id.to_string(),
            phone: client.phone.to_owned(),
            full_name: client.full_name.to_owned(),
            email: client.email.to_owned(),
            onboarding_complete: client.onboarding_complete,
            agent_id: client.agent_id,
            agency_id: client.agency_id,
            created_at: client.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClientLoginResponseDto {
    pub status: String,
    #[serde(rename = "sessionToken")]
    pub session_token: String,
    pub client: FilterClientDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_client_hides_otp_and_session() {
        let client = Client {
            id: Uuid::new_v4(),
            phone: "+971501234567".to_string(),
            full_name: Some("Omar".to_string()),
            email: None,
            onboarding_complete: false,
            agent_id: None,
            agency_id: None,
            referral_token: None,
            otp_code: Some("123456".to_string()),
            otp_expires_at: Some(Utc::now()),
            session_token: Some("abc".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(FilterClientDto::filter_client(&client)).unwrap();
        assert!(value.get("otp_code").is_none());
        assert!(value.get("session_token").is_none());
        assert_eq!(value["phone"], "+971501234567");
    }

    #[test]
    fn test_verify_otp_length() {
        let dto = VerifyOtpDto {
            phone: "+971501234567".to_string(),
            otp: "12345".to_string(),
        };
        assert!(dto.validate().is_err());
    }
}
