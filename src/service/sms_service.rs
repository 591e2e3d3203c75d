use std::time::Duration;

use serde_json::json;

use crate::{service::error::ServiceError, utils::phone::redact_phone};

const MAX_RETRIES: u32 = 3;

/// Thin client for the SMS carrier's HTTP API. OTP delivery is on the login
/// critical path, so failures are retried with backoff and then surfaced to
/// the caller instead of being swallowed.
#[derive(Debug, Clone)]
pub struct SmsService {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl SmsService {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn send_otp(&self, phone: &str, otp: &str) -> Result<(), ServiceError> {
        let body = format!("Your verification code is {otp}. It expires in 5 minutes.");
        self.send_sms(phone, &body).await
    }

    pub async fn send_sms(&self, phone: &str, body: &str) -> Result<(), ServiceError> {
        let payload = json!({
            "to": phone,
            "body": body,
        });

        let mut last_error = String::new();

        for attempt in 1..=MAX_RETRIES {
            let response = self
                .http
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&payload)
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    tracing::info!(phone = redact_phone(phone), "SMS sent");
                    return Ok(());
                }
                Ok(resp) => {
                    let status = resp.status();
                    let text = resp.text().await.unwrap_or_default();
                    last_error = format!("carrier returned {status}: {text}");
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }

            tracing::warn!(
                phone = redact_phone(phone),
                attempt,
                "SMS send failed: {last_error}"
            );

            if attempt < MAX_RETRIES {
                tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
            }
        }

        Err(ServiceError::SmsDelivery(last_error))
    }
}
