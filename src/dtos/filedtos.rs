use serde::{Deserialize, Serialize};
use validator::Validate;

/// Which credential the download request carries. Staff use a JWT, clients an
/// opaque session token; the value decides which check runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadUserType {
    Staff,
    Client,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct DownloadFileDto {
    #[validate(length(min = 1, message = "File path is required"))]
    #[serde(rename = "filePath")]
    pub file_path: String,

    /// Required when userType is client.
    #[serde(rename = "sessionToken")]
    pub session_token: Option<String>,

    #[serde(rename = "userType")]
    pub user_type: DownloadUserType,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignedUrlResponseDto {
    pub status: String,
    pub url: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,
}
