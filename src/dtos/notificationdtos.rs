use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::notificationmodel::Notification;

#[derive(Serialize, Deserialize, Validate)]
pub struct NotificationQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationListResponseDto {
    pub status: String,
    pub notifications: Vec<Notification>,
    #[serde(rename = "unreadCount")]
    pub unread_count: i64,
    pub results: usize,
}
