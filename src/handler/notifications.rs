use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::notificationdtos::{NotificationListResponseDto, NotificationQueryDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn notifications_handler() -> Router {
    Router::new()
        .route("/", get(get_notifications))
        .route("/:notification_id/read", post(mark_read))
        .route("/read-all", post(mark_all_read))
}

pub async fn get_notifications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<NotificationQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let agency_id = auth
        .user
        .agency_id
        .ok_or_else(|| HttpError::bad_request("This account is not linked to an agency"))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    let offset = (page - 1) * limit;

    let (notifications, unread_count) = app_state
        .notification_service
        .list_for_agency(agency_id, limit as i64, offset as i64)
        .await?;

    Ok(Json(NotificationListResponseDto {
        status: "success".to_string(),
        results: notifications.len(),
        unread_count,
        notifications,
    }))
}

pub async fn mark_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let agency_id = auth
        .user
        .agency_id
        .ok_or_else(|| HttpError::bad_request("This account is not linked to an agency"))?;

    let notification = app_state
        .notification_service
        .mark_read(agency_id, notification_id)
        .await?;

    Ok(Json(json!({"status": "success", "data": {"notification": notification}})))
}

pub async fn mark_all_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let agency_id = auth
        .user
        .agency_id
        .ok_or_else(|| HttpError::bad_request("This account is not linked to an agency"))?;

    let marked = app_state
        .notification_service
        .mark_all_read(agency_id)
        .await?;

    Ok(Json(json!({"status": "success", "marked": marked})))
}
