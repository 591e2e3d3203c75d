use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::agencydb::AgencyExt,
    dtos::userdtos::RequestQueryDto,
    error::HttpError,
    mail::mails::send_agency_welcome_email,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    AppState,
};

/// Agency provisioning is platform-level: every route is super-admin only.
pub fn agencies_handler() -> Router {
    Router::new()
        .route("/", get(get_agencies).post(create_agency))
        .route("/events", get(get_audit_events))
        .route("/:agency_id", get(get_agency))
        .route("/:agency_id/active", put(set_agency_active))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::SuperAdmin])
        }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAgencyDto {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email is invalid"))]
    #[serde(rename = "contactEmail")]
    pub contact_email: String,
}

pub async fn create_agency(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(admin): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateAgencyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let agency = app_state
        .db_client
        .create_agency(&body.name, &body.contact_email)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Welcome email is informational only; the agency exists either way.
    if let Err(e) = send_agency_welcome_email(&agency.contact_email, &agency.name).await {
        tracing::warn!("welcome email failed for agency {}: {e}", agency.id);
    }

    app_state
        .audit_service
        .log_event_best_effort(
            Some(agency.id),
            Some(admin.user.id),
            Some("staff"),
            "agency_created",
            &format!("Agency {} onboarded", agency.name),
            None,
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "data": {"agency": agency}})),
    ))
}

pub async fn get_agencies(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    let offset = (page - 1) * limit;

    let agencies = app_state
        .db_client
        .get_agencies(limit as i64, offset as i64)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(json!({
        "status": "success",
        "results": agencies.len(),
        "agencies": agencies,
    })))
}

pub async fn get_agency(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(agency_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let agency = app_state
        .db_client
        .get_agency_by_id(agency_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Agency not found"))?;

    Ok(Json(json!({"status": "success", "data": {"agency": agency}})))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AuditEventsQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
    #[serde(rename = "agencyId")]
    pub agency_id: Option<Uuid>,
}

/// Platform-wide operational log, distinct from the per-submission trail.
pub async fn get_audit_events(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<AuditEventsQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(50);
    let offset = (page - 1) * limit;

    let events = app_state
        .audit_service
        .get_events(query.agency_id, limit as i64, offset as i64)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "results": events.len(),
        "events": events,
    })))
}

pub async fn set_agency_active(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(admin): Extension<JWTAuthMiddeware>,
    Path(agency_id): Path<Uuid>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, HttpError> {
    let is_active = body
        .get("isActive")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| HttpError::bad_request("isActive boolean is required"))?;

    let agency = app_state
        .db_client
        .set_agency_active(agency_id, is_active)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .audit_service
        .log_event_best_effort(
            Some(agency.id),
            Some(admin.user.id),
            Some("staff"),
            if is_active { "agency_enabled" } else { "agency_disabled" },
            &format!("Agency {} set active={}", agency.name, is_active),
            None,
        )
        .await;

    Ok(Json(json!({"status": "success", "data": {"agency": agency}})))
}
