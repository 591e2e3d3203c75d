use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        submissiondtos::{
            AuditTrailResponseDto, CreateSubmissionsDto, IdentitySubmissionDto, PostUpdateDto,
            SubmissionListResponseDto, ThreadResponseDto, TransitionStatusDto,
        },
        userdtos::RequestQueryDto,
    },
    error::HttpError,
    middleware::{role_check, ClientAuthMiddeware, JWTAuthMiddeware},
    models::usermodel::UserRole,
    AppState,
};

/// Client-facing submission routes; nested behind the session-token auth.
pub fn submissions_client_handler() -> Router {
    Router::new()
        .route("/", post(create_submissions).get(list_my_submissions))
        .route("/identity", post(create_identity_submission))
        .route("/:submission_id/updates", get(get_thread_client).post(post_update_client))
        .route("/:submission_id/read", post(mark_read_client))
}

/// Staff-facing submission routes; nested behind the JWT auth.
pub fn submissions_staff_handler() -> Router {
    Router::new()
        .route("/", get(list_for_staff))
        .route(
            "/:submission_id/status",
            put(transition_status).layer(middleware::from_fn(|state, req, next| {
                role_check(
                    state,
                    req,
                    next,
                    vec![UserRole::SuperAdmin, UserRole::AgencyAdmin, UserRole::Agent],
                )
            })),
        )
        .route("/:submission_id/updates", get(get_thread_staff).post(post_update_staff))
        .route("/:submission_id/read", post(mark_read_staff))
        .route("/:submission_id/audit", get(get_audit_trail))
}

pub async fn create_submissions(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
    Json(body): Json<CreateSubmissionsDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let outcome = app_state
        .submission_service
        .create_submissions(&auth.client, &body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "results": outcome.submissions.len(),
            "skipped": outcome.skipped,
            "submissions": outcome.submissions,
        })),
    ))
}

pub async fn create_identity_submission(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
    Json(body): Json<IdentitySubmissionDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let submission = app_state
        .submission_service
        .create_identity_submission(&auth.client, body.agency_id, body.agent_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "data": {"submission": submission}})),
    ))
}

pub async fn list_my_submissions(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let submissions = app_state
        .submission_service
        .list_for_client(auth.client.id)
        .await?;

    Ok(Json(SubmissionListResponseDto {
        status: "success".to_string(),
        results: submissions.len(),
        submissions,
    }))
}

/// Agency admins see the whole agency's queue; agents only their own.
pub async fn list_for_staff(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let submissions = match auth.user.role {
        UserRole::Agent => {
            app_state
                .submission_service
                .list_for_agent(auth.user.id)
                .await?
        }
        _ => {
            let agency_id = auth
                .user
                .agency_id
                .ok_or_else(|| HttpError::bad_request("This account is not linked to an agency"))?;
            app_state
                .submission_service
                .list_for_agency(agency_id)
                .await?
        }
    };

    Ok(Json(SubmissionListResponseDto {
        status: "success".to_string(),
        results: submissions.len(),
        submissions,
    }))
}

pub async fn transition_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(submission_id): Path<Uuid>,
    Json(body): Json<TransitionStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let actor = auth.actor_context();
    let submission = app_state
        .submission_service
        .transition_status(&actor, submission_id, body.status)
        .await?;

    Ok(Json(json!({"status": "success", "data": {"submission": submission}})))
}

pub async fn get_thread_client(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
    Path(submission_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let actor = auth.actor_context();
    let (updates, unread_count) = app_state
        .messaging_service
        .get_thread(&actor, submission_id)
        .await?;

    Ok(Json(ThreadResponseDto {
        status: "success".to_string(),
        updates,
        unread_count,
    }))
}

pub async fn get_thread_staff(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(submission_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let actor = auth.actor_context();
    let (updates, unread_count) = app_state
        .messaging_service
        .get_thread(&actor, submission_id)
        .await?;

    Ok(Json(ThreadResponseDto {
        status: "success".to_string(),
        updates,
        unread_count,
    }))
}

pub async fn post_update_client(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
    Path(submission_id): Path<Uuid>,
    Json(body): Json<PostUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let actor = auth.actor_context();
    let update = app_state
        .messaging_service
        .post_update(&actor, submission_id, &body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "data": {"update": update}})),
    ))
}

pub async fn post_update_staff(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(submission_id): Path<Uuid>,
    Json(body): Json<PostUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let actor = auth.actor_context();
    let update = app_state
        .messaging_service
        .post_update(&actor, submission_id, &body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "data": {"update": update}})),
    ))
}

pub async fn mark_read_client(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
    Path(submission_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let actor = auth.actor_context();
    let flipped = app_state
        .messaging_service
        .mark_thread_read(&actor, submission_id)
        .await?;

    Ok(Json(json!({"status": "success", "marked": flipped})))
}

pub async fn mark_read_staff(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(submission_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let actor = auth.actor_context();
    let flipped = app_state
        .messaging_service
        .mark_thread_read(&actor, submission_id)
        .await?;

    Ok(Json(json!({"status": "success", "marked": flipped})))
}

/// Staff-only view of the append-only trail, newest first.
pub async fn get_audit_trail(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(submission_id): Path<Uuid>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let actor = auth.actor_context();
    // Participant gate reuses the thread access rule.
    app_state
        .submission_service
        .get_submission_for_actor(&actor, submission_id)
        .await?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(50);
    let offset = (page - 1) * limit;

    let entries = app_state
        .audit_service
        .get_submission_trail(submission_id, limit as i64, offset as i64)
        .await?;

    Ok(Json(AuditTrailResponseDto {
        status: "success".to_string(),
        results: entries.len(),
        entries,
    }))
}
