use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use rand::{distr::Alphanumeric, Rng};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    db::userdb::UserExt,
    dtos::userdtos::{
        CreateUserDto, FilterUserDto, RequestQueryDto, UserData, UserListResponseDto,
        UserResponseDto,
    },
    error::{ErrorMessage, HttpError},
    mail::mails::{send_password_reset_email, send_staff_credentials_email},
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    utils::password,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/me", get(get_me))
        .route(
            "/",
            post(create_user)
                .get(get_agency_users)
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(
                        state,
                        req,
                        next,
                        vec![UserRole::SuperAdmin, UserRole::AgencyAdmin],
                    )
                })),
        )
        .route("/password", put(update_password))
        .route(
            "/:user_id/active",
            put(set_user_active).layer(middleware::from_fn(|state, req, next| {
                role_check(
                    state,
                    req,
                    next,
                    vec![UserRole::SuperAdmin, UserRole::AgencyAdmin],
                )
            })),
        )
        .route(
            "/:user_id/reset-password",
            put(reset_user_password).layer(middleware::from_fn(|state, req, next| {
                role_check(
                    state,
                    req,
                    next,
                    vec![UserRole::SuperAdmin, UserRole::AgencyAdmin],
                )
            })),
        )
}

pub async fn get_me(
    Extension(_app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let filtered_user = FilterUserDto::filter_user(&user.user);

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: filtered_user,
        },
    }))
}

/// Provisions a staff account with a generated password, emailed to the new
/// user. If the email cannot be sent the account is rolled back so no one is
/// left with credentials they never received.
pub async fn create_user(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(creator): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    // Agency admins can only create agents inside their own agency.
    let agency_id = match creator.user.role {
        UserRole::SuperAdmin => body.agency_id,
        _ => {
            if body.role == UserRole::SuperAdmin
                || (body.role == UserRole::AgencyAdmin && creator.user.role != UserRole::SuperAdmin)
            {
                return Err(HttpError::forbidden(
                    ErrorMessage::PermissionDenied.to_string(),
                ));
            }
            creator.user.agency_id
        }
    };

    let existing = app_state
        .db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;
    if existing.is_some() {
        return Err(HttpError::bad_request(ErrorMessage::EmailExist.to_string()));
    }

    let temp_password: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();

    let hashed = password::hash(&temp_password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let user = app_state
        .db_client
        .save_user(
            &body.name,
            &body.email,
            body.phone.as_deref(),
            &hashed,
            body.role,
            agency_id,
            Some(creator.user.id),
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let login_url = format!("{}/login", app_state.env.app_url);
    if let Err(e) =
        send_staff_credentials_email(&user.email, &user.name, &temp_password, &login_url).await
    {
        tracing::error!("credentials email failed for {}: {e}", user.email);
        // Compensating delete: the account is unusable without the email.
        if let Err(del_err) = app_state.db_client.delete_user(user.id).await {
            tracing::error!("rollback of user {} failed: {del_err}", user.id);
        }
        return Err(HttpError::server_error(
            "Could not deliver account credentials",
        ));
    }

    app_state
        .audit_service
        .log_event_best_effort(
            agency_id,
            Some(creator.user.id),
            Some("staff"),
            "user_created",
            &format!("{} created account for {}", creator.user.email, user.email),
            None,
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(UserResponseDto {
            status: "success".to_string(),
            data: UserData {
                user: FilterUserDto::filter_user(&user),
            },
        }),
    ))
}

pub async fn get_agency_users(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    axum::extract::Query(query): axum::extract::Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let agency_id = user
        .user
        .agency_id
        .ok_or_else(|| HttpError::bad_request("This account is not linked to an agency"))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    let offset = (page - 1) * limit;

    let users = app_state
        .db_client
        .get_users_by_agency(agency_id, limit as i64, offset as i64)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(UserListResponseDto {
        status: "success".to_string(),
        results: users.len(),
        users: FilterUserDto::filter_users(&users),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordDto {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub old_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

pub async fn update_password(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdatePasswordDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let matches = password::compare(&body.old_password, &user.user.password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;
    if !matches {
        return Err(HttpError::unauthorized(
            ErrorMessage::WrongCredentials.to_string(),
        ));
    }

    let hashed = password::hash(&body.new_password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .db_client
        .update_user_password(user.user.id, &hashed)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(json!({"status": "success", "message": "Password updated"})))
}

/// Admin-driven reset: a fresh generated password is stored and emailed. The
/// email is best-effort since the reset can simply be re-run.
pub async fn reset_user_password(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(admin): Extension<JWTAuthMiddeware>,
    axum::extract::Path(user_id): axum::extract::Path<uuid::Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let target = app_state
        .db_client
        .get_user(Some(user_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    if admin.user.role != UserRole::SuperAdmin && target.agency_id != admin.user.agency_id {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let temp_password: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();

    let hashed = password::hash(&temp_password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .db_client
        .update_user_password(target.id, &hashed)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if let Err(e) = send_password_reset_email(&target.email, &target.name, &temp_password).await {
        tracing::warn!("reset email failed for {}: {e}", target.email);
    }

    app_state
        .audit_service
        .log_event_best_effort(
            target.agency_id,
            Some(admin.user.id),
            Some("staff"),
            "password_reset",
            &format!("{} reset password for {}", admin.user.email, target.email),
            None,
        )
        .await;

    Ok(Json(json!({"status": "success", "message": "Password reset"})))
}

pub async fn set_user_active(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(admin): Extension<JWTAuthMiddeware>,
    axum::extract::Path(user_id): axum::extract::Path<uuid::Uuid>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, HttpError> {
    let is_active = body
        .get("isActive")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| HttpError::bad_request("isActive boolean is required"))?;

    let target = app_state
        .db_client
        .get_user(Some(user_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    // Agency admins stay inside their own agency.
    if admin.user.role != UserRole::SuperAdmin && target.agency_id != admin.user.agency_id {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let updated = app_state
        .db_client
        .set_user_active(user_id, is_active)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&updated),
        },
    }))
}
