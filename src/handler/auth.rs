use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::Cookie;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use validator::Validate;

use crate::{
    db::{clientdb::ClientExt, userdb::UserExt},
    dtos::{
        clientdtos::{ClientLoginResponseDto, FilterClientDto, RequestOtpDto, VerifyOtpDto},
        userdtos::{FilterUserDto, LoginUserDto, UserLoginResponseDto},
    },
    error::{ErrorMessage, HttpError},
    models::usermodel::UserRole,
    utils::{
        otp_generator::{generate_otp, generate_session_token},
        password,
        phone::{normalize_e164, redact_phone},
        token,
    },
    AppState,
};

const OTP_TTL_MINUTES: i64 = 5;

pub fn auth_handler() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/client/request-otp", post(request_otp))
        .route("/client/verify-otp", post(verify_otp))
}

/// Staff sign-in. Issues a JWT both as a cookie and in the body.
pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string()))?;

    let password_matches = password::compare(&body.password, &user.password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if !password_matches {
        return Err(HttpError::unauthorized(
            ErrorMessage::WrongCredentials.to_string(),
        ));
    }

    if !user.is_active {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage * 60,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let cookie_duration = time::Duration::minutes(app_state.env.jwt_maxage);
    let cookie = Cookie::build(("token", token.clone()))
        .path("/")
        .max_age(cookie_duration)
        .http_only(true)
        .build();

    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .map_err(|_| HttpError::server_error("Failed to build cookie"))?,
    );

    app_state
        .audit_service
        .log_event_best_effort(
            user.agency_id,
            Some(user.id),
            Some("staff"),
            "staff_login",
            &format!("{} signed in", user.email),
            None,
        )
        .await;

    let response = Json(UserLoginResponseDto {
        status: "success".to_string(),
        token,
        user: FilterUserDto::filter_user(&user),
    });

    Ok((headers, response))
}

/// Clears the token cookie. The audit event is best-effort: an expired or
/// missing token still gets the cookie cleared.
pub async fn logout(
    Extension(app_state): Extension<Arc<AppState>>,
    cookie_jar: axum_extra::extract::cookie::CookieJar,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = cookie_jar
        .get("token")
        .and_then(|cookie| {
            token::decode_token(cookie.value(), app_state.env.jwt_secret.as_bytes()).ok()
        })
        .and_then(|sub| uuid::Uuid::parse_str(&sub).ok());

    if let Some(user_id) = user_id {
        app_state
            .audit_service
            .log_event_best_effort(
                None,
                Some(user_id),
                Some("staff"),
                "staff_logout",
                "Staff signed out",
                None,
            )
            .await;
    }

    let cookie = Cookie::build(("token", ""))
        .path("/")
        .max_age(time::Duration::minutes(-1))
        .http_only(true)
        .build();

    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .map_err(|_| HttpError::server_error("Failed to build cookie"))?,
    );

    Ok((
        headers,
        Json(json!({"status": "success", "message": "Logged out"})),
    ))
}

/// Resend gate for OTPs. Blocked only while a code is outstanding and the
/// client row was last touched inside the cooldown window; without a pending
/// code, updated_at bumps (e.g. a profile edit) never rate-limit a login.
fn otp_resend_blocked(
    otp_pending: bool,
    updated_at: DateTime<Utc>,
    now: DateTime<Utc>,
    cooldown_secs: i64,
) -> bool {
    otp_pending && now.signed_duration_since(updated_at).num_seconds() < cooldown_secs
}

/// Starts the client login flow. Creates the client row on first contact,
/// then sends a 6-digit code over SMS. SMS failure fails the request: the
/// client cannot proceed without the code.
pub async fn request_otp(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RequestOtpDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let phone = normalize_e164(&body.phone)
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::InvalidPhoneNumber.to_string()))?;

    // A referral token is the referring agent's user id; it links the client
    // to that agent and their agency at first contact only.
    let (agent_id, agency_id) = match body.referral_token.as_deref() {
        Some(raw) => match uuid::Uuid::parse_str(raw).ok() {
            Some(id) => {
                let agent = app_state
                    .db_client
                    .get_user(Some(id), None)
                    .await
                    .map_err(|e| HttpError::server_error(e.to_string()))?
                    .filter(|u| u.role == UserRole::Agent && u.is_active);
                match agent {
                    Some(a) => (Some(a.id), a.agency_id),
                    None => (None, None),
                }
            }
            None => (None, None),
        },
        None => (None, None),
    };

    let client = app_state
        .db_client
        .get_or_create_client(&phone, agent_id, agency_id, body.referral_token.as_deref())
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Per-phone resend cooldown, clocked off the row's updated_at.
    if otp_resend_blocked(
        client.otp_code.is_some(),
        client.updated_at,
        Utc::now(),
        app_state.env.otp_resend_cooldown_secs,
    ) {
        return Err(HttpError::too_many_requests(
            ErrorMessage::OtpRateLimited.to_string(),
        ));
    }

    let otp = generate_otp();
    let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

    app_state
        .db_client
        .set_client_otp(client.id, &otp, expires_at)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state.sms_service.send_otp(&phone, &otp).await?;

    app_state
        .audit_service
        .log_event_best_effort(
            client.agency_id,
            Some(client.id),
            Some("client"),
            "otp_requested",
            &format!("OTP sent to {}", redact_phone(&phone)),
            None,
        )
        .await;

    Ok((
        StatusCode::OK,
        Json(json!({"status": "success", "message": "Verification code sent"})),
    ))
}

/// Completes the client login: a correct, unexpired code is exchanged for a
/// fresh opaque session token. The code is cleared in the same statement, so
/// it can never be replayed.
pub async fn verify_otp(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<VerifyOtpDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let phone = normalize_e164(&body.phone)
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::InvalidPhoneNumber.to_string()))?;

    let client = app_state
        .db_client
        .get_client_by_phone(&phone)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::OtpInvalid.to_string()))?;

    let stored_otp = client
        .otp_code
        .as_deref()
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::OtpInvalid.to_string()))?;

    let expired = client
        .otp_expires_at
        .map(|exp| exp < Utc::now())
        .unwrap_or(true);
    if expired {
        return Err(HttpError::unauthorized(
            ErrorMessage::OtpExpired.to_string(),
        ));
    }

    if stored_otp != body.otp {
        return Err(HttpError::unauthorized(
            ErrorMessage::OtpInvalid.to_string(),
        ));
    }

    let session_token = generate_session_token();
    let client = app_state
        .db_client
        .consume_otp(client.id, &session_token)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .audit_service
        .log_event_best_effort(
            client.agency_id,
            Some(client.id),
            Some("client"),
            "client_login",
            &format!("Client {} logged in", redact_phone(&phone)),
            None,
        )
        .await;

    Ok(Json(ClientLoginResponseDto {
        status: "success".to_string(),
        session_token,
        client: FilterClientDto::filter_client(&client),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resend_blocked_inside_window() {
        let now = Utc::now();
        assert!(otp_resend_blocked(
            true,
            now - Duration::seconds(10),
            now,
            60
        ));
    }

    #[test]
    fn test_resend_allowed_once_window_elapses() {
        let now = Utc::now();
        assert!(!otp_resend_blocked(
            true,
            now - Duration::seconds(60),
            now,
            60
        ));
        assert!(!otp_resend_blocked(
            true,
            now - Duration::seconds(90),
            now,
            60
        ));
    }

    #[test]
    fn test_resend_allowed_without_pending_code() {
        // updated_at also moves on profile edits; only an outstanding code
        // arms the cooldown.
        let now = Utc::now();
        assert!(!otp_resend_blocked(
            false,
            now - Duration::seconds(1),
            now,
            60
        ));
    }
}
