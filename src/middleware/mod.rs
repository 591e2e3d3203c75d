use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::IntoResponse,
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    db::{clientdb::ClientExt, userdb::UserExt},
    error::{ErrorMessage, HttpError},
    models::{
        clientmodel::Client,
        submissionmodel::{ActorContext, ActorType},
        usermodel::{User, UserRole},
    },
    utils::token,
    AppState,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JWTAuthMiddeware {
    pub user: User,
}

impl JWTAuthMiddeware {
    pub fn actor_context(&self) -> ActorContext {
        let actor_type = match self.user.role {
            UserRole::Agent => ActorType::Agent,
            UserRole::AgencyAdmin | UserRole::SuperAdmin => ActorType::AgencyAdmin,
        };
        ActorContext {
            actor_type,
            actor_id: self.user.id,
            agency_id: self.user.agency_id,
            is_super_admin: self.user.role == UserRole::SuperAdmin,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientAuthMiddeware {
    pub client: Client,
}

impl ClientAuthMiddeware {
    pub fn actor_context(&self) -> ActorContext {
        ActorContext {
            actor_type: ActorType::Client,
            actor_id: self.client.id,
            agency_id: self.client.agency_id,
            is_super_admin: false,
        }
    }
}

/// Staff auth: JWT from the `token` cookie or a Bearer header.
pub async fn auth(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let cookies = cookie_jar
        .get("token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| {
                    auth_value
                        .strip_prefix("Bearer ")
                        .map(|v| v.to_owned())
                })
        });

    let token = cookies
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let token_details = token::decode_token(token, app_state.env.jwt_secret.as_bytes())
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let user_id = uuid::Uuid::parse_str(&token_details)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let user = app_state
        .db_client
        .get_user(Some(user_id), None)
        .await
        .map_err(|_| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string()))?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string()))?;

    if !user.is_active {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    req.extensions_mut().insert(JWTAuthMiddeware { user });

    Ok(next.run(req).await)
}

/// Client auth: opaque session token from the `x-session-token` header.
/// Clients never hold JWTs; their token is a database lookup.
pub async fn client_auth(
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let session_token = req
        .headers()
        .get("x-session-token")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::SessionNotProvided.to_string()))?;

    let client = app_state
        .db_client
        .get_client_by_session_token(&session_token)
        .await
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidSession.to_string()))?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::InvalidSession.to_string()))?;

    req.extensions_mut().insert(ClientAuthMiddeware { client });

    Ok(next.run(req).await)
}

pub async fn role_check(
    Extension(_app_state): Extension<Arc<AppState>>,
    req: Request,
    next: Next,
    required_roles: Vec<UserRole>,
) -> Result<impl IntoResponse, HttpError> {
    let user = req
        .extensions()
        .get::<JWTAuthMiddeware>()
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string()))?;

    if !required_roles.contains(&user.user.role) {
        return Err(HttpError::new(
            ErrorMessage::PermissionDenied.to_string(),
            StatusCode::FORBIDDEN,
        ));
    }

    Ok(next.run(req).await)
}
