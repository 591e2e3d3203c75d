use std::sync::Arc;

use axum::{
    extract::Query,
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::{
    db::{clientdb::ClientExt, propertydb::PropertyExt, submissiondb::SubmissionExt, userdb::UserExt},
    dtos::filedtos::{DownloadFileDto, DownloadUserType, SignedUrlResponseDto},
    error::{ErrorMessage, HttpError},
    middleware::{ClientAuthMiddeware, JWTAuthMiddeware},
    models::submissionmodel::{ActorContext, ActorType, AuditAction},
    utils::token,
    AppState,
};

/// File routes do their own authentication: the download body names which
/// credential it carries (staff JWT or client session token), and the view
/// route trusts only its signature.
pub fn files_handler() -> Router {
    Router::new()
        .route("/download", post(download_file))
        .route("/sign", post(sign_view_url))
        .route("/view", get(view_file))
}

enum StoredFile {
    /// A thread attachment; carries its submission for audit.
    Attachment {
        submission_id: uuid::Uuid,
        file_name: String,
        mime_type: String,
    },
    /// A property or identity document.
    Document {
        file_name: String,
        mime_type: String,
    },
}

pub async fn download_file(
    Extension(app_state): Extension<Arc<AppState>>,
    cookie_jar: CookieJar,
    headers: HeaderMap,
    Json(body): Json<DownloadFileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let actor = resolve_actor(&app_state, &cookie_jar, &headers, &body).await?;
    let file = authorize_file(&app_state, &actor, &body.file_path).await?;

    let bytes = app_state
        .storage_service
        .download(&body.file_path)
        .await
        .map_err(HttpError::from)?;

    let (file_name, mime_type) = match &file {
        StoredFile::Attachment {
            submission_id,
            file_name,
            mime_type,
        } => {
            app_state
                .audit_service
                .log_submission_action_best_effort(
                    *submission_id,
                    actor.actor_type,
                    Some(actor.actor_id),
                    AuditAction::DownloadedFile,
                    Some(file_name),
                )
                .await;
            (file_name.clone(), mime_type.clone())
        }
        StoredFile::Document {
            file_name,
            mime_type,
        } => {
            app_state
                .audit_service
                .log_event_best_effort(
                    actor.agency_id,
                    Some(actor.actor_id),
                    Some(actor.actor_type.to_str()),
                    "file_downloaded",
                    &format!("Downloaded {file_name}"),
                    None,
                )
                .await;
            (file_name.clone(), mime_type.clone())
        }
    };

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::CONTENT_TYPE,
        mime_type
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );
    response_headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{file_name}\"")
            .parse()
            .map_err(|_| HttpError::server_error("Failed to build response headers"))?,
    );

    Ok((response_headers, bytes))
}

/// Issues a short-lived signed URL for inline viewing. Requires the same
/// access as downloading the file itself.
pub async fn sign_view_url(
    Extension(app_state): Extension<Arc<AppState>>,
    cookie_jar: CookieJar,
    headers: HeaderMap,
    Json(body): Json<DownloadFileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let actor = resolve_actor(&app_state, &cookie_jar, &headers, &body).await?;
    let file = authorize_file(&app_state, &actor, &body.file_path).await?;

    match &file {
        StoredFile::Attachment {
            submission_id,
            file_name,
            ..
        } => {
            app_state
                .audit_service
                .log_submission_action_best_effort(
                    *submission_id,
                    actor.actor_type,
                    Some(actor.actor_id),
                    AuditAction::ViewedFile,
                    Some(file_name),
                )
                .await;
        }
        StoredFile::Document { file_name, .. } => {
            app_state
                .audit_service
                .log_event_best_effort(
                    actor.agency_id,
                    Some(actor.actor_id),
                    Some(actor.actor_type.to_str()),
                    "file_viewed",
                    &format!("Viewed {file_name}"),
                    None,
                )
                .await;
        }
    }

    let (url, expires_at) = app_state.storage_service.signed_view_url(&body.file_path);

    Ok(Json(SignedUrlResponseDto {
        status: "success".to_string(),
        url,
        expires_at,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub path: String,
    pub expires: i64,
    pub sig: String,
}

/// Serves a file inline against a valid signature. No session required: the
/// signature is the credential.
pub async fn view_file(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<ViewQuery>,
) -> Result<impl IntoResponse, HttpError> {
    if !app_state
        .storage_service
        .verify_signature(&query.path, query.expires, &query.sig)
    {
        return Err(HttpError::forbidden("Link is invalid or has expired"));
    }

    let bytes = app_state
        .storage_service
        .download(&query.path)
        .await
        .map_err(HttpError::from)?;

    let mime_type = app_state
        .db_client
        .get_attachment_by_path(&query.path)
        .await
        .ok()
        .flatten()
        .map(|a| a.mime_type)
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::CONTENT_TYPE,
        mime_type
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );
    response_headers.insert(
        header::CONTENT_DISPOSITION,
        header::HeaderValue::from_static("inline"),
    );

    Ok((response_headers, bytes))
}

async fn resolve_actor(
    app_state: &Arc<AppState>,
    cookie_jar: &CookieJar,
    headers: &HeaderMap,
    body: &DownloadFileDto,
) -> Result<ActorContext, HttpError> {
    match body.user_type {
        DownloadUserType::Staff => {
            let token_value = cookie_jar
                .get("token")
                .map(|cookie| cookie.value().to_string())
                .or_else(|| {
                    headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.strip_prefix("Bearer ").map(|t| t.to_owned()))
                })
                .ok_or_else(|| {
                    HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string())
                })?;

            let user_id = token::decode_token(token_value, app_state.env.jwt_secret.as_bytes())
                .ok()
                .and_then(|sub| uuid::Uuid::parse_str(&sub).ok())
                .ok_or_else(|| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

            let user = app_state
                .db_client
                .get_user(Some(user_id), None)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?
                .filter(|u| u.is_active)
                .ok_or_else(|| {
                    HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string())
                })?;

            Ok(JWTAuthMiddeware { user }.actor_context())
        }
        DownloadUserType::Client => {
            let session_token = body.session_token.as_deref().ok_or_else(|| {
                HttpError::unauthorized(ErrorMessage::SessionNotProvided.to_string())
            })?;

            let client = app_state
                .db_client
                .get_client_by_session_token(session_token)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?
                .ok_or_else(|| {
                    HttpError::unauthorized(ErrorMessage::InvalidSession.to_string())
                })?;

            Ok(ClientAuthMiddeware { client }.actor_context())
        }
    }
}

/// Maps a stored path to the row that owns it and checks the actor may see
/// it. Unknown paths 404 before any disk access happens.
async fn authorize_file(
    app_state: &Arc<AppState>,
    actor: &ActorContext,
    file_path: &str,
) -> Result<StoredFile, HttpError> {
    if let Some(attachment) = app_state
        .db_client
        .get_attachment_by_path(file_path)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
    {
        let submission = app_state
            .db_client
            .get_submission_of_update(attachment.update_id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?
            .ok_or_else(|| HttpError::not_found("File not found"))?;

        if !actor.is_participant(&submission) {
            return Err(HttpError::forbidden(
                ErrorMessage::PermissionDenied.to_string(),
            ));
        }

        return Ok(StoredFile::Attachment {
            submission_id: submission.id,
            file_name: attachment.file_name,
            mime_type: attachment.mime_type,
        });
    }

    if let Some(document) = app_state
        .db_client
        .get_document_by_path(file_path)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
    {
        let allowed = match actor.actor_type {
            ActorType::Client => document.client_id == actor.actor_id,
            ActorType::Agent | ActorType::AgencyAdmin => {
                if actor.is_super_admin {
                    true
                } else {
                    match actor.agency_id {
                        // Staff may only see documents of clients who have a
                        // submission with their agency.
                        Some(agency_id) => app_state
                            .db_client
                            .agency_has_submission_for(
                                agency_id,
                                document.client_id,
                                document.property_id,
                            )
                            .await
                            .map_err(|e| HttpError::server_error(e.to_string()))?,
                        None => false,
                    }
                }
            }
        };

        if !allowed {
            return Err(HttpError::forbidden(
                ErrorMessage::PermissionDenied.to_string(),
            ));
        }

        return Ok(StoredFile::Document {
            file_name: document.file_name,
            mime_type: document.mime_type,
        });
    }

    Err(HttpError::not_found("File not found"))
}
