use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::{
    db::{clientdb::ClientExt, propertydb::PropertyExt},
    dtos::{
        clientdtos::{FilterClientDto, UpdateClientProfileDto},
        propertydtos::IdentityDocumentsDto,
    },
    error::{ErrorMessage, HttpError},
    middleware::ClientAuthMiddeware,
    service::storage_service::{content_type_for, decode_base64_payload},
    AppState,
};

pub fn clients_handler() -> Router {
    Router::new()
        .route("/me", get(get_me).put(update_profile))
        .route(
            "/identity-documents",
            post(upload_identity_documents).get(get_identity_documents),
        )
        .route(
            "/identity-documents/:document_id",
            axum::routing::delete(delete_identity_document),
        )
}

pub async fn get_me(
    Extension(_app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(json!({
        "status": "success",
        "data": { "client": FilterClientDto::filter_client(&auth.client) },
    })))
}

pub async fn update_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
    Json(body): Json<UpdateClientProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let client = app_state
        .db_client
        .update_client_profile(
            auth.client.id,
            body.full_name.as_deref(),
            body.email.as_deref(),
            body.onboarding_complete,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(json!({
        "status": "success",
        "data": { "client": FilterClientDto::filter_client(&client) },
    })))
}

/// Stores identity files in the identity bucket. Only identity document
/// types are accepted here; property paperwork goes through the property
/// endpoints.
pub async fn upload_identity_documents(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
    Json(body): Json<IdentityDocumentsDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if body.documents.is_empty() {
        return Err(HttpError::bad_request("At least one document is required"));
    }

    for doc in &body.documents {
        if !doc.document_type.is_identity() {
            return Err(HttpError::bad_request(format!(
                "{} is not an identity document type",
                doc.document_type.to_str()
            )));
        }
    }

    let mut saved = Vec::with_capacity(body.documents.len());
    for doc in &body.documents {
        let bytes = decode_base64_payload(&doc.content_base64).map_err(HttpError::from)?;
        if bytes.len() > app_state.env.max_upload_bytes {
            return Err(HttpError::bad_request(
                ErrorMessage::FileTooLarge(app_state.env.max_upload_bytes).to_string(),
            ));
        }

        let path = app_state.storage_service.identity_document_path(
            auth.client.id,
            doc.document_type,
            &doc.file_name,
        );
        app_state
            .storage_service
            .upload(&path, &bytes)
            .await
            .map_err(HttpError::from)?;

        let row = app_state
            .db_client
            .save_document(
                auth.client.id,
                None,
                doc.document_type,
                &doc.file_name,
                &path,
                bytes.len() as i64,
                content_type_for(&doc.file_name),
            )
            .await
            .map_err(|e| {
                tracing::error!(path, "orphaned identity blob, row insert failed: {e}");
                HttpError::server_error(e.to_string())
            })?;

        saved.push(row);
    }

    app_state
        .audit_service
        .log_event_best_effort(
            auth.client.agency_id,
            Some(auth.client.id),
            Some("client"),
            "identity_documents_uploaded",
            &format!("Uploaded {} identity document(s)", saved.len()),
            None,
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "results": saved.len(),
            "documents": saved,
        })),
    ))
}

pub async fn get_identity_documents(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let documents = app_state
        .db_client
        .get_identity_documents_for_client(auth.client.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(json!({
        "status": "success",
        "results": documents.len(),
        "documents": documents,
    })))
}

/// Lets a client replace a bad scan. Only loose identity documents can be
/// removed; property paperwork lives with its property.
pub async fn delete_identity_document(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
    axum::extract::Path(document_id): axum::extract::Path<uuid::Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let documents = app_state
        .db_client
        .get_identity_documents_for_client(auth.client.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let document = documents
        .into_iter()
        .find(|d| d.id == document_id)
        .ok_or_else(|| HttpError::not_found("Document not found"))?;

    app_state
        .db_client
        .delete_document(document.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Row first, blob best-effort; a leftover file is harmless.
    if let Err(e) = app_state.storage_service.delete(&document.file_path).await {
        tracing::warn!(path = document.file_path, "blob cleanup failed: {e}");
    }

    Ok(Json(json!({"status": "success", "message": "Document deleted"})))
}
