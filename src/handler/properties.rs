use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use futures::future::join_all;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::propertydb::PropertyExt,
    dtos::{
        propertydtos::{
            CreatePropertyDto, PropertyData, PropertyListItem, PropertyListResponseDto,
            PropertyResponseDto,
        },
        userdtos::RequestQueryDto,
    },
    error::{ErrorMessage, HttpError},
    middleware::ClientAuthMiddeware,
    models::propertymodel::{DocumentType, PropertyStatus},
    service::storage_service::{content_type_for, decode_base64_payload},
    AppState,
};

pub fn properties_handler() -> Router {
    Router::new()
        .route("/", post(create_property).get(get_my_properties))
        .route("/:property_id/documents", get(get_property_documents))
        .route("/:property_id", axum::routing::delete(delete_property))
}

/// Creates a portfolio property and uploads its paperwork concurrently.
/// The property is created even if some uploads fail; the response carries
/// the failure count so the client can retry the missing files.
pub async fn create_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
    Json(body): Json<CreatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let has_title_deed = body
        .documents
        .iter()
        .any(|d| d.document_type == DocumentType::TitleDeed);
    if !has_title_deed {
        return Err(HttpError::bad_request(
            "A title deed document is required to list a property",
        ));
    }

    // Decode and size-check every payload before creating anything, so a
    // malformed request leaves no partial state behind.
    let mut payloads = Vec::with_capacity(body.documents.len());
    for doc in &body.documents {
        if doc.document_type.is_identity() {
            return Err(HttpError::bad_request(format!(
                "{} belongs in the identity documents flow",
                doc.document_type.to_str()
            )));
        }
        let bytes = decode_base64_payload(&doc.content_base64).map_err(HttpError::from)?;
        if bytes.len() > app_state.env.max_upload_bytes {
            return Err(HttpError::bad_request(
                ErrorMessage::FileTooLarge(app_state.env.max_upload_bytes).to_string(),
            ));
        }
        payloads.push((doc, bytes));
    }

    let property = app_state
        .db_client
        .create_property(auth.client.id, &body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let uploads = payloads.into_iter().map(|(doc, bytes)| {
        let app_state = app_state.clone();
        let client_id = auth.client.id;
        let property_id = property.id;
        async move {
            let path = app_state.storage_service.property_document_path(
                client_id,
                property_id,
                doc.document_type,
                &doc.file_name,
            );
            app_state.storage_service.upload(&path, &bytes).await?;

            let row = app_state
                .db_client
                .save_document(
                    client_id,
                    Some(property_id),
                    doc.document_type,
                    &doc.file_name,
                    &path,
                    bytes.len() as i64,
                    content_type_for(&doc.file_name),
                )
                .await?;
            Ok::<_, crate::service::error::ServiceError>(row)
        }
    });

    let mut documents = Vec::new();
    let mut failed_uploads = 0usize;
    for result in join_all(uploads).await {
        match result {
            Ok(row) => documents.push(row),
            Err(e) => {
                tracing::error!(property_id = %property.id, "document upload failed: {e}");
                failed_uploads += 1;
            }
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(PropertyResponseDto {
            status: "success".to_string(),
            data: PropertyData {
                property,
                documents,
                failed_uploads,
            },
        }),
    ))
}

pub async fn get_my_properties(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    let offset = (page - 1) * limit;

    let properties = app_state
        .db_client
        .get_properties_by_client(auth.client.id, limit as i64, offset as i64)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut items = Vec::with_capacity(properties.len());
    for property in properties {
        let document_count = app_state
            .db_client
            .count_documents_for_property(property.id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;
        items.push(PropertyListItem {
            property,
            document_count,
        });
    }

    Ok(Json(PropertyListResponseDto {
        status: "success".to_string(),
        results: items.len(),
        properties: items,
    }))
}

pub async fn get_property_documents(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .db_client
        .get_property_by_id(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found"))?;

    if property.client_id != auth.client.id {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let documents = app_state
        .db_client
        .get_documents_for_property(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(json!({
        "status": "success",
        "results": documents.len(),
        "documents": documents,
    })))
}

/// Owners can delete a property only while it is still in the portfolio;
/// once submitted it belongs to the shared record.
pub async fn delete_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<ClientAuthMiddeware>,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .db_client
        .get_property_by_id(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found"))?;

    if property.client_id != auth.client.id {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }
    if property.status != PropertyStatus::InPortfolio {
        return Err(HttpError::bad_request(
            "A submitted property can no longer be deleted",
        ));
    }

    // Blobs are removed best-effort after the rows; a leftover file is
    // harmless, a dangling row is not.
    let documents = app_state
        .db_client
        .get_documents_for_property(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .db_client
        .delete_property(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    for doc in documents {
        if let Err(e) = app_state.storage_service.delete(&doc.file_path).await {
            tracing::warn!(path = doc.file_path, "blob cleanup failed: {e}");
        }
    }

    Ok(Json(json!({"status": "success", "message": "Property deleted"})))
}
