use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::propertymodel::{Document, DocumentType, Property};

/// One file carried inline as base64. The decoded size is checked against the
/// upload ceiling before anything touches disk.
#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct DocumentUploadDto {
    #[serde(rename = "documentType")]
    pub document_type: DocumentType,

    #[validate(length(min = 1, max = 255, message = "File name is required"))]
    #[serde(rename = "fileName")]
    pub file_name: String,

    #[validate(length(min = 1, message = "File content is required"))]
    #[serde(rename = "contentBase64")]
    pub content_base64: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreatePropertyDto {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,

    #[serde(rename = "propertyType")]
    pub property_type: crate::models::propertymodel::PropertyType,

    #[validate(range(min = 0, max = 50))]
    pub bedrooms: Option<i32>,

    #[validate(range(min = 0, max = 50))]
    pub bathrooms: Option<i32>,

    #[validate(range(min = 0.0))]
    #[serde(rename = "areaSqft")]
    pub area_sqft: Option<f64>,

    pub details: Option<String>,

    /// Must contain at least one title deed; enforced in the handler so the
    /// error carries a domain message rather than a validator one.
    #[validate]
    pub documents: Vec<DocumentUploadDto>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct IdentityDocumentsDto {
    /// Emptiness is checked in the handler.
    #[validate]
    pub documents: Vec<DocumentUploadDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyData {
    pub property: Property,
    pub documents: Vec<Document>,
    /// Files that were accepted but failed to store; the property itself is
    /// still created.
    #[serde(rename = "failedUploads")]
    pub failed_uploads: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyResponseDto {
    pub status: String,
    pub data: PropertyData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyListItem {
    #[serde(flatten)]
    pub property: Property,
    #[serde(rename = "documentCount")]
    pub document_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyListResponseDto {
    pub status: String,
    pub properties: Vec<PropertyListItem>,
    pub results: usize,
}
