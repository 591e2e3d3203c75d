use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "property_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    Villa,
    Townhouse,
    Penthouse,
    Studio,
    Office,
    Retail,
    Warehouse,
    Land,
}

impl PropertyType {
    pub fn to_str(&self) -> &str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::Villa => "villa",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Penthouse => "penthouse",
            PropertyType::Studio => "studio",
            PropertyType::Office => "office",
            PropertyType::Retail => "retail",
            PropertyType::Warehouse => "warehouse",
            PropertyType::Land => "land",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "property_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    InPortfolio,
    Submitted,
    Approved,
    Rejected,
}

impl PropertyStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PropertyStatus::InPortfolio => "in_portfolio",
            PropertyStatus::Submitted => "submitted",
            PropertyStatus::Approved => "approved",
            PropertyStatus::Rejected => "rejected",
        }
    }
}

/// A listing owned by exactly one client. Deletable by the owner only while
/// still in the portfolio (unsubmitted).
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Property {
    pub id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub location: String,
    pub property_type: PropertyType,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqft: Option<f64>,
    pub details: Option<String>,
    pub status: PropertyStatus,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "document_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    TitleDeed,
    PowerOfAttorney,
    Noc,
    Ejari,
    DewaBill,
    EmiratesId,
    Passport,
    Visa,
    NationalId,
    Other,
}

impl DocumentType {
    pub fn to_str(&self) -> &str {
        match self {
            DocumentType::TitleDeed => "title_deed",
            DocumentType::PowerOfAttorney => "power_of_attorney",
            DocumentType::Noc => "noc",
            DocumentType::Ejari => "ejari",
            DocumentType::DewaBill => "dewa_bill",
            DocumentType::EmiratesId => "emirates_id",
            DocumentType::Passport => "passport",
            DocumentType::Visa => "visa",
            DocumentType::NationalId => "national_id",
            DocumentType::Other => "other",
        }
    }

    /// Identity documents live in the identity bucket; everything else is a
    /// property document.
    pub fn is_identity(&self) -> bool {
        matches!(
            self,
            DocumentType::EmiratesId
                | DocumentType::Passport
                | DocumentType::Visa
                | DocumentType::NationalId
        )
    }
}

/// A stored file attached to a property or to a client's identity bundle.
/// Immutable once created except for deletion. The row exists only if the
/// storage write succeeded first.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Document {
    pub id: Uuid,
    pub client_id: Uuid,
    pub property_id: Option<Uuid>,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_document_types() {
        assert!(DocumentType::EmiratesId.is_identity());
        assert!(DocumentType::Passport.is_identity());
        assert!(DocumentType::Visa.is_identity());
        assert!(DocumentType::NationalId.is_identity());
        assert!(!DocumentType::TitleDeed.is_identity());
        assert!(!DocumentType::Ejari.is_identity());
        assert!(!DocumentType::Other.is_identity());
    }

    #[test]
    fn test_enum_str_values() {
        assert_eq!(PropertyStatus::InPortfolio.to_str(), "in_portfolio");
        assert_eq!(PropertyType::Penthouse.to_str(), "penthouse");
        assert_eq!(DocumentType::DewaBill.to_str(), "dewa_bill");
    }
}
