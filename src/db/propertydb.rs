use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::{
    dtos::propertydtos::CreatePropertyDto,
    models::propertymodel::{Document, DocumentType, Property, PropertyStatus},
};

#[async_trait]
pub trait PropertyExt {
    async fn create_property(
        &self,
        client_id: Uuid,
        property_data: &CreatePropertyDto,
    ) -> Result<Property, Error>;

    async fn get_property_by_id(&self, property_id: Uuid) -> Result<Option<Property>, Error>;

    async fn get_properties_by_client(
        &self,
        client_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, Error>;

    async fn update_property_status(
        &self,
        property_id: Uuid,
        status: PropertyStatus,
    ) -> Result<Property, Error>;

    /// Deletes the property and its document rows. Callers must have already
    /// verified ownership and `in_portfolio` status.
    async fn delete_property(&self, property_id: Uuid) -> Result<(), Error>;

    async fn save_document(
        &self,
        client_id: Uuid,
        property_id: Option<Uuid>,
        document_type: DocumentType,
        file_name: &str,
        file_path: &str,
        file_size: i64,
        mime_type: &str,
    ) -> Result<Document, Error>;

    /// Per-property document tally for list views.
    async fn count_documents_for_property(&self, property_id: Uuid) -> Result<i64, Error>;

    /// Path lookup for the download endpoint; paths are unique by
    /// construction (timestamped).
    async fn get_document_by_path(&self, file_path: &str) -> Result<Option<Document>, Error>;

    async fn get_documents_for_property(&self, property_id: Uuid)
        -> Result<Vec<Document>, Error>;

    async fn get_identity_documents_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Document>, Error>;

    async fn delete_document(&self, document_id: Uuid) -> Result<(), Error>;
}

#[async_trait]
impl PropertyExt for DBClient {
    async fn create_property(
        &self,
        client_id: Uuid,
        property_data: &CreatePropertyDto,
    ) -> Result<Property, Error> {
        sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties (
                client_id, title, location, property_type, bedrooms, bathrooms,
                area_sqft, details, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'in_portfolio'::property_status)
            RETURNING id, client_id, title, location, property_type, bedrooms,
                      bathrooms, area_sqft, details, status, created_at, updated_at
            "#,
        )
        .bind(client_id)
        .bind(&property_data.title)
        .bind(&property_data.location)
        .bind(property_data.property_type)
        .bind(property_data.bedrooms)
        .bind(property_data.bathrooms)
        .bind(property_data.area_sqft)
        .bind(&property_data.details)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_property_by_id(&self, property_id: Uuid) -> Result<Option<Property>, Error> {
        sqlx::query_as::<_, Property>(
            r#"
            SELECT id, client_id, title, location, property_type, bedrooms,
                   bathrooms, area_sqft, details, status, created_at, updated_at
            FROM properties
            WHERE id = $1
            "#,
        )
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_properties_by_client(
        &self,
        client_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, Error> {
        sqlx::query_as::<_, Property>(
            r#"
            SELECT id, client_id, title, location, property_type, bedrooms,
                   bathrooms, area_sqft, details, status, created_at, updated_at
            FROM properties
            WHERE client_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(client_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_property_status(
        &self,
        property_id: Uuid,
        status: PropertyStatus,
    ) -> Result<Property, Error> {
        sqlx::query_as::<_, Property>(
            r#"
            UPDATE properties
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, client_id, title, location, property_type, bedrooms,
                      bathrooms, area_sqft, details, status, created_at, updated_at
            "#,
        )
        .bind(status)
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_property(&self, property_id: Uuid) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM documents WHERE property_id = $1")
            .bind(property_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(property_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn save_document(
        &self,
        client_id: Uuid,
        property_id: Option<Uuid>,
        document_type: DocumentType,
        file_name: &str,
        file_path: &str,
        file_size: i64,
        mime_type: &str,
    ) -> Result<Document, Error> {
        sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (
                client_id, property_id, document_type, file_name, file_path,
                file_size, mime_type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, client_id, property_id, document_type, file_name,
                      file_path, file_size, mime_type, uploaded_at
            "#,
        )
        .bind(client_id)
        .bind(property_id)
        .bind(document_type)
        .bind(file_name)
        .bind(file_path)
        .bind(file_size)
        .bind(mime_type)
        .fetch_one(&self.pool)
        .await
    }

    async fn count_documents_for_property(&self, property_id: Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM documents
            WHERE property_id = $1
            "#,
        )
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_document_by_path(&self, file_path: &str) -> Result<Option<Document>, Error> {
        sqlx::query_as::<_, Document>(
            r#"
            SELECT id, client_id, property_id, document_type, file_name,
                   file_path, file_size, mime_type, uploaded_at
            FROM documents
            WHERE file_path = $1
            "#,
        )
        .bind(file_path)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_documents_for_property(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<Document>, Error> {
        sqlx::query_as::<_, Document>(
            r#"
            SELECT id, client_id, property_id, document_type, file_name,
                   file_path, file_size, mime_type, uploaded_at
            FROM documents
            WHERE property_id = $1
            ORDER BY uploaded_at ASC
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_identity_documents_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Document>, Error> {
        sqlx::query_as::<_, Document>(
            r#"
            SELECT id, client_id, property_id, document_type, file_name,
                   file_path, file_size, mime_type, uploaded_at
            FROM documents
            WHERE client_id = $1 AND property_id IS NULL
            ORDER BY uploaded_at ASC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<(), Error> {
        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
