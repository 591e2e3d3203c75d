use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::fs;
use uuid::Uuid;

use crate::{
    models::propertymodel::DocumentType,
    service::error::ServiceError,
};

pub const PROPERTY_DOCUMENTS_BUCKET: &str = "property-documents";
pub const IDENTITY_DOCUMENTS_BUCKET: &str = "identity-documents";
pub const SUBMISSION_ATTACHMENTS_BUCKET: &str = "submission-attachments";

/// Disk-backed blob store. Every stored path is relative to `root` and starts
/// with one of the three bucket prefixes; the path string is what gets
/// persisted in document/attachment rows.
#[derive(Debug, Clone)]
pub struct StorageService {
    root: PathBuf,
    max_upload_bytes: usize,
    url_secret: String,
    app_url: String,
    signed_url_ttl_secs: i64,
}

impl StorageService {
    pub fn new(
        root: impl Into<PathBuf>,
        max_upload_bytes: usize,
        url_secret: impl Into<String>,
        app_url: impl Into<String>,
        signed_url_ttl_secs: i64,
    ) -> Self {
        Self {
            root: root.into(),
            max_upload_bytes,
            url_secret: url_secret.into(),
            app_url: app_url.into(),
            signed_url_ttl_secs,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// `{bucket}/{clientId}/{propertyId}/{docType}_{timestamp}.{ext}`
    pub fn property_document_path(
        &self,
        client_id: Uuid,
        property_id: Uuid,
        document_type: DocumentType,
        file_name: &str,
    ) -> String {
        let ext = extension_of(file_name);
        format!(
            "{PROPERTY_DOCUMENTS_BUCKET}/{client_id}/{property_id}/{}_{}.{ext}",
            document_type.to_str(),
            Utc::now().timestamp_millis(),
        )
    }

    /// `{bucket}/{clientId}/{docType}_{timestamp}.{ext}`
    pub fn identity_document_path(
        &self,
        client_id: Uuid,
        document_type: DocumentType,
        file_name: &str,
    ) -> String {
        let ext = extension_of(file_name);
        format!(
            "{IDENTITY_DOCUMENTS_BUCKET}/{client_id}/{}_{}.{ext}",
            document_type.to_str(),
            Utc::now().timestamp_millis(),
        )
    }

    /// `{bucket}/submissions/{submissionId}/updates/{timestamp}-{filename}`
    pub fn attachment_path(&self, submission_id: Uuid, file_name: &str) -> String {
        format!(
            "{SUBMISSION_ATTACHMENTS_BUCKET}/submissions/{submission_id}/updates/{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(file_name),
        )
    }

    /// Writes the blob, creating parent directories as needed. The size
    /// ceiling is enforced here again even though callers check it before
    /// decoding.
    pub async fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), ServiceError> {
        if bytes.len() > self.max_upload_bytes {
            return Err(ServiceError::FileTooLarge(path.to_string()));
        }

        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&full, bytes).await?;
        Ok(())
    }

    pub async fn download(&self, path: &str) -> Result<Vec<u8>, ServiceError> {
        let full = self.resolve(path)?;
        match fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ServiceError::FileNotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, path: &str) -> Result<(), ServiceError> {
        let full = self.resolve(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Short-lived view link for inline rendering. The signature binds the
    /// path and expiry so neither can be swapped.
    pub fn signed_view_url(&self, path: &str) -> (String, i64) {
        let expires_at = Utc::now().timestamp() + self.signed_url_ttl_secs;
        let sig = self.signature(path, expires_at);
        let url = format!(
            "{}/api/files/view?path={}&expires={}&sig={}",
            self.app_url, path, expires_at, sig
        );
        (url, expires_at)
    }

    pub fn verify_signature(&self, path: &str, expires_at: i64, sig: &str) -> bool {
        if Utc::now().timestamp() > expires_at {
            return false;
        }
        self.signature(path, expires_at) == sig
    }

    fn signature(&self, path: &str, expires_at: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{path}|{expires_at}|{}", self.url_secret));
        hex::encode(hasher.finalize())
    }

    /// Joins under the root, rejecting traversal components so a stored path
    /// can never escape the storage directory.
    fn resolve(&self, path: &str) -> Result<PathBuf, ServiceError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes {
            return Err(ServiceError::FileNotFound(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

/// Decodes an inline file payload, tolerating a `data:...;base64,` prefix.
pub fn decode_base64_payload(content: &str) -> Result<Vec<u8>, ServiceError> {
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    let raw = match content.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => content,
    };

    STANDARD
        .decode(raw.trim())
        .map_err(|_| ServiceError::InvalidFilePayload)
}

/// Strips directory parts and replaces anything outside a safe charset.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}

/// Content type from the file extension; storage keeps no metadata of its own.
pub fn content_type_for(file_name: &str) -> &'static str {
    match extension_of(file_name).as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(root: &Path) -> StorageService {
        StorageService::new(root, 1024, "test-secret", "http://localhost:8000", 300)
    }

    #[tokio::test]
    async fn test_upload_download_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(dir.path());

        let path = storage.attachment_path(Uuid::new_v4(), "deed.pdf");
        storage.upload(&path, b"contents").await.unwrap();

        let bytes = storage.download(&path).await.unwrap();
        assert_eq!(bytes, b"contents");
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_payload() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(dir.path());

        let big = vec![0u8; 2048];
        let err = storage.upload("property-documents/x", &big).await.unwrap_err();
        assert!(matches!(err, ServiceError::FileTooLarge(_)));
    }

    #[tokio::test]
    async fn test_download_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(dir.path());

        let err = storage.download("identity-documents/nope.pdf").await.unwrap_err();
        assert!(matches!(err, ServiceError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(dir.path());

        let err = storage.download("../outside.txt").await.unwrap_err();
        assert!(matches!(err, ServiceError::FileNotFound(_)));
    }

    #[test]
    fn test_signed_url_verifies_and_expires() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(dir.path());

        let path = "property-documents/a/b/title_deed_1.pdf";
        let (url, expires_at) = storage.signed_view_url(path);
        let sig = url.rsplit("sig=").next().unwrap();

        assert!(storage.verify_signature(path, expires_at, sig));
        // Tampered path fails
        assert!(!storage.verify_signature("identity-documents/other", expires_at, sig));
        // Expired timestamp fails even with a matching signature input
        assert!(!storage.verify_signature(path, Utc::now().timestamp() - 10, sig));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("My Deed (final).pdf"), "My_Deed__final_.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("///"), "file");
    }

    #[test]
    fn test_path_contracts() {
        let dir = tempfile::tempdir().unwrap();
        let storage = service(dir.path());
        let client = Uuid::new_v4();
        let property = Uuid::new_v4();
        let submission = Uuid::new_v4();

        let p = storage.property_document_path(client, property, DocumentType::TitleDeed, "a.PDF");
        assert!(p.starts_with(&format!("property-documents/{client}/{property}/title_deed_")));
        assert!(p.ends_with(".pdf"));

        let i = storage.identity_document_path(client, DocumentType::Passport, "scan.jpg");
        assert!(i.starts_with(&format!("identity-documents/{client}/passport_")));

        let a = storage.attachment_path(submission, "bank statement.pdf");
        assert!(a.starts_with(&format!(
            "submission-attachments/submissions/{submission}/updates/"
        )));
        assert!(a.ends_with("-bank_statement.pdf"));
    }

    #[test]
    fn test_decode_base64_payload() {
        assert_eq!(decode_base64_payload("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(
            decode_base64_payload("data:application/pdf;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
        assert!(matches!(
            decode_base64_payload("not base64!!!").unwrap_err(),
            ServiceError::InvalidFilePayload
        ));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("deed.pdf"), "application/pdf");
        assert_eq!(content_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("unknown.xyz"), "application/octet-stream");
    }
}
