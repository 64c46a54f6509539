//! Application document attachments: blob storage plus metadata rows.

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::PortalError;
use super::models::{Application, ApplicationDocument};
use super::session::Session;
use super::store::{fetch_record, RowStore, StoreError};

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid blob key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError>;
    async fn delete(&self, key: &str) -> Result<(), BlobError>;
}

/// Blobs as files under a root directory; keys map to relative paths.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(key);
        let clean = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !clean {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

fn not_found(key: &str) -> impl FnOnce(std::io::Error) -> BlobError + '_ {
    move |e| match e.kind() {
        std::io::ErrorKind::NotFound => BlobError::NotFound(key.to_string()),
        _ => BlobError::Io(e),
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError> {
        let dest = self.path_for(key)?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&dest, bytes).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let path = self.path_for(key)?;
        tokio::fs::read(&path).await.map_err(not_found(key))
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.path_for(key)?;
        tokio::fs::remove_file(&path).await.map_err(not_found(key))
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.blobs.read().await.contains_key(key)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError> {
        self.blobs.write().await.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        self.blobs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        self.blobs
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub fn document_key(application_id: Uuid, document_id: Uuid, file_name: &str) -> String {
    format!("applications/{}/{}/{}", application_id, document_id, file_name)
}

/// Basename of a client-supplied file name with anything outside
/// `[A-Za-z0-9._-]` replaced by `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

pub async fn list_documents(
    store: &dyn RowStore,
    application_id: Uuid,
) -> Result<Vec<ApplicationDocument>, PortalError> {
    fetch_record::<Application>(store, application_id).await?;
    Ok(store.list_documents(application_id).await?)
}

/// Store the blob, then its metadata row. A metadata failure removes the
/// blob again.
pub async fn upload_document(
    store: &dyn RowStore,
    blobs: &dyn BlobStore,
    session: &Session,
    application_id: Uuid,
    upload: DocumentUpload,
    max_bytes: usize,
) -> Result<ApplicationDocument, PortalError> {
    if upload.bytes.is_empty() {
        return Err(PortalError::Validation("Uploaded file is empty".to_string()));
    }
    if upload.bytes.len() > max_bytes {
        return Err(PortalError::Validation(format!("File exceeds the {} byte limit", max_bytes)));
    }
    fetch_record::<Application>(store, application_id).await?;

    let id = Uuid::new_v4();
    let file_name = sanitize_file_name(&upload.file_name);
    let storage_path = document_key(application_id, id, &file_name);
    let content_type = if upload.content_type.trim().is_empty() {
        "application/octet-stream".to_string()
    } else {
        upload.content_type
    };

    let document = ApplicationDocument {
        id,
        application_id,
        file_name,
        content_type,
        size_bytes: upload.bytes.len() as i64,
        checksum: sha256_hex(&upload.bytes),
        storage_path,
        uploaded_by: session.user_id,
        created_at: Utc::now(),
    };

    blobs.put(&document.storage_path, &upload.bytes).await?;
    if let Err(e) = store.insert_document(&document).await {
        if let Err(cleanup) = blobs.delete(&document.storage_path).await {
            warn!("Orphaned blob {}: {}", document.storage_path, cleanup);
        }
        return Err(e.into());
    }

    info!("Stored document {} ({} bytes) on application {}", id, document.size_bytes, application_id);
    Ok(document)
}

/// Metadata for a document, only if it belongs to the given application.
pub async fn find_document(
    store: &dyn RowStore,
    application_id: Uuid,
    document_id: Uuid,
) -> Result<ApplicationDocument, PortalError> {
    match store.get_document(document_id).await? {
        Some(doc) if doc.application_id == application_id => Ok(doc),
        _ => Err(StoreError::DocumentNotFound(document_id).into()),
    }
}

pub async fn download_document(
    store: &dyn RowStore,
    blobs: &dyn BlobStore,
    application_id: Uuid,
    document_id: Uuid,
) -> Result<(ApplicationDocument, Vec<u8>), PortalError> {
    let document = find_document(store, application_id, document_id).await?;
    let bytes = blobs.get(&document.storage_path).await?;
    Ok((document, bytes))
}

/// Remove the blob and the metadata row. A blob that is already gone does not
/// block removing the row.
pub async fn delete_document(
    store: &dyn RowStore,
    blobs: &dyn BlobStore,
    application_id: Uuid,
    document_id: Uuid,
) -> Result<(), PortalError> {
    let document = find_document(store, application_id, document_id).await?;
    match blobs.delete(&document.storage_path).await {
        Ok(()) | Err(BlobError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }
    store.delete_document(document_id).await?;
    info!("Deleted document {} from application {}", document_id, application_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::models::{ApplicationDraft, BrokerRole, Client, ClientDraft};
    use crate::portal::records::create_record;
    use crate::portal::store::MemoryRowStore;
    use rust_decimal::Decimal;

    fn session() -> Session {
        Session { user_id: Uuid::new_v4(), email: "b@kr.test".into(), role: BrokerRole::Broker }
    }

    async fn application(store: &MemoryRowStore, session: &Session) -> Application {
        let client: Client = create_record(
            store,
            session,
            &ClientDraft { full_name: "Jane".into(), ..Default::default() },
        )
        .await
        .unwrap();
        create_record(
            store,
            session,
            &ApplicationDraft {
                client_id: Some(client.id),
                loan_amount: Decimal::new(450_000, 0),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    fn upload(name: &str, bytes: &[u8]) -> DocumentUpload {
        DocumentUpload { file_name: name.into(), content_type: "application/pdf".into(), bytes: bytes.to_vec() }
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\T4 2024.pdf"), "T4_2024.pdf");
        assert_eq!(sanitize_file_name("..."), "file");
    }

    #[test]
    fn fs_keys_must_be_relative() {
        let fs = FsBlobStore::new("/tmp/kr");
        assert!(fs.path_for("applications/a/b/c.pdf").is_ok());
        assert!(fs.path_for("../escape").is_err());
        assert!(fs.path_for("/abs").is_err());
    }

    #[tokio::test]
    async fn upload_download_delete() {
        let store = MemoryRowStore::new();
        let blobs = MemoryBlobStore::new();
        let session = session();
        let app = application(&store, &session).await;

        let doc = upload_document(&store, &blobs, &session, app.id, upload("pay stub.pdf", b"%PDF-1.7"), 1024)
            .await
            .unwrap();
        assert_eq!(doc.storage_path, format!("applications/{}/{}/pay_stub.pdf", app.id, doc.id));
        assert_eq!(doc.checksum, sha256_hex(b"%PDF-1.7"));
        assert_eq!(doc.uploaded_by, session.user_id);
        assert_eq!(list_documents(&store, app.id).await.unwrap().len(), 1);

        let (_, bytes) = download_document(&store, &blobs, app.id, doc.id).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.7");

        delete_document(&store, &blobs, app.id, doc.id).await.unwrap();
        assert!(!blobs.contains(&doc.storage_path).await);
        assert!(store.get_document(doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_empty_and_oversized() {
        let store = MemoryRowStore::new();
        let blobs = MemoryBlobStore::new();
        let session = session();
        let app = application(&store, &session).await;

        let empty = upload_document(&store, &blobs, &session, app.id, upload("a.pdf", b""), 10).await;
        assert!(matches!(empty, Err(PortalError::Validation(_))));
        let big = upload_document(&store, &blobs, &session, app.id, upload("a.pdf", &[0u8; 11]), 10).await;
        assert!(matches!(big, Err(PortalError::Validation(_))));
    }

    #[tokio::test]
    async fn documents_are_scoped_to_their_application() {
        let store = MemoryRowStore::new();
        let blobs = MemoryBlobStore::new();
        let session = session();
        let app = application(&store, &session).await;
        let other = application(&store, &session).await;

        let doc = upload_document(&store, &blobs, &session, app.id, upload("a.pdf", b"x"), 10).await.unwrap();
        let err = download_document(&store, &blobs, other.id, doc.id).await.unwrap_err();
        assert!(matches!(err, PortalError::Store(StoreError::DocumentNotFound(_))));
    }

    #[tokio::test]
    async fn upload_to_missing_application_fails() {
        let store = MemoryRowStore::new();
        let blobs = MemoryBlobStore::new();
        let err = upload_document(&store, &blobs, &session(), Uuid::new_v4(), upload("a.pdf", b"x"), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Store(StoreError::NotFound { .. })));
    }
}
