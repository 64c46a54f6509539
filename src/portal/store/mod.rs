//! Row store seam. The hosted database sits behind [`RowStore`]; records
//! cross it as JSON field maps and are typed on either side with serde.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::entity::{EntityKind, PortalEntity};
use super::models::ApplicationDocument;
use crate::filter::error::FilterError;

pub use memory::MemoryRowStore;
pub use postgres::PgRowStore;

/// A row as exchanged with the store.
pub type Row = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("Document {0} not found")]
    DocumentNotFound(Uuid),

    #[error("Invalid record data: {0}")]
    InvalidRecord(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait RowStore: Send + Sync {
    /// All rows of one kind in the kind's fixed order.
    async fn list(&self, kind: EntityKind) -> Result<Vec<Row>, StoreError>;

    async fn get_by_id(&self, kind: EntityKind, id: Uuid) -> Result<Option<Row>, StoreError>;

    /// Insert and return the stored row, including generated id and timestamps.
    async fn insert(&self, kind: EntityKind, fields: Row) -> Result<Row, StoreError>;

    /// Replace the given fields in place. Protected columns are never written.
    async fn update(&self, kind: EntityKind, id: Uuid, fields: Row) -> Result<Row, StoreError>;

    /// Privileged: enable or disable a broker account.
    async fn set_account_active(&self, user_id: Uuid, active: bool) -> Result<(), StoreError>;

    async fn insert_document(&self, document: &ApplicationDocument) -> Result<(), StoreError>;

    async fn list_documents(&self, application_id: Uuid) -> Result<Vec<ApplicationDocument>, StoreError>;

    async fn get_document(&self, document_id: Uuid) -> Result<Option<ApplicationDocument>, StoreError>;

    async fn delete_document(&self, document_id: Uuid) -> Result<(), StoreError>;
}

/// Typed view of a row.
pub fn from_row<E: PortalEntity>(row: Row) -> Result<E, StoreError> {
    serde_json::from_value(Value::Object(row))
        .map_err(|e| StoreError::InvalidRecord(format!("{}: {}", E::KIND, e)))
}

/// Field map of a serializable value, minus the kind's protected columns.
pub fn to_row<T: serde::Serialize>(kind: EntityKind, value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(mut map)) => {
            for column in kind.protected_columns() {
                map.remove(*column);
            }
            Ok(map)
        }
        Ok(_) => Err(StoreError::InvalidRecord(format!("{} draft is not an object", kind))),
        Err(e) => Err(StoreError::InvalidRecord(e.to_string())),
    }
}

pub async fn list_records<E: PortalEntity>(store: &dyn RowStore) -> Result<Vec<E>, StoreError> {
    store.list(E::KIND).await?.into_iter().map(from_row::<E>).collect()
}

pub async fn find_record<E: PortalEntity>(store: &dyn RowStore, id: Uuid) -> Result<Option<E>, StoreError> {
    store.get_by_id(E::KIND, id).await?.map(from_row::<E>).transpose()
}

pub async fn fetch_record<E: PortalEntity>(store: &dyn RowStore, id: Uuid) -> Result<E, StoreError> {
    find_record::<E>(store, id)
        .await?
        .ok_or(StoreError::NotFound { kind: E::KIND, id })
}
