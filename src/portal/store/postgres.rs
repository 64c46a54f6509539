use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::{Row, RowStore, StoreError};
use crate::database::{query, DatabaseManager};
use crate::filter::{Filter, SqlParam};
use crate::portal::entity::EntityKind;
use crate::portal::models::ApplicationDocument;

const DOCUMENTS_TABLE: &str = "application_documents";

/// Row store over the portal's Postgres schema. Rows are read and written as
/// JSON so the typed layer above never sees `sqlx` rows.
#[derive(Clone)]
pub struct PgRowStore {
    db: DatabaseManager,
}

impl PgRowStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &DatabaseManager {
        &self.db
    }

    fn by_id(table: &str, id: Uuid) -> Result<Filter, StoreError> {
        let mut filter = Filter::new(table)?;
        filter.where_eq("id", SqlParam::Uuid(id))?;
        Ok(filter)
    }

    fn writable_columns(kind: EntityKind, fields: &Row) -> Vec<String> {
        fields
            .keys()
            .filter(|k| !kind.protected_columns().contains(&k.as_str()))
            .cloned()
            .collect()
    }

    fn document_from_row(row: Row) -> Result<ApplicationDocument, StoreError> {
        serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::InvalidRecord(e.to_string()))
    }
}

#[async_trait]
impl RowStore for PgRowStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Row>, StoreError> {
        let mut filter = Filter::new(kind.table())?;
        filter.order(kind.list_order())?;
        Ok(query::fetch_rows(self.db.pool(), &filter.to_sql()).await?)
    }

    async fn get_by_id(&self, kind: EntityKind, id: Uuid) -> Result<Option<Row>, StoreError> {
        let sql = Self::by_id(kind.table(), id)?.to_sql();
        Ok(query::fetch_optional_row(self.db.pool(), &sql).await?)
    }

    async fn insert(&self, kind: EntityKind, fields: Row) -> Result<Row, StoreError> {
        // Owner and identity columns are protected from updates but may be
        // set once on insert.
        let mut columns: Vec<String> = fields
            .keys()
            .filter(|k| !matches!(k.as_str(), "created_at" | "updated_at"))
            .cloned()
            .collect();
        columns.sort();
        if columns.is_empty() {
            return Err(StoreError::InvalidRecord(format!("{} insert has no fields", kind)));
        }

        let sql = Filter::new(kind.table())?.to_insert_sql(&columns, SqlParam::Json(Value::Object(fields)))?;
        query::fetch_optional_row(self.db.pool(), &sql)
            .await?
            .ok_or_else(|| StoreError::QueryError(format!("{} insert returned no row", kind)))
    }

    async fn update(&self, kind: EntityKind, id: Uuid, fields: Row) -> Result<Row, StoreError> {
        let mut columns = Self::writable_columns(kind, &fields);
        columns.sort();

        let filter = Self::by_id(kind.table(), id)?;
        if columns.is_empty() {
            return query::fetch_optional_row(self.db.pool(), &filter.to_sql())
                .await?
                .ok_or(StoreError::NotFound { kind, id });
        }

        let sql = filter.to_update_sql(&columns, SqlParam::Json(Value::Object(fields)))?;
        query::fetch_optional_row(self.db.pool(), &sql)
            .await?
            .ok_or(StoreError::NotFound { kind, id })
    }

    async fn set_account_active(&self, user_id: Uuid, active: bool) -> Result<(), StoreError> {
        let mut payload = Row::new();
        payload.insert("is_active".into(), Value::Bool(active));

        let sql = Self::by_id(EntityKind::Broker.table(), user_id)?
            .to_update_sql(&["is_active".to_string()], SqlParam::Json(Value::Object(payload)))?;
        match query::fetch_optional_row(self.db.pool(), &sql).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { kind: EntityKind::Broker, id: user_id }),
        }
    }

    async fn insert_document(&self, document: &ApplicationDocument) -> Result<(), StoreError> {
        let payload = match serde_json::to_value(document) {
            Ok(Value::Object(map)) => map,
            _ => return Err(StoreError::InvalidRecord("document is not an object".to_string())),
        };
        let mut columns: Vec<String> = payload.keys().cloned().collect();
        columns.sort();

        let sql = Filter::new(DOCUMENTS_TABLE)?.to_insert_sql(&columns, SqlParam::Json(Value::Object(payload)))?;
        query::execute(self.db.pool(), &sql).await?;
        Ok(())
    }

    async fn list_documents(&self, application_id: Uuid) -> Result<Vec<ApplicationDocument>, StoreError> {
        let mut filter = Filter::new(DOCUMENTS_TABLE)?;
        filter.where_eq("application_id", SqlParam::Uuid(application_id))?;
        filter.order("created_at desc")?;

        query::fetch_rows(self.db.pool(), &filter.to_sql())
            .await?
            .into_iter()
            .map(Self::document_from_row)
            .collect()
    }

    async fn get_document(&self, document_id: Uuid) -> Result<Option<ApplicationDocument>, StoreError> {
        let sql = Self::by_id(DOCUMENTS_TABLE, document_id)?.to_sql();
        query::fetch_optional_row(self.db.pool(), &sql)
            .await?
            .map(Self::document_from_row)
            .transpose()
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<(), StoreError> {
        let sql = Self::by_id(DOCUMENTS_TABLE, document_id)?.to_delete_sql();
        match query::execute(self.db.pool(), &sql).await? {
            0 => Err(StoreError::DocumentNotFound(document_id)),
            _ => Ok(()),
        }
    }
}
