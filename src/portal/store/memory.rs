use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Row, RowStore, StoreError};
use crate::filter::filter_order::FilterOrder;
use crate::filter::types::SortDirection;
use crate::portal::entity::EntityKind;
use crate::portal::models::ApplicationDocument;

/// Process-local row store used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryRowStore {
    tables: RwLock<HashMap<EntityKind, Vec<Row>>>,
    documents: RwLock<Vec<ApplicationDocument>>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row verbatim, including id and system columns.
    pub async fn seed(&self, kind: EntityKind, row: Row) {
        self.tables.write().await.entry(kind).or_default().push(row);
    }

    fn now() -> Value {
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    fn row_id(row: &Row) -> Option<Uuid> {
        row.get("id").and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok())
    }

    fn defaults(kind: EntityKind) -> Row {
        let mut row = Row::new();
        if matches!(kind, EntityKind::Broker | EntityKind::Lender) {
            row.insert("is_active".into(), Value::Bool(true));
        }
        row
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Row>, StoreError> {
        let order = FilterOrder::validate_and_parse(kind.list_order())?;
        let rows = self.tables.read().await.get(&kind).cloned().unwrap_or_default();

        // Ties go to the later insert, so equal timestamps still list newest first.
        let mut indexed: Vec<(usize, Row)> = rows.into_iter().enumerate().collect();
        indexed.sort_by(|(ia, a), (ib, b)| {
            order
                .iter()
                .map(|info| {
                    let ord = compare_values(a.get(&info.column), b.get(&info.column));
                    match info.sort {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or_else(|| ib.cmp(ia))
        });
        Ok(indexed.into_iter().map(|(_, row)| row).collect())
    }

    async fn get_by_id(&self, kind: EntityKind, id: Uuid) -> Result<Option<Row>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&kind)
            .and_then(|rows| rows.iter().find(|row| Self::row_id(row) == Some(id)))
            .cloned())
    }

    async fn insert(&self, kind: EntityKind, fields: Row) -> Result<Row, StoreError> {
        let mut row = Self::defaults(kind);
        let id = fields
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        row.extend(fields);
        row.insert("id".into(), Value::String(id.to_string()));
        let now = Self::now();
        row.insert("created_at".into(), now.clone());
        row.insert("updated_at".into(), now);

        self.tables.write().await.entry(kind).or_default().push(row.clone());
        tracing::debug!("memory store: inserted {} {}", kind, id);
        Ok(row)
    }

    async fn update(&self, kind: EntityKind, id: Uuid, fields: Row) -> Result<Row, StoreError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(&kind)
            .and_then(|rows| rows.iter_mut().find(|row| Self::row_id(row) == Some(id)))
            .ok_or(StoreError::NotFound { kind, id })?;

        for (key, value) in fields {
            if !kind.protected_columns().contains(&key.as_str()) {
                row.insert(key, value);
            }
        }
        row.insert("updated_at".into(), Self::now());
        Ok(row.clone())
    }

    async fn set_account_active(&self, user_id: Uuid, active: bool) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(&EntityKind::Broker)
            .and_then(|rows| rows.iter_mut().find(|row| Self::row_id(row) == Some(user_id)))
            .ok_or(StoreError::NotFound { kind: EntityKind::Broker, id: user_id })?;

        row.insert("is_active".into(), Value::Bool(active));
        row.insert("updated_at".into(), Self::now());
        Ok(())
    }

    async fn insert_document(&self, document: &ApplicationDocument) -> Result<(), StoreError> {
        self.documents.write().await.push(document.clone());
        Ok(())
    }

    async fn list_documents(&self, application_id: Uuid) -> Result<Vec<ApplicationDocument>, StoreError> {
        let mut docs: Vec<_> = self
            .documents
            .read()
            .await
            .iter()
            .filter(|d| d.application_id == application_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }

    async fn get_document(&self, document_id: Uuid) -> Result<Option<ApplicationDocument>, StoreError> {
        Ok(self.documents.read().await.iter().find(|d| d.id == document_id).cloned())
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<(), StoreError> {
        let mut docs = self.documents.write().await;
        let before = docs.len();
        docs.retain(|d| d.id != document_id);
        if docs.len() == before {
            return Err(StoreError::DocumentNotFound(document_id));
        }
        Ok(())
    }
}

/// Ordering for JSON scalars: nulls last, numbers numerically, strings
/// case-insensitively without allocating.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.filter(|v| !v.is_null()), b.filter(|v| !v.is_null())) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(y.chars().flat_map(char::to_lowercase)),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamps() {
        let store = MemoryRowStore::new();
        let stored = store.insert(EntityKind::Lender, row(json!({"name": "First Bank"}))).await.unwrap();
        assert!(MemoryRowStore::row_id(&stored).is_some());
        assert!(stored.get("created_at").is_some());
        assert_eq!(stored["is_active"], json!(true));
    }

    #[tokio::test]
    async fn lenders_list_by_name_ascending() {
        let store = MemoryRowStore::new();
        for name in ["zeta credit", "Alpha Trust", "midland"] {
            store.insert(EntityKind::Lender, row(json!({ "name": name }))).await.unwrap();
        }
        let names: Vec<_> = store
            .list(EntityKind::Lender)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Alpha Trust", "midland", "zeta credit"]);
    }

    #[tokio::test]
    async fn equal_timestamps_list_newest_insert_first() {
        let store = MemoryRowStore::new();
        let stamp = json!("2026-01-01T00:00:00.000000Z");
        for name in ["first", "second", "third"] {
            store
                .seed(
                    EntityKind::Client,
                    row(json!({"id": Uuid::new_v4().to_string(), "full_name": name, "created_at": stamp})),
                )
                .await;
        }
        let names: Vec<_> = store
            .list(EntityKind::Client)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r["full_name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn update_never_touches_protected_columns() {
        let store = MemoryRowStore::new();
        let owner = Uuid::new_v4();
        let stored = store
            .insert(EntityKind::Client, row(json!({"full_name": "Jane", "broker_id": owner.to_string()})))
            .await
            .unwrap();
        let id = MemoryRowStore::row_id(&stored).unwrap();

        let updated = store
            .update(
                EntityKind::Client,
                id,
                row(json!({"full_name": "Janet", "broker_id": Uuid::new_v4().to_string(), "id": Uuid::new_v4().to_string()})),
            )
            .await
            .unwrap();

        assert_eq!(updated["full_name"], json!("Janet"));
        assert_eq!(updated["broker_id"], json!(owner.to_string()));
        assert_eq!(MemoryRowStore::row_id(&updated), Some(id));
    }

    #[tokio::test]
    async fn update_missing_row_is_not_found() {
        let store = MemoryRowStore::new();
        let err = store.update(EntityKind::Client, Uuid::new_v4(), Row::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: EntityKind::Client, .. }));
    }

    #[tokio::test]
    async fn set_account_active_flips_broker_flag() {
        let store = MemoryRowStore::new();
        let stored = store
            .insert(EntityKind::Broker, row(json!({"full_name": "Ann", "email": "ann@kr.test"})))
            .await
            .unwrap();
        let id = MemoryRowStore::row_id(&stored).unwrap();

        store.set_account_active(id, false).await.unwrap();
        let reloaded = store.get_by_id(EntityKind::Broker, id).await.unwrap().unwrap();
        assert_eq!(reloaded["is_active"], json!(false));
    }
}
