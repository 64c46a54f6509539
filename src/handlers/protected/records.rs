// handlers/protected/records.rs - generic list/create/show/update handlers
//
// Instantiated per record kind in routes.rs, e.g. `get(records::list::<Client>)`.
// Writes go through a `RecordEditor` so the API and the edit session share the
// same validation, owner stamping and protected-column rules.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Extension, Json, Path, Query, State};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::handlers::{json_body, path_params};
use crate::middleware::{ApiResponse, ApiResult};
use crate::portal::store::fetch_record;
use crate::portal::{PortalEntity, RecordEditor, RecordList, Session};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring over the kind's search fields.
    pub q: Option<String>,
}

/// GET /api/portal/{kind}[?q=] - all records of a kind in its fixed order
pub async fn list<E: PortalEntity>(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<E>> {
    let mut list = RecordList::<E>::new();
    list.reload(state.store.as_ref()).await?;
    list.set_query(query.q.unwrap_or_default());

    let visible: Vec<E> = list.visible().into_iter().cloned().collect();
    debug!("Listing {} of {} {} records", visible.len(), list.records().len(), E::KIND);
    Ok(ApiResponse::success(visible))
}

/// POST /api/portal/{kind} - create from a draft; owner is the calling broker
pub async fn create<E: PortalEntity>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    payload: Result<Json<E::Draft>, JsonRejection>,
) -> ApiResult<E> {
    let draft = json_body(payload)?;

    let mut editor = RecordEditor::<E>::new();
    editor.open_new();
    editor.set_draft(draft);
    let outcome = editor.save(state.store.as_ref(), &session).await?;
    Ok(ApiResponse::created(outcome.into_record()))
}

/// GET /api/portal/{kind}/:id - single record
pub async fn show<E: PortalEntity>(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<E> {
    let id = path_params(path)?;
    let record = fetch_record::<E>(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(record))
}

/// PUT /api/portal/{kind}/:id - replace the editable fields of a record
pub async fn update<E: PortalEntity>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<E::Draft>, JsonRejection>,
) -> ApiResult<E> {
    let id = path_params(path)?;
    let draft = json_body(payload)?;

    let mut editor = RecordEditor::<E>::new();
    editor.open(state.store.as_ref(), Some(id)).await?;
    editor.set_draft(draft);
    if !editor.has_changes() {
        debug!("{} {} saved without changes", E::KIND, id);
    }
    let outcome = editor.save(state.store.as_ref(), &session).await?;
    Ok(ApiResponse::success(outcome.into_record()))
}
