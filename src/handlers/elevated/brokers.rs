// handlers/elevated/brokers.rs - /api/admin/brokers handlers

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Extension, Json, Path, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::{json_body, path_params};
use crate::middleware::{ApiResponse, ApiResult};
use crate::portal::brokers::{create_broker, set_broker_active};
use crate::portal::models::{Broker, BrokerDraft};
use crate::portal::Session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBroker {
    /// Identity provider user id; generated when omitted.
    pub id: Option<Uuid>,
    #[serde(flatten)]
    pub profile: BrokerDraft,
}

/// POST /api/admin/brokers - create a broker profile
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    payload: Result<Json<CreateBroker>, JsonRejection>,
) -> ApiResult<Broker> {
    let request = json_body(payload)?;
    let broker = create_broker(state.store.as_ref(), &session, request.id, &request.profile).await?;
    Ok(ApiResponse::created(broker))
}

/// POST /api/admin/brokers/:id/deactivate - disable sign-in; refused for the caller's own account
pub async fn deactivate(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Broker> {
    let id = path_params(path)?;
    let broker = set_broker_active(state.store.as_ref(), &session, id, false).await?;
    Ok(ApiResponse::success(broker))
}

/// POST /api/admin/brokers/:id/reactivate
pub async fn reactivate(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Broker> {
    let id = path_params(path)?;
    let broker = set_broker_active(state.store.as_ref(), &session, id, true).await?;
    Ok(ApiResponse::success(broker))
}
