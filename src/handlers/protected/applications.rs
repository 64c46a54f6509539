// handlers/protected/applications.rs - GET /api/portal/applications/:id handler

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::handlers::path_params;
use crate::middleware::{ApiResponse, ApiResult};
use crate::portal::models::ApplicationDetail;
use crate::portal::records::application_detail;
use crate::state::AppState;

/// GET /api/portal/applications/:id - application with its client and lender
pub async fn show(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<ApplicationDetail> {
    let id = path_params(path)?;
    let detail = application_detail(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(detail))
}
