// handlers/protected/me.rs - GET /api/portal/me handler

use axum::extract::Extension;
use serde::Serialize;

use crate::middleware::{ApiResponse, RequestLocale};
use crate::portal::models::Broker;

#[derive(Debug, Serialize)]
pub struct Me {
    pub broker: Broker,
    pub locale: RequestLocale,
}

/// GET /api/portal/me - the calling broker's profile and request region
pub async fn show(Extension(broker): Extension<Broker>, Extension(locale): Extension<RequestLocale>) -> ApiResponse<Me> {
    ApiResponse::success(Me { broker, locale })
}
