use axum::{extract::Request, middleware::Next, response::Response};
use tracing::warn;

use crate::error::ApiError;
use crate::portal::Session;

/// Gate for `/api/admin/*`. Runs after user validation.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let session = request
        .extensions()
        .get::<Session>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !session.is_admin() {
        warn!("Broker {} denied admin route {}", session.user_id, request.uri().path());
        return Err(ApiError::forbidden("Administrator role required"));
    }
    Ok(next.run(request).await)
}
