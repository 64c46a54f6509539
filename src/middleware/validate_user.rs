use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::portal::models::Broker;
use crate::portal::store::find_record;
use crate::portal::Session;
use crate::state::AppState;

/// Loads the broker profile behind the token. Unknown or deactivated accounts
/// are refused; the session role comes from the profile, not the token.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let broker = find_record::<Broker>(state.store.as_ref(), claims.sub)
        .await?
        .ok_or_else(|| {
            warn!("No broker profile for token subject {}", claims.sub);
            ApiError::forbidden("Broker profile not found")
        })?;

    if !broker.is_active {
        warn!("Deactivated broker {} attempted access", broker.id);
        return Err(ApiError::forbidden("Account is deactivated"));
    }

    request.extensions_mut().insert(Session::for_broker(&broker));
    request.extensions_mut().insert(broker);
    Ok(next.run(request).await)
}
