// handlers/public/status.rs - GET / and GET /health handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET / - service description and route overview
pub async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": "kr-portal",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Region-aware site backend and broker portal",
        "endpoints": {
            "site": "/api/site/{locale,links,calculators/*,icons/:name} (public)",
            "portal": "/api/portal/{clients,applications,lenders,me} (protected)",
            "admin": "/api/admin/brokers (admin)",
        },
        "regions": ["global", "ca", "ae", "us"],
    }))
}

/// GET /health - liveness plus row store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(database) = state.database.as_ref() else {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "store": "memory" }
            })),
        );
    };

    match database.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "store": "postgres", "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now, "store": "postgres" }
                })),
            )
        }
    }
}
