// handlers/mod.rs - Three-tier handler layout
//
// Public (no auth) → Protected (broker JWT) → Elevated (admin broker JWT)
//
// Each tier only declares handlers; middleware is attached in routes.rs.

pub mod elevated; // /api/admin/*
pub mod protected; // /api/portal/*
pub mod public; // /, /health, /api/site/*

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Unwrap a JSON body, reporting a malformed one in the API error envelope.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))
}

/// Unwrap path parameters, reporting a malformed id as a bad request.
pub(crate) fn path_params<T: DeserializeOwned + Send>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    path.map(|Path(params)| params)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}
