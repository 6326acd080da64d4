//! HTTP handlers, one module per resource.
//!
//! Successful responses use the envelope `{ "success": true, "data": ... }`.
//! Failures are rendered by [`ApiError`](crate::error::ApiError).

use axum::extract::rejection::PathRejection;
use axum::extract::Path;
use axum::Json;
use serde::Serialize;

use reel_core::validation::validate_id;

use crate::error::ApiResult;

pub mod catalog;
pub mod customers;
pub mod health;
pub mod rentals;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Envelope {
            success: true,
            data,
        })
    }
}

/// Extracts a positive id from the path.
pub(crate) fn path_id(field: &str, path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    let Path(id) = path?;
    validate_id(field, id)?;
    Ok(id)
}
