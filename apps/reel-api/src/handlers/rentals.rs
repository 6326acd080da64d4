//! Rental endpoints.
//!
//! ```text
//! POST /api/rentals { filmId, customerId }            known customer
//! POST /api/rentals { filmId, email, firstName?, ... } resolve first
//!        │
//!        ▼
//!   rent(film_id, customer_id)
//!        ├── Success        → 201 { success: true,  outcome, message, data }
//!        └── other outcomes → 200 { success: false, outcome, message }
//!
//! PUT /api/rentals/{id}/return
//!        ├── unknown id       → 404
//!        ├── already returned → 409
//!        ├── returned by a concurrent request meanwhile → 409
//!        └── open             → return_open_rental(id) → 200 { data: rental }
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use reel_core::validation::validate_id;
use reel_core::{CoreError, OutcomeKind, Rental, RentalOutcome, ValidationError};

use super::customers::customer_not_found;
use super::{path_id, Envelope};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `POST /api/rentals` body. Either `customerId` or `email` identifies the
/// customer; `customerId` wins when both are sent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentRequest {
    pub film_id: i64,
    pub customer_id: Option<i64>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentedCopy {
    pub film_id: i64,
    pub inventory_id: i64,
    pub customer_id: i64,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct RentResponse {
    pub success: bool,
    pub outcome: OutcomeKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<RentedCopy>,
}

impl From<RentalOutcome> for RentResponse {
    fn from(outcome: RentalOutcome) -> Self {
        let data = match &outcome {
            RentalOutcome::Success {
                film_id,
                inventory_id,
                customer_id,
                title,
            } => Some(RentedCopy {
                film_id: *film_id,
                inventory_id: *inventory_id,
                customer_id: *customer_id,
                title: title.clone(),
            }),
            _ => None,
        };

        RentResponse {
            success: outcome.is_success(),
            outcome: outcome.kind(),
            message: outcome.message(),
            data,
        }
    }
}

pub async fn rent_film(
    State(state): State<AppState>,
    payload: Result<Json<RentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RentResponse>)> {
    let Json(request) = payload?;
    validate_id("filmId", request.film_id)?;

    let customers = state.customers();
    let customer_id = match (request.customer_id, request.email.as_deref()) {
        (Some(customer_id), _) => {
            validate_id("customerId", customer_id)?;
            customers
                .get_by_id(customer_id)
                .await?
                .ok_or_else(|| customer_not_found(customer_id))?
                .customer_id
        }
        (None, Some(email)) => {
            customers
                .resolve_or_create(
                    email,
                    request.first_name.as_deref(),
                    request.last_name.as_deref(),
                )
                .await?
                .customer_id
        }
        (None, None) => {
            return Err(ValidationError::Required {
                field: "customerId or email".to_string(),
            }
            .into())
        }
    };

    let outcome = state.rentals().rent(request.film_id, customer_id).await?;
    info!(
        film_id = request.film_id,
        customer_id,
        outcome = ?outcome.kind(),
        "Rent request handled"
    );

    let status = if outcome.is_success() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.into())))
}

pub async fn return_rental(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<Rental>>> {
    let rental_id = path_id("rental_id", path)?;
    let rentals = state.rentals();

    let rental = rentals
        .get(rental_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Rental {} not found", rental_id)))?;
    let returned = rental.mark_returned(Utc::now())?;

    // Another request may have returned it since the read
    if !rentals.return_open_rental(rental_id).await? {
        return Err(CoreError::RentalAlreadyReturned { rental_id }.into());
    }
    let stored = rentals.get(rental_id).await?.unwrap_or(returned);

    info!(rental_id, "Rental returned");
    Ok(Envelope::ok(stored))
}
