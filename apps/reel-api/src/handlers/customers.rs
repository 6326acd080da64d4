//! Customer endpoints: paginated search, resolver, pass-through edits.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use reel_core::validation::validate_search_query;
use reel_core::{Customer, CustomerUpdate, PageRequest, RentalSummary, SearchTerm};

use super::{path_id, Envelope};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// Listing
// =============================================================================

/// Raw query-string values. Anything unparsable falls back to a default.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// `GET /api/customers` body.
#[derive(Debug, Serialize)]
pub struct CustomerList {
    pub success: bool,
    pub data: Vec<Customer>,
    pub pagination: Pagination,
}

pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<CustomerListParams>,
) -> ApiResult<Json<CustomerList>> {
    let page = PageRequest::from_raw(params.page.as_deref(), params.limit.as_deref());
    let search = match params.search.as_deref() {
        Some(raw) => SearchTerm::parse(&validate_search_query(raw)?),
        None => None,
    };

    let result = state
        .customers()
        .search_customers(&page, search.as_ref())
        .await?;

    Ok(Json(CustomerList {
        success: true,
        pagination: Pagination {
            page: result.page,
            limit: result.page_size,
            total: result.total,
            total_pages: result.total_pages,
        },
        data: result.rows,
    }))
}

// =============================================================================
// Single Customer
// =============================================================================

pub async fn get_customer(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<Customer>>> {
    let customer_id = path_id("customer_id", path)?;

    let customer = state
        .customers()
        .get_by_id(customer_id)
        .await?
        .ok_or_else(|| customer_not_found(customer_id))?;

    Ok(Envelope::ok(customer))
}

pub async fn update_customer(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CustomerUpdate>, JsonRejection>,
) -> ApiResult<Json<Envelope<Customer>>> {
    let customer_id = path_id("customer_id", path)?;
    let Json(update) = payload?;

    let customer = state.customers().update(customer_id, &update).await?;
    Ok(Envelope::ok(customer))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCustomer {
    pub customer_id: i64,
}

pub async fn delete_customer(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<DeletedCustomer>>> {
    let customer_id = path_id("customer_id", path)?;

    state.customers().delete(customer_id).await?;
    Ok(Envelope::ok(DeletedCustomer { customer_id }))
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerRentalParams {
    pub open: Option<String>,
}

/// `GET /api/customers/{id}/rentals?open=true` lists only unreturned rentals.
pub async fn customer_rentals(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    Query(params): Query<CustomerRentalParams>,
) -> ApiResult<Json<Envelope<Vec<RentalSummary>>>> {
    let customer_id = path_id("customer_id", path)?;
    let open_only = matches!(
        params.open.as_deref().map(str::trim),
        Some("true") | Some("1")
    );

    if state.customers().get_by_id(customer_id).await?.is_none() {
        return Err(customer_not_found(customer_id));
    }

    let rentals = state
        .rentals()
        .list_for_customer(customer_id, open_only)
        .await?;
    Ok(Envelope::ok(rentals))
}

// =============================================================================
// Resolver
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveCustomerRequest {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// `POST /api/customers/resolve`: the customer for an email, created when
/// both names are given.
pub async fn resolve_customer(
    State(state): State<AppState>,
    payload: Result<Json<ResolveCustomerRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<Customer>>> {
    let Json(request) = payload?;

    let customer = state
        .customers()
        .resolve_or_create(
            &request.email,
            request.first_name.as_deref(),
            request.last_name.as_deref(),
        )
        .await?;

    info!(customer_id = customer.customer_id, "Customer resolved");
    Ok(Envelope::ok(customer))
}

pub(crate) fn customer_not_found(customer_id: i64) -> ApiError {
    ApiError::NotFound(format!("Customer {} not found", customer_id))
}
