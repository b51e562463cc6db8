//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use inventory::InventoryError;
use saga::SagaError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Order placement error.
    Saga(SagaError),
    /// Inventory operation error.
    Inventory(InventoryError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Saga(err) => saga_error_to_response(err),
            ApiError::Inventory(err) => inventory_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn saga_error_to_response(err: SagaError) -> (StatusCode, String) {
    match &err {
        SagaError::NoItemsSelected => (StatusCode::BAD_REQUEST, err.to_string()),
        SagaError::GoodsNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        SagaError::InsufficientStock(_) => (StatusCode::CONFLICT, err.to_string()),
        SagaError::LockUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        SagaError::DeadlineExceeded => (StatusCode::GATEWAY_TIMEOUT, err.to_string()),
        SagaError::Persistence(_) | SagaError::Upstream(_) | SagaError::Inventory(_) => {
            tracing::error!(error = %err, "order placement failed server-side");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn inventory_error_to_response(err: InventoryError) -> (StatusCode, String) {
    match &err {
        InventoryError::InsufficientStock(_) => (StatusCode::CONFLICT, err.to_string()),
        InventoryError::LockUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        InventoryError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        InventoryError::DuplicateGoodsId(_) | InventoryError::InvalidQuantity(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        InventoryError::Ledger(_) | InventoryError::Lock(_) => {
            tracing::error!(error = %err, "inventory store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        ApiError::Inventory(err)
    }
}
