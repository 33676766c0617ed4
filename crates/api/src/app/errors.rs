use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;

/// Map the domain error taxonomy onto HTTP statuses: 400 for validation
/// and business-rule rejections, 404 for missing resources, 500 for
/// unexpected store failures.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let (status, code) = match &err {
        DomainError::InvalidMovementType(_) => (StatusCode::BAD_REQUEST, "invalid_transaction_type"),
        DomainError::InvalidQuantity(_) => (StatusCode::BAD_REQUEST, "invalid_quantity"),
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        DomainError::InvalidId(_) => (StatusCode::BAD_REQUEST, "invalid_id"),
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        DomainError::InsufficientInventory { .. } => {
            (StatusCode::BAD_REQUEST, "insufficient_inventory")
        }
        DomainError::AlreadyVoided(_) => (StatusCode::BAD_REQUEST, "already_voided"),
        DomainError::ReversalImmutable(_) => (StatusCode::BAD_REQUEST, "cannot_modify_reversal"),
        DomainError::Unknown(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
    };
    json_error(status, code, err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
