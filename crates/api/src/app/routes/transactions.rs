use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockroom_core::MovementId;
use stockroom_infra::{AmendMovement, RecordMovement};
use stockroom_ledger::MovementType;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(record_transaction).get(list_transactions))
        .route("/:id", get(get_transaction).put(amend_transaction))
        .route("/:id/void", post(void_transaction))
}

pub async fn record_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RecordTransactionRequest>,
) -> axum::response::Response {
    let movement_type: MovementType = match body.transaction_type.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let req = RecordMovement {
        product_id: body.product_id,
        quantity: body.quantity,
        movement_type,
        remarks: body.remarks,
    };

    match services.ledger().record_movement(req).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(dto::movement_record_to_json(&record)),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_transactions(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.ledger().movements().await {
        Ok(movements) => {
            let items: Vec<_> = movements.iter().map(dto::movement_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!(items))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: MovementId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger().movement(id).await {
        Ok(detail) => (StatusCode::OK, Json(dto::movement_detail_to_json(&detail))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn amend_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AmendTransactionRequest>,
) -> axum::response::Response {
    let id: MovementId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let req = AmendMovement {
        quantity: body.quantity,
        remarks: body.remarks,
    };

    match services.ledger().amend_movement(id, req).await {
        Ok(record) => (StatusCode::OK, Json(dto::movement_record_to_json(&record))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn void_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::VoidTransactionRequest>,
) -> axum::response::Response {
    let id: MovementId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger().void_movement(id, &body.void_reason).await {
        Ok(outcome) => (StatusCode::OK, Json(dto::void_outcome_to_json(&outcome))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
