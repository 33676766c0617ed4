use serde::Deserialize;

use stockroom_core::{CategoryId, ProductId};
use stockroom_infra::{MovementDetail, MovementRecord, ProductSnapshot, VoidOutcome};
use stockroom_ledger::Movement;
use stockroom_products::{Category, Product};

// -------------------------
// Request DTOs
// -------------------------
// The wire format is camelCase, matching the dashboard client.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionRequest {
    pub product_id: ProductId,
    pub quantity: i64,
    pub transaction_type: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmendTransactionRequest {
    pub quantity: Option<i64>,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidTransactionRequest {
    pub void_reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub quantity: Option<i64>,
    pub price_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub price_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn movement_to_json(m: &Movement) -> serde_json::Value {
    serde_json::json!({
        "id": m.id,
        "productId": m.product_id,
        "quantity": m.quantity,
        "transactionType": m.movement_type.as_str(),
        "status": m.status,
        "reversalOf": m.reversal_of,
        "voidedBy": m.voided_by,
        "remarks": m.remarks,
        "transactionDate": m.transaction_date,
    })
}

fn product_snapshot_to_json(p: &ProductSnapshot) -> serde_json::Value {
    serde_json::json!({
        "name": p.name,
        "priceCents": p.price_cents,
        "quantity": p.quantity,
    })
}

pub fn movement_record_to_json(r: &MovementRecord) -> serde_json::Value {
    let mut value = movement_to_json(&r.movement);
    value["product"] = product_snapshot_to_json(&r.product);
    value
}

pub fn movement_detail_to_json(d: &MovementDetail) -> serde_json::Value {
    let mut value = movement_to_json(&d.movement);
    let mut product = product_snapshot_to_json(&d.product);
    product["categoryName"] = serde_json::json!(d.category_name);
    value["product"] = product;
    value
}

pub fn void_outcome_to_json(o: &VoidOutcome) -> serde_json::Value {
    serde_json::json!({
        "originalTransaction": movement_record_to_json(&o.original),
        "reversalTransaction": movement_record_to_json(&o.reversal),
        "adjustedQuantity": o.adjusted_quantity,
    })
}

pub fn product_to_json(p: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id,
        "name": p.name,
        "description": p.description,
        "categoryId": p.category_id,
        "quantity": p.quantity,
        "priceCents": p.price_cents,
        "createdAt": p.created_at,
        "updatedAt": p.updated_at,
    })
}

pub fn category_to_json(c: &Category) -> serde_json::Value {
    serde_json::json!({
        "id": c.id,
        "name": c.name,
    })
}
