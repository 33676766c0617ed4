use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use stockroom_api::app::services::AppServices;
use stockroom_api::app::build_router;
use stockroom_infra::InMemoryStore;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let services = Arc::new(AppServices::new(Arc::new(InMemoryStore::new())));
        let app = build_router(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_category(client: &reqwest::Client, base_url: &str, name: &str) -> i64 {
    let res = client
        .post(format!("{base_url}/categories"))
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json::<serde_json::Value>().await.unwrap()["id"]
        .as_i64()
        .unwrap()
}

async fn create_product(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    quantity: i64,
    category_id: Option<i64>,
) -> i64 {
    let res = client
        .post(format!("{base_url}/products"))
        .json(&json!({
            "name": name,
            "quantity": quantity,
            "priceCents": 4500,
            "categoryId": category_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json::<serde_json::Value>().await.unwrap()["id"]
        .as_i64()
        .unwrap()
}

async fn record_transaction(
    client: &reqwest::Client,
    base_url: &str,
    product_id: i64,
    quantity: i64,
    transaction_type: &str,
) -> reqwest::Response {
    client
        .post(format!("{base_url}/transactions"))
        .json(&json!({
            "productId": product_id,
            "quantity": quantity,
            "transactionType": transaction_type,
            "remarks": "order #1",
        }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_is_up() {
    let server = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", server.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn record_list_and_void_flow() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let category_id = create_category(&client, &server.base_url, "Peripherals").await;
    let product_id =
        create_product(&client, &server.base_url, "Keyboard", 10, Some(category_id)).await;

    // Sale of 3 out of 10.
    let res = record_transaction(&client, &server.base_url, product_id, 3, "SALE").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let sale: serde_json::Value = res.json().await.unwrap();
    assert_eq!(sale["product"]["quantity"], 7);
    assert_eq!(sale["status"], "active");
    let sale_id = sale["id"].as_i64().unwrap();

    // Oversell is rejected and writes nothing.
    let res = record_transaction(&client, &server.base_url, product_id, 20, "SALE").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "insufficient_inventory");

    let res = client
        .get(format!("{}/transactions", server.base_url))
        .send()
        .await
        .unwrap();
    let listed: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(listed.len(), 1);

    // Single-entry read joins product and category.
    let res = client
        .get(format!("{}/transactions/{}", server.base_url, sale_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let detail: serde_json::Value = res.json().await.unwrap();
    assert_eq!(detail["product"]["name"], "Keyboard");
    assert_eq!(detail["product"]["categoryName"], "Peripherals");

    // Void restores the stock and appends the reversal entry.
    let res = client
        .post(format!("{}/transactions/{}/void", server.base_url, sale_id))
        .json(&json!({ "voidReason": "customer changed mind" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let outcome: serde_json::Value = res.json().await.unwrap();
    assert_eq!(outcome["adjustedQuantity"], 10);
    assert_eq!(outcome["originalTransaction"]["status"], "voided");
    assert_eq!(outcome["reversalTransaction"]["transactionType"], "RETURN");
    assert_eq!(outcome["reversalTransaction"]["quantity"], 3);
    let reversal_id = outcome["reversalTransaction"]["id"].as_i64().unwrap();
    assert!(outcome["originalTransaction"]["remarks"]
        .as_str()
        .unwrap()
        .ends_with(&format!(
            "[VOIDED: customer changed mind, Reversal: #{reversal_id}]"
        )));

    // Second void is rejected.
    let res = client
        .post(format!("{}/transactions/{}/void", server.base_url, sale_id))
        .json(&json!({ "voidReason": "again" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "already_voided");

    // Reversal entries are terminal.
    let res = client
        .post(format!(
            "{}/transactions/{}/void",
            server.base_url, reversal_id
        ))
        .json(&json!({ "voidReason": "undo the undo" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "cannot_modify_reversal");

    // Both entries visible, newest first.
    let res = client
        .get(format!("{}/transactions", server.base_url))
        .send()
        .await
        .unwrap();
    let listed: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"].as_i64().unwrap(), reversal_id);
}

#[tokio::test]
async fn amend_reverses_then_reapplies() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let product_id = create_product(&client, &server.base_url, "Monitor", 10, None).await;

    let res = record_transaction(&client, &server.base_url, product_id, 2, "IN").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let delivery: serde_json::Value = res.json().await.unwrap();
    assert_eq!(delivery["product"]["quantity"], 12);
    let delivery_id = delivery["id"].as_i64().unwrap();

    let res = client
        .put(format!("{}/transactions/{}", server.base_url, delivery_id))
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let amended: serde_json::Value = res.json().await.unwrap();
    assert_eq!(amended["quantity"], 5);
    assert_eq!(amended["product"]["quantity"], 15);

    // An OUT amendment that would go negative must fail atomically:
    // record an OUT of 5, then try to amend it past what is on hand.
    let res = record_transaction(&client, &server.base_url, product_id, 5, "OUT").await;
    let out: serde_json::Value = res.json().await.unwrap();
    let out_id = out["id"].as_i64().unwrap();
    let on_hand = out["product"]["quantity"].as_i64().unwrap();

    let res = client
        .put(format!("{}/transactions/{}", server.base_url, out_id))
        .json(&json!({ "quantity": on_hand + 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "insufficient_inventory");

    // The failed amendment left the entry untouched.
    let res = client
        .get(format!("{}/transactions/{}", server.base_url, out_id))
        .send()
        .await
        .unwrap();
    let entry: serde_json::Value = res.json().await.unwrap();
    assert_eq!(entry["quantity"], 5);
    assert_eq!(entry["product"]["quantity"].as_i64().unwrap(), on_hand);
}

#[tokio::test]
async fn validation_and_not_found_mapping() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let product_id = create_product(&client, &server.base_url, "Cable", 5, None).await;

    let res = record_transaction(&client, &server.base_url, product_id, 1, "DONATION").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "invalid_transaction_type");

    let res = record_transaction(&client, &server.base_url, product_id, 0, "IN").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "invalid_quantity");

    let res = record_transaction(&client, &server.base_url, 999, 1, "IN").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/transactions/404", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/transactions/notanumber", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: serde_json::Value = res.json().await.unwrap();
    assert_eq!(err["error"], "invalid_id");
}

#[tokio::test]
async fn product_catalog_flow() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/products", server.base_url))
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let keyboard = create_product(&client, &server.base_url, "Keyboard", 10, None).await;
    let mouse = create_product(&client, &server.base_url, "Mouse", 4, None).await;

    let res = client
        .get(format!("{}/products", server.base_url))
        .send()
        .await
        .unwrap();
    let listed: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"].as_i64().unwrap(), keyboard);

    let res = client
        .put(format!("{}/products/{}", server.base_url, mouse))
        .json(&json!({ "priceCents": 2500 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["priceCents"], 2500);
    assert_eq!(updated["name"], "Mouse");

    // A product with ledger entries cannot be deleted.
    let res = record_transaction(&client, &server.base_url, keyboard, 1, "SALE").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let res = client
        .delete(format!("{}/products/{}", server.base_url, keyboard))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // One without can.
    let res = client
        .delete(format!("{}/products/{}", server.base_url, mouse))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = client
        .get(format!("{}/products/{}", server.base_url, mouse))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
