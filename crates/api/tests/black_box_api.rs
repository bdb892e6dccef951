use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = stockline_api::app::build_app();
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

async fn create_product(
    client: &reqwest::Client,
    base_url: &str,
    sku: &str,
    selling_price: i64,
) -> serde_json::Value {
    let res = client
        .post(format!("{base_url}/products"))
        .json(&json!({
            "sku": sku,
            "name": format!("Product {sku}"),
            "selling_price": selling_price,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn create_warehouse(client: &reqwest::Client, base_url: &str) -> serde_json::Value {
    let res = client
        .post(format!("{base_url}/warehouses"))
        .json(&json!({ "name": "Main" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn stock_in(
    client: &reqwest::Client,
    base_url: &str,
    product_id: &str,
    warehouse_id: &str,
    qty: i64,
) {
    let res = client
        .post(format!("{base_url}/inventory/stock-in"))
        .json(&json!({
            "product_id": product_id,
            "warehouse_id": warehouse_id,
            "qty": qty,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let server = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", server.base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_sku_is_rejected_with_conflict() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_product(&client, &server.base_url, "DUP-1", 1_000).await;
    let res = client
        .post(format!("{}/products", server.base_url))
        .json(&json!({ "sku": "dup-1", "name": "Again", "selling_price": 2_000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn stock_flows_update_the_balance() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let product = create_product(&client, &server.base_url, "CF-01", 2_500).await;
    let warehouse = create_warehouse(&client, &server.base_url).await;
    let product_id = product["id"].as_str().unwrap();
    let warehouse_id = warehouse["id"].as_str().unwrap();

    stock_in(&client, &server.base_url, product_id, warehouse_id, 100).await;

    let res = client
        .post(format!("{}/inventory/adjust", server.base_url))
        .json(&json!({
            "product_id": product_id,
            "warehouse_id": warehouse_id,
            "delta": -20,
            "description": "stock opname",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!(
            "{}/inventory/balance/{product_id}/{warehouse_id}",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let balance: serde_json::Value = res.json().await.unwrap();
    assert_eq!(balance["qty"], 80);

    let res = client
        .get(format!(
            "{}/inventory/movements?product_id={product_id}",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn overdraw_returns_unprocessable_entity_and_changes_nothing() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let product = create_product(&client, &server.base_url, "TEA-01", 1_500).await;
    let warehouse = create_warehouse(&client, &server.base_url).await;
    let product_id = product["id"].as_str().unwrap();
    let warehouse_id = warehouse["id"].as_str().unwrap();

    stock_in(&client, &server.base_url, product_id, warehouse_id, 5).await;

    let res = client
        .post(format!("{}/pos/orders", server.base_url))
        .json(&json!({
            "warehouse_id": warehouse_id,
            "lines": [{ "product_id": product_id, "qty": 10 }],
            "payment_method": "cash",
            "payment_amount": 1_000_000,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");
    assert_eq!(body["available"], 5);

    let res = client
        .get(format!(
            "{}/inventory/balance/{product_id}/{warehouse_id}",
            server.base_url
        ))
        .send()
        .await
        .unwrap();
    let balance: serde_json::Value = res.json().await.unwrap();
    assert_eq!(balance["qty"], 5);
}

#[tokio::test]
async fn checkout_decrements_stock_and_feeds_the_daily_summary() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let product = create_product(&client, &server.base_url, "SNK-01", 10_000).await;
    let warehouse = create_warehouse(&client, &server.base_url).await;
    let product_id = product["id"].as_str().unwrap();
    let warehouse_id = warehouse["id"].as_str().unwrap();

    stock_in(&client, &server.base_url, product_id, warehouse_id, 50).await;

    let res = client
        .post(format!("{}/pos/orders", server.base_url))
        .json(&json!({
            "warehouse_id": warehouse_id,
            "lines": [{ "product_id": product_id, "qty": 2 }],
            "payment_method": "cash",
            "payment_amount": 50_000,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    // 20_000 subtotal + 10% default tax.
    assert_eq!(body["order"]["total"], 22_000);
    assert_eq!(body["order"]["change"], 28_000);
    assert_eq!(body["balances"][0]["qty"], 48);

    let res = client
        .get(format!("{}/pos/today-summary", server.base_url))
        .send()
        .await
        .unwrap();
    let summary: serde_json::Value = res.json().await.unwrap();
    assert_eq!(summary["total_transactions"], 1);
    assert_eq!(summary["total_quantity"], 2);
    assert_eq!(summary["total_sales"], 22_000);
}

#[tokio::test]
async fn settings_roundtrip_and_validation() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/settings", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let settings: serde_json::Value = res.json().await.unwrap();
    assert_eq!(settings["tax_rate_bps"], 1_000);

    let res = client
        .put(format!("{}/settings", server.base_url))
        .json(&json!({
            "store_name": "Corner Shop",
            "address": null,
            "tax_rate_bps": 0,
            "currency": "IDR",
            "rounding": "down",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(format!("{}/settings", server.base_url))
        .json(&json!({
            "store_name": "Corner Shop",
            "address": null,
            "tax_rate_bps": 20_000,
            "currency": "IDR",
            "rounding": "down",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn movement_references_by_unknown_ids_are_not_found() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/inventory/stock-in", server.base_url))
        .json(&json!({
            "product_id": uuid::Uuid::now_v7().to_string(),
            "warehouse_id": uuid::Uuid::now_v7().to_string(),
            "qty": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!(
            "{}/inventory/movements/{}",
            server.base_url,
            uuid::Uuid::now_v7()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
