use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use stockline_core::{CashierId, OrderId, ProductId, WarehouseId};
use stockline_infra::SaleLine;
use stockline_sales::{compute_totals, OrderLine, SalesOrder};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/orders", post(checkout).get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/today-summary", get(today_summary))
}

/// Checkout: price the cart against the catalog, compute totals from store
/// settings, commit the stock side atomically, then persist the order.
///
/// The order is only recorded after the ledger commit succeeds, so a failed
/// or partially-stocked cart leaves no trace anywhere.
pub async fn checkout(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CheckoutRequest>,
) -> axum::response::Response {
    let warehouse_id: WarehouseId = match errors::parse_id(&body.warehouse_id, "warehouse") {
        Ok(v) => v,
        Err(r) => return r,
    };
    if !services.catalog.warehouse_exists(warehouse_id) {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "warehouse not found");
    }
    let cashier_id = match body.cashier_id.as_deref() {
        Some(raw) => match errors::parse_id::<CashierId>(raw, "cashier") {
            Ok(v) => v,
            Err(r) => return r,
        },
        None => CashierId::new(),
    };
    if body.lines.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "order must have at least one line",
        );
    }

    // Unit prices come from the catalog, never from the client.
    let mut order_lines = Vec::with_capacity(body.lines.len());
    let mut sale_lines = Vec::with_capacity(body.lines.len());
    for line in &body.lines {
        let product_id: ProductId = match errors::parse_id(&line.product_id, "product") {
            Ok(v) => v,
            Err(r) => return r,
        };
        let product = match services.catalog.get_product(product_id) {
            Ok(p) => p,
            Err(_) => {
                return errors::json_error(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    format!("product {product_id} not found"),
                )
            }
        };
        order_lines.push(OrderLine {
            product_id,
            qty: line.qty,
            unit_price: product.selling_price,
        });
        sale_lines.push(SaleLine {
            product_id,
            qty: line.qty,
        });
    }

    let settings = services.settings();
    let totals = match compute_totals(&order_lines, body.discount, &settings) {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let order_id = OrderId::new();
    let now = Utc::now();
    let order = match SalesOrder::create(
        order_id,
        cashier_id,
        warehouse_id,
        order_lines,
        totals,
        body.payment_method,
        body.payment_amount,
        body.notes,
        now,
    ) {
        Ok(o) => o,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let receipt = match services
        .ledger
        .record_sale(order_id, warehouse_id, &sale_lines, now)
        .await
    {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    services.sales.record(order.clone());

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "order": order,
            "balances": receipt.balances,
        })),
    )
        .into_response()
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match errors::parse_id(&id, "order") {
        Ok(v) => v,
        Err(r) => return r,
    };
    match services.sales.get(id) {
        Some(order) => (StatusCode::OK, Json(order)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let items = services.sales.list();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn today_summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    (StatusCode::OK, Json(services.sales.today_summary())).into_response()
}
