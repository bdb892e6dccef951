use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use stockline_core::{MovementId, ProductId, WarehouseId};
use stockline_infra::projections::{inventory_summary, DEFAULT_LOW_STOCK_THRESHOLD};
use stockline_infra::MovementFilter;
use stockline_ledger::{MovementRequest, MovementType, QuantityChange};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/stock-in", post(stock_in))
        .route("/adjust", post(adjust))
        .route("/transfer", post(transfer))
        .route("/summary", get(summary))
        .route("/movements", get(movements))
        .route("/movements/:id", get(movement))
        .route("/balance/:product_id/:warehouse_id", get(balance))
}

pub async fn stock_in(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::StockInRequest>,
) -> axum::response::Response {
    apply(
        &services,
        &body.product_id,
        &body.warehouse_id,
        QuantityChange::In { qty: body.qty },
        body.description,
    )
    .await
}

pub async fn adjust(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AdjustStockRequest>,
) -> axum::response::Response {
    apply(
        &services,
        &body.product_id,
        &body.warehouse_id,
        QuantityChange::Adjust { delta: body.delta },
        body.description,
    )
    .await
}

/// Records the outbound leg only; the receiving side is tracked outside the
/// ledger.
pub async fn transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::TransferStockRequest>,
) -> axum::response::Response {
    apply(
        &services,
        &body.product_id,
        &body.warehouse_id,
        QuantityChange::Transfer { qty: body.qty },
        body.description,
    )
    .await
}

async fn apply(
    services: &AppServices,
    product_id: &str,
    warehouse_id: &str,
    change: QuantityChange,
    description: Option<String>,
) -> axum::response::Response {
    let product_id: ProductId = match errors::parse_id(product_id, "product") {
        Ok(v) => v,
        Err(r) => return r,
    };
    let warehouse_id: WarehouseId = match errors::parse_id(warehouse_id, "warehouse") {
        Ok(v) => v,
        Err(r) => return r,
    };
    if !services.catalog.product_exists(product_id) {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found");
    }
    if !services.catalog.warehouse_exists(warehouse_id) {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "warehouse not found");
    }

    let req = MovementRequest {
        product_id,
        warehouse_id,
        change,
        reference_id: None,
        description,
        occurred_at: Utc::now(),
    };
    match services.ledger.apply_movement(req).await {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn balance(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product_id, warehouse_id)): Path<(String, String)>,
) -> axum::response::Response {
    let product_id: ProductId = match errors::parse_id(&product_id, "product") {
        Ok(v) => v,
        Err(r) => return r,
    };
    let warehouse_id: WarehouseId = match errors::parse_id(&warehouse_id, "warehouse") {
        Ok(v) => v,
        Err(r) => return r,
    };
    if !services.catalog.product_exists(product_id) {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found");
    }
    if !services.catalog.warehouse_exists(warehouse_id) {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "warehouse not found");
    }
    let snapshot = services.ledger.balance(product_id, warehouse_id);
    (StatusCode::OK, Json(snapshot)).into_response()
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::SummaryQuery>,
) -> axum::response::Response {
    let warehouse_id = match query.warehouse_id.as_deref() {
        Some(raw) => match errors::parse_id::<WarehouseId>(raw, "warehouse") {
            Ok(v) => Some(v),
            Err(r) => return r,
        },
        None => None,
    };
    let threshold = query
        .low_stock_threshold
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);

    let balances = services.ledger.balances(warehouse_id);
    let items = inventory_summary(&balances, &services.catalog, threshold);
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn movements(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::MovementsQuery>,
) -> axum::response::Response {
    let product_id = match query.product_id.as_deref() {
        Some(raw) => match errors::parse_id::<ProductId>(raw, "product") {
            Ok(v) => Some(v),
            Err(r) => return r,
        },
        None => None,
    };
    let warehouse_id = match query.warehouse_id.as_deref() {
        Some(raw) => match errors::parse_id::<WarehouseId>(raw, "warehouse") {
            Ok(v) => Some(v),
            Err(r) => return r,
        },
        None => None,
    };
    let movement_type = match query.movement_type.as_deref() {
        Some(raw) => match MovementType::parse(raw) {
            Ok(v) => Some(v),
            Err(e) => return errors::domain_error_to_response(e),
        },
        None => None,
    };

    let filter = MovementFilter {
        product_id,
        warehouse_id,
        movement_type,
        from: query.from,
        to: query.to,
        offset: query.offset,
        limit: query.limit,
    };
    let items = services.ledger.movements(&filter);
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn movement(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: MovementId = match errors::parse_id(&id, "movement") {
        Ok(v) => v,
        Err(r) => return r,
    };
    match services.ledger.movement(id) {
        Ok(movement) => (StatusCode::OK, Json(movement)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
