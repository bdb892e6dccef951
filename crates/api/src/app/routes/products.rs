use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockline_catalog::{NewProduct, ProductPatch, Sku};
use stockline_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product).put(update_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let sku = match Sku::parse(&body.sku) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let input = NewProduct {
        sku,
        name: body.name,
        category: body.category,
        cost_price: body.cost_price,
        selling_price: body.selling_price,
        barcode: body.barcode,
    };
    match services.catalog.create_product(input) {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match errors::parse_id(&id, "product") {
        Ok(v) => v,
        Err(r) => return r,
    };
    match services.catalog.get_product(id) {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    let id: ProductId = match errors::parse_id(&id, "product") {
        Ok(v) => v,
        Err(r) => return r,
    };
    let patch = ProductPatch {
        name: body.name,
        category: body.category,
        cost_price: body.cost_price,
        selling_price: body.selling_price,
        barcode: body.barcode,
    };
    match services.catalog.update_product(id, patch) {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListProductsQuery>,
) -> axum::response::Response {
    let items = services.catalog.list_products(query.category.as_deref());
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}
