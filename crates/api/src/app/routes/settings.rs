use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockline_sales::StoreSettings;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(get_settings).put(put_settings))
}

pub async fn get_settings(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    (StatusCode::OK, Json(services.settings())).into_response()
}

pub async fn put_settings(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<StoreSettings>,
) -> axum::response::Response {
    match services.update_settings(body) {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
