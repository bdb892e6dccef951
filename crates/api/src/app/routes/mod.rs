use axum::Router;

pub mod inventory;
pub mod pos;
pub mod products;
pub mod settings;
pub mod system;
pub mod warehouses;

/// Router for all service endpoints (`/health` is mounted separately).
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/warehouses", warehouses::router())
        .nest("/inventory", inventory::router())
        .nest("/pos", pos::router())
        .nest("/settings", settings::router())
}
