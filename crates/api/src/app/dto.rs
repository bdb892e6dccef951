use chrono::{DateTime, Utc};
use serde::Deserialize;

use stockline_sales::PaymentMethod;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub cost_price: Option<i64>,
    pub selling_price: i64,
    pub barcode: Option<String>,
}

/// Partial product update; absent fields keep their current value. The SKU
/// is immutable and has no field here.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub cost_price: Option<i64>,
    pub selling_price: Option<i64>,
    pub barcode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWarehouseRequest {
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StockInRequest {
    pub product_id: String,
    pub warehouse_id: String,
    pub qty: i64,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub product_id: String,
    pub warehouse_id: String,
    /// Signed correction; negative values write stock off.
    pub delta: i64,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferStockRequest {
    pub product_id: String,
    pub warehouse_id: String,
    pub qty: i64,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutLineRequest {
    pub product_id: String,
    pub qty: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub warehouse_id: String,
    pub cashier_id: Option<String>,
    pub lines: Vec<CheckoutLineRequest>,
    /// Whole-order discount in minor units, applied before tax.
    #[serde(default)]
    pub discount: i64,
    pub payment_method: PaymentMethod,
    pub payment_amount: i64,
    pub notes: Option<String>,
}

// -------------------------
// Query DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub warehouse_id: Option<String>,
    pub low_stock_threshold: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementsQuery {
    pub product_id: Option<String>,
    pub warehouse_id: Option<String>,
    pub movement_type: Option<String>,
    /// Inclusive lower bound on `created_at` (RFC 3339).
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at` (RFC 3339).
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
}
