use serde::Serialize;

use stockline_core::{ProductId, WarehouseId};

use crate::catalog_store::InMemoryCatalog;
use crate::engine::BalanceSnapshot;

/// Balances below this quantity are flagged low-stock unless the caller
/// overrides the threshold.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// One row of the inventory dashboard: balance joined with product data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventorySummaryRow {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub sku: String,
    pub name: String,
    pub qty: i64,
    /// Minor units.
    pub selling_price: i64,
    /// `qty * selling_price` in minor units, saturating at `i64::MAX`.
    pub inventory_value: i64,
    pub is_low_stock: bool,
}

/// Join balance rows with product attributes and derive dashboard fields.
///
/// Balances whose product is missing from the catalog are skipped with a
/// warning rather than failing the whole report.
pub fn inventory_summary(
    balances: &[BalanceSnapshot],
    catalog: &InMemoryCatalog,
    low_stock_threshold: i64,
) -> Vec<InventorySummaryRow> {
    let mut rows = Vec::with_capacity(balances.len());
    for balance in balances {
        let product = match catalog.get_product(balance.product_id) {
            Ok(p) => p,
            Err(_) => {
                tracing::warn!(
                    product_id = %balance.product_id,
                    "balance references a product missing from the catalog; skipping"
                );
                continue;
            }
        };
        rows.push(InventorySummaryRow {
            product_id: balance.product_id,
            warehouse_id: balance.warehouse_id,
            sku: product.sku.to_string(),
            name: product.name.clone(),
            qty: balance.qty,
            selling_price: product.selling_price,
            inventory_value: balance.qty.saturating_mul(product.selling_price),
            is_low_stock: balance.qty < low_stock_threshold,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockline_catalog::{NewProduct, Sku};

    fn balance(product_id: ProductId, qty: i64) -> BalanceSnapshot {
        BalanceSnapshot {
            product_id,
            warehouse_id: WarehouseId::new(),
            qty,
            updated_at: None,
        }
    }

    #[test]
    fn derives_value_and_low_stock_flag() {
        let catalog = InMemoryCatalog::new();
        let product = catalog
            .create_product(NewProduct {
                sku: Sku::parse("CF-01").unwrap(),
                name: "Coffee".to_string(),
                category: None,
                cost_price: None,
                selling_price: 2_500,
                barcode: None,
            })
            .unwrap();

        let rows = inventory_summary(
            &[balance(product.id, 4)],
            &catalog,
            DEFAULT_LOW_STOCK_THRESHOLD,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].inventory_value, 10_000);
        assert!(rows[0].is_low_stock);

        let rows = inventory_summary(&[balance(product.id, 40)], &catalog, 10);
        assert!(!rows[0].is_low_stock);
    }

    #[test]
    fn inventory_value_saturates_instead_of_wrapping() {
        let catalog = InMemoryCatalog::new();
        let product = catalog
            .create_product(NewProduct {
                sku: Sku::parse("BIG-01").unwrap(),
                name: "Bulk".to_string(),
                category: None,
                cost_price: None,
                selling_price: i64::MAX,
                barcode: None,
            })
            .unwrap();

        let rows = inventory_summary(&[balance(product.id, 2)], &catalog, 10);
        assert_eq!(rows[0].inventory_value, i64::MAX);
    }

    #[test]
    fn unknown_product_is_skipped() {
        let catalog = InMemoryCatalog::new();
        let rows = inventory_summary(&[balance(ProductId::new(), 4)], &catalog, 10);
        assert!(rows.is_empty());
    }
}
