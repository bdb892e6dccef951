//! In-memory catalog store: products (unique by SKU) and warehouses.
//!
//! The ledger references catalog entries by id; callers validate existence
//! here before asking the engine to move stock.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use stockline_catalog::{NewProduct, NewWarehouse, Product, ProductPatch, Sku, Warehouse};
use stockline_core::{DomainError, DomainResult, ProductId, WarehouseId};

#[derive(Debug, Default)]
struct CatalogInner {
    products: HashMap<ProductId, Product>,
    sku_index: HashMap<Sku, ProductId>,
    warehouses: HashMap<WarehouseId, Warehouse>,
}

/// Thread-safe catalog registry.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<CatalogInner>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a product; the SKU must be unique across the catalog.
    pub fn create_product(&self, input: NewProduct) -> DomainResult<Product> {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if inner.sku_index.contains_key(&input.sku) {
            return Err(DomainError::conflict(format!(
                "sku {} already exists",
                input.sku
            )));
        }
        let product = Product::create(input, Utc::now())?;
        inner.sku_index.insert(product.sku.clone(), product.id);
        inner.products.insert(product.id, product.clone());
        Ok(product)
    }

    pub fn get_product(&self, id: ProductId) -> DomainResult<Product> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.products.get(&id).cloned().ok_or(DomainError::NotFound)
    }

    pub fn product_exists(&self, id: ProductId) -> bool {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.products.contains_key(&id)
    }

    pub fn update_product(&self, id: ProductId, patch: ProductPatch) -> DomainResult<Product> {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let current = inner.products.get(&id).cloned().ok_or(DomainError::NotFound)?;
        let updated = current.patched(patch, Utc::now())?;
        inner.products.insert(id, updated.clone());
        Ok(updated)
    }

    /// List products, optionally filtered by category, ordered by SKU.
    pub fn list_products(&self, category: Option<&str>) -> Vec<Product> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut products: Vec<Product> = inner
            .products
            .values()
            .filter(|p| category.is_none_or(|c| p.category.as_deref() == Some(c)))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.sku.as_str().cmp(b.sku.as_str()));
        products
    }

    pub fn create_warehouse(&self, input: NewWarehouse) -> DomainResult<Warehouse> {
        let warehouse = Warehouse::create(input, Utc::now())?;
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.warehouses.insert(warehouse.id, warehouse.clone());
        Ok(warehouse)
    }

    pub fn warehouse_exists(&self, id: WarehouseId) -> bool {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.warehouses.contains_key(&id)
    }

    pub fn list_warehouses(&self) -> Vec<Warehouse> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut warehouses: Vec<Warehouse> = inner.warehouses.values().cloned().collect();
        warehouses.sort_by(|a, b| a.name.cmp(&b.name));
        warehouses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(sku: &str) -> NewProduct {
        NewProduct {
            sku: Sku::parse(sku).unwrap(),
            name: format!("Product {sku}"),
            category: Some("default".to_string()),
            cost_price: None,
            selling_price: 1_000,
            barcode: None,
        }
    }

    #[test]
    fn duplicate_sku_is_a_conflict() {
        let catalog = InMemoryCatalog::new();
        catalog.create_product(new_product("A-1")).unwrap();
        let err = catalog.create_product(new_product("a-1 ")).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn category_filter_applies() {
        let catalog = InMemoryCatalog::new();
        catalog.create_product(new_product("A-1")).unwrap();
        let mut other = new_product("B-1");
        other.category = Some("snack".to_string());
        catalog.create_product(other).unwrap();

        assert_eq!(catalog.list_products(Some("snack")).len(), 1);
        assert_eq!(catalog.list_products(None).len(), 2);
    }

    #[test]
    fn update_preserves_sku() {
        let catalog = InMemoryCatalog::new();
        let product = catalog.create_product(new_product("A-1")).unwrap();
        let updated = catalog
            .update_product(
                product.id,
                ProductPatch {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.sku, product.sku);
        assert_eq!(updated.name, "Renamed");
    }

    #[test]
    fn missing_product_is_not_found() {
        let catalog = InMemoryCatalog::new();
        assert!(matches!(
            catalog.get_product(ProductId::new()),
            Err(DomainError::NotFound)
        ));
        assert!(!catalog.warehouse_exists(WarehouseId::new()));
    }
}
