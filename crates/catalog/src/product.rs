use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult, Entity, ProductId, ValueObject};

/// Stock-keeping unit: the immutable business key of a product.
///
/// Normalized on parse: trimmed and uppercased, so "ab-01 " and "AB-01"
/// identify the same product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    pub fn parse(raw: impl AsRef<str>) -> DomainResult<Self> {
        let normalized = raw.as_ref().trim().to_uppercase();
        if normalized.is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if normalized.len() > 64 {
            return Err(DomainError::validation("sku cannot exceed 64 characters"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Sku {}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: Sku,
    pub name: String,
    pub category: Option<String>,
    /// Minor currency units (e.g. cents).
    pub cost_price: Option<i64>,
    /// Minor currency units. Required, non-negative.
    pub selling_price: i64,
    pub barcode: Option<String>,
}

/// Partial update; the SKU is immutable and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub cost_price: Option<i64>,
    pub selling_price: Option<i64>,
    pub barcode: Option<String>,
}

/// Catalog entity: a sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: Sku,
    pub name: String,
    pub category: Option<String>,
    pub cost_price: Option<i64>,
    pub selling_price: i64,
    pub barcode: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn create(input: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        validate_name(&input.name)?;
        validate_prices(input.cost_price, input.selling_price)?;

        Ok(Self {
            id: ProductId::new(),
            sku: input.sku,
            name: input.name.trim().to_string(),
            category: input.category,
            cost_price: input.cost_price,
            selling_price: input.selling_price,
            barcode: input.barcode,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a patch, returning the updated entity. The SKU never changes.
    pub fn patched(mut self, patch: ProductPatch, now: DateTime<Utc>) -> DomainResult<Self> {
        if let Some(name) = patch.name {
            validate_name(&name)?;
            self.name = name.trim().to_string();
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(cost) = patch.cost_price {
            self.cost_price = Some(cost);
        }
        if let Some(price) = patch.selling_price {
            self.selling_price = price;
        }
        validate_prices(self.cost_price, self.selling_price)?;
        if let Some(barcode) = patch.barcode {
            self.barcode = Some(barcode);
        }
        self.updated_at = now;
        Ok(self)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(())
}

fn validate_prices(cost_price: Option<i64>, selling_price: i64) -> DomainResult<()> {
    if selling_price < 0 {
        return Err(DomainError::validation("selling_price cannot be negative"));
    }
    if let Some(cost) = cost_price {
        if cost < 0 {
            return Err(DomainError::validation("cost_price cannot be negative"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(sku: &str, price: i64) -> NewProduct {
        NewProduct {
            sku: Sku::parse(sku).unwrap(),
            name: "Drip Coffee 250g".to_string(),
            category: Some("beverage".to_string()),
            cost_price: Some(1_500),
            selling_price: price,
            barcode: None,
        }
    }

    #[test]
    fn sku_is_normalized() {
        assert_eq!(Sku::parse("  ab-01 ").unwrap().as_str(), "AB-01");
        assert!(Sku::parse("   ").is_err());
    }

    #[test]
    fn create_validates_prices() {
        let err = Product::create(new_product("SKU-1", -1), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let product = Product::create(new_product("SKU-1", 2_500), Utc::now()).unwrap();
        assert_eq!(product.selling_price, 2_500);
        assert_eq!(product.sku.as_str(), "SKU-1");
    }

    #[test]
    fn patch_keeps_sku_and_bumps_updated_at() {
        let created = Utc::now();
        let product = Product::create(new_product("SKU-9", 1_000), created).unwrap();
        let later = created + chrono::Duration::seconds(5);

        let patched = product
            .clone()
            .patched(
                ProductPatch {
                    selling_price: Some(1_200),
                    ..Default::default()
                },
                later,
            )
            .unwrap();

        assert_eq!(patched.sku, product.sku);
        assert_eq!(patched.selling_price, 1_200);
        assert_eq!(patched.updated_at, later);
    }

    #[test]
    fn patch_rejects_negative_price() {
        let product = Product::create(new_product("SKU-2", 100), Utc::now()).unwrap();
        let err = product
            .patched(
                ProductPatch {
                    selling_price: Some(-10),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
