//! Products & warehouses domain module.
//!
//! Plain entities with constructor-time validation (no IO, no HTTP, no
//! storage). The ledger references these by id and never mutates them.

pub mod product;
pub mod warehouse;

pub use product::{NewProduct, Product, ProductPatch, Sku};
pub use warehouse::{NewWarehouse, Warehouse};
