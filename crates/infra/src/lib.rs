//! Infrastructure layer: movement log, ledger engine, stores, projections.

pub mod catalog_store;
pub mod engine;
pub mod movement_log;
pub mod projections;
pub mod sales_log;


pub use catalog_store::InMemoryCatalog;
pub use engine::{BalanceSnapshot, LedgerConfig, MovementReceipt, SaleLine, SaleReceipt, StockLedger};
pub use movement_log::{InMemoryMovementLog, MovementFilter, MovementLog, MovementLogError};
pub use sales_log::{DailySalesSummary, InMemorySalesLog};
