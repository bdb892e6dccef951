//! Read-side projections over ledger and sales state.
//!
//! Projections are pure derivations: disposable, rebuildable, and with no
//! invariants of their own.

pub mod inventory_summary;

pub use inventory_summary::{inventory_summary, InventorySummaryRow, DEFAULT_LOW_STOCK_THRESHOLD};
