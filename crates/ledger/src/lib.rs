//! Stock ledger domain module.
//!
//! This crate contains the business rules for stock accounting, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). The
//! ledger is an append-only sequence of [`StockMovement`] records per
//! (product, warehouse) key; balances are a derived projection that must
//! always equal the sum of committed deltas and must never go negative.

pub mod account;
pub mod movement;

pub use account::StockAccount;
pub use movement::{
    LedgerKey, MovementDraft, MovementRequest, MovementType, QuantityChange, StockMovement,
};
