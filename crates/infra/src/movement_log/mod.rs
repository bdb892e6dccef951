//! Append-only movement log boundary.
//!
//! The log is the source of truth for the ledger: every committed
//! [`StockMovement`] lives here, ordered by commit, and balances are a
//! projection over it. This module defines the storage abstraction without
//! making any backend assumptions; the in-memory implementation is the
//! default, and a SQL backend would slot in behind the same trait.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use stockline_core::{ExpectedVersion, MovementId};
use stockline_ledger::{LedgerKey, MovementDraft, MovementType, StockMovement};

pub mod in_memory;

pub use in_memory::InMemoryMovementLog;

/// Movement log operation error.
#[derive(Debug, Error)]
pub enum MovementLogError {
    /// A per-key optimistic version check failed: another writer committed
    /// to the key between the caller's read and this append.
    #[error("optimistic concurrency check failed for {key}: expected {expected:?}, found {actual}")]
    Concurrency {
        key: LedgerKey,
        expected: ExpectedVersion,
        actual: u64,
    },

    /// The batch itself is malformed (duplicate expectations, missing
    /// expectation for a touched key).
    #[error("invalid append: {0}")]
    InvalidAppend(String),
}

/// Query over movement history.
///
/// Results are ordered by commit order, which coincides with `created_at`
/// ascending because appends are serialized by the log. `offset`/`limit`
/// make the sequence restartable for paged consumption.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementFilter {
    pub product_id: Option<stockline_core::ProductId>,
    pub warehouse_id: Option<stockline_core::WarehouseId>,
    pub movement_type: Option<MovementType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl MovementFilter {
    pub fn matches(&self, movement: &StockMovement) -> bool {
        if let Some(p) = self.product_id {
            if movement.product_id != p {
                return false;
            }
        }
        if let Some(w) = self.warehouse_id {
            if movement.warehouse_id != w {
                return false;
            }
        }
        if let Some(t) = self.movement_type {
            if movement.movement_type != t {
                return false;
            }
        }
        if let Some(from) = self.from {
            if movement.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if movement.created_at >= to {
                return false;
            }
        }
        true
    }
}

/// Append-only, per-key versioned movement log.
///
/// Implementations must:
/// - enforce the per-key optimistic version check before committing anything
/// - assign monotonically increasing per-key `sequence`s starting at
///   `current_version + 1`
/// - commit a batch atomically across all touched keys (all or nothing)
/// - never mutate or delete a committed movement
pub trait MovementLog: Send + Sync {
    /// Append a batch of drafts atomically.
    ///
    /// `expectations` carries exactly one expected version per touched key;
    /// when a key appears several times in `drafts`, the expectation applies
    /// to the first and subsequent drafts extend the stream. Returns the
    /// committed movements in draft order.
    fn append(
        &self,
        drafts: Vec<MovementDraft>,
        expectations: &[(LedgerKey, ExpectedVersion)],
    ) -> Result<Vec<StockMovement>, MovementLogError>;

    /// Full stream for one key, in sequence order. Empty if no history.
    fn load_key(&self, key: LedgerKey) -> Vec<StockMovement>;

    /// Filtered history in commit order.
    fn query(&self, filter: &MovementFilter) -> Vec<StockMovement>;

    /// Lookup a single movement by id.
    fn get(&self, id: MovementId) -> Option<StockMovement>;
}

impl<L> MovementLog for Arc<L>
where
    L: MovementLog + ?Sized,
{
    fn append(
        &self,
        drafts: Vec<MovementDraft>,
        expectations: &[(LedgerKey, ExpectedVersion)],
    ) -> Result<Vec<StockMovement>, MovementLogError> {
        (**self).append(drafts, expectations)
    }

    fn load_key(&self, key: LedgerKey) -> Vec<StockMovement> {
        (**self).load_key(key)
    }

    fn query(&self, filter: &MovementFilter) -> Vec<StockMovement> {
        (**self).query(filter)
    }

    fn get(&self, id: MovementId) -> Option<StockMovement> {
        (**self).get(id)
    }
}
