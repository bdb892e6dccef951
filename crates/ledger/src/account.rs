use stockline_core::{DomainError, DomainResult, MovementId};

use crate::movement::{LedgerKey, MovementDraft, MovementRequest, StockMovement};

/// Decision/evolution unit for one (product, warehouse) balance.
///
/// A `StockAccount` is rehydrated from the cached balance (or from replaying
/// the movement log), asked to decide on movement requests via [`handle`],
/// and evolved via [`apply`]/[`apply_draft`]. Decisions never mutate state;
/// the engine commits the draft to the log first and only then evolves the
/// account, so a rejected movement leaves both the balance and the log
/// untouched.
///
/// [`handle`]: StockAccount::handle
/// [`apply`]: StockAccount::apply
/// [`apply_draft`]: StockAccount::apply_draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAccount {
    key: LedgerKey,
    qty: i64,
    version: u64,
}

impl StockAccount {
    /// Account with no history: qty 0, version 0.
    pub fn empty(key: LedgerKey) -> Self {
        Self {
            key,
            qty: 0,
            version: 0,
        }
    }

    /// Rehydrate from a cached balance row.
    ///
    /// Rejects negative quantities so a corrupted projection cannot be used
    /// as a base for further movements.
    pub fn from_balance(key: LedgerKey, qty: i64, version: u64) -> DomainResult<Self> {
        if qty < 0 {
            return Err(DomainError::validation(format!(
                "balance for {key} is negative ({qty}); ledger projection is corrupt"
            )));
        }
        Ok(Self { key, qty, version })
    }

    pub fn key(&self) -> LedgerKey {
        self.key
    }

    pub fn qty(&self) -> i64 {
        self.qty
    }

    /// Stream version: the sequence number of the last applied movement.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Decide whether a movement request is admissible against the current
    /// balance. Does not mutate state.
    ///
    /// Fails with `Validation` for malformed requests and `InsufficientStock`
    /// when the resulting quantity would be negative.
    pub fn handle(&self, req: &MovementRequest) -> DomainResult<MovementDraft> {
        if req.key() != self.key {
            return Err(DomainError::validation(format!(
                "movement for {} routed to account {}",
                req.key(),
                self.key
            )));
        }
        req.validate()?;

        let delta = req.change.delta();
        let new_qty = self
            .qty
            .checked_add(delta)
            .ok_or_else(|| DomainError::validation("quantity overflow"))?;

        if new_qty < 0 {
            return Err(DomainError::insufficient_stock(
                self.key.product_id,
                req.change.magnitude(),
                self.qty,
            ));
        }

        Ok(MovementDraft {
            id: MovementId::new(),
            occurred_at: req.occurred_at,
            product_id: req.product_id,
            warehouse_id: req.warehouse_id,
            movement_type: req.change.movement_type(),
            qty: req.change.magnitude(),
            delta,
            reference_id: req.reference_id,
            description: req.description.clone(),
        })
    }

    /// Evolve from a committed movement. Version tracks the stream position.
    pub fn apply(&mut self, movement: &StockMovement) {
        debug_assert_eq!(movement.key(), self.key);
        self.qty += movement.delta;
        self.version = movement.sequence;
    }

    /// Evolve from a decided-but-uncommitted draft.
    ///
    /// Used when staging multiple movements against the same key in one
    /// atomic batch (a multi-line sale): each line is decided against the
    /// staged quantity left by its predecessors.
    pub fn apply_draft(&mut self, draft: &MovementDraft) {
        debug_assert_eq!(draft.key(), self.key);
        self.qty += draft.delta;
        self.version += 1;
    }
}
