use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult, MovementId, OrderId, ProductId, WarehouseId};

/// Business category of a stock movement.
///
/// Serialized uppercase to match the audit-trail convention
/// (`IN` / `OUT` / `TRANSFER` / `ADJUST`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    In,
    Out,
    Transfer,
    Adjust,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
            MovementType::Transfer => "TRANSFER",
            MovementType::Adjust => "ADJUST",
        }
    }

    pub fn parse(s: &str) -> DomainResult<Self> {
        match s.to_uppercase().as_str() {
            "IN" => Ok(MovementType::In),
            "OUT" => Ok(MovementType::Out),
            "TRANSFER" => Ok(MovementType::Transfer),
            "ADJUST" => Ok(MovementType::Adjust),
            _ => Err(DomainError::validation(
                "movement_type must be one of: IN, OUT, TRANSFER, ADJUST",
            )),
        }
    }
}

impl core::fmt::Display for MovementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of one stock balance: a (product, warehouse) pair.
///
/// `Ord` matters: multi-key operations acquire locks in sorted key order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LedgerKey {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
}

impl LedgerKey {
    pub fn new(product_id: ProductId, warehouse_id: WarehouseId) -> Self {
        Self {
            product_id,
            warehouse_id,
        }
    }
}

impl core::fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.product_id, self.warehouse_id)
    }
}

/// Quantity effect requested against one key.
///
/// IN adds, OUT and TRANSFER (the outbound leg) subtract; their magnitudes
/// must be positive. ADJUST carries an explicit signed delta, so an
/// adjustment request is never ambiguous about direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum QuantityChange {
    In { qty: i64 },
    Out { qty: i64 },
    Transfer { qty: i64 },
    Adjust { delta: i64 },
}

impl QuantityChange {
    pub fn movement_type(&self) -> MovementType {
        match self {
            QuantityChange::In { .. } => MovementType::In,
            QuantityChange::Out { .. } => MovementType::Out,
            QuantityChange::Transfer { .. } => MovementType::Transfer,
            QuantityChange::Adjust { .. } => MovementType::Adjust,
        }
    }

    /// Positive magnitude as stored on the movement record.
    pub fn magnitude(&self) -> i64 {
        match self {
            QuantityChange::In { qty }
            | QuantityChange::Out { qty }
            | QuantityChange::Transfer { qty } => *qty,
            QuantityChange::Adjust { delta } => delta.abs(),
        }
    }

    /// Signed effect on the balance.
    pub fn delta(&self) -> i64 {
        match self {
            QuantityChange::In { qty } => *qty,
            QuantityChange::Out { qty } | QuantityChange::Transfer { qty } => -qty,
            QuantityChange::Adjust { delta } => *delta,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        match self {
            QuantityChange::In { qty }
            | QuantityChange::Out { qty }
            | QuantityChange::Transfer { qty } => {
                if *qty <= 0 {
                    return Err(DomainError::validation("qty must be a positive integer"));
                }
            }
            QuantityChange::Adjust { delta } => {
                if *delta == 0 {
                    return Err(DomainError::validation("adjust delta cannot be zero"));
                }
            }
        }
        Ok(())
    }
}

/// Command: record one quantity change against one (product, warehouse) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRequest {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub change: QuantityChange,
    pub reference_id: Option<OrderId>,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl MovementRequest {
    pub fn key(&self) -> LedgerKey {
        LedgerKey::new(self.product_id, self.warehouse_id)
    }

    pub fn validate(&self) -> DomainResult<()> {
        self.change.validate()
    }
}

/// A decided movement that has not yet been assigned a stream position.
///
/// Produced by [`crate::StockAccount::handle`]; the movement log assigns the
/// per-key `sequence` and the commit timestamp at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementDraft {
    pub id: MovementId,
    /// Business timestamp supplied by the caller.
    pub occurred_at: DateTime<Utc>,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub movement_type: MovementType,
    /// Positive magnitude of the change.
    pub qty: i64,
    /// Signed effect on the balance.
    pub delta: i64,
    pub reference_id: Option<OrderId>,
    pub description: Option<String>,
}

impl MovementDraft {
    pub fn key(&self) -> LedgerKey {
        LedgerKey::new(self.product_id, self.warehouse_id)
    }

    /// Promote to a committed record at the given stream position.
    ///
    /// `created_at` is the commit timestamp assigned by the log, not the
    /// caller's business time.
    pub fn into_committed(self, sequence: u64, created_at: DateTime<Utc>) -> StockMovement {
        StockMovement {
            id: self.id,
            created_at,
            occurred_at: self.occurred_at,
            product_id: self.product_id,
            warehouse_id: self.warehouse_id,
            movement_type: self.movement_type,
            qty: self.qty,
            delta: self.delta,
            reference_id: self.reference_id,
            description: self.description,
            sequence,
        }
    }
}

/// Immutable, append-only audit record of a single quantity change.
///
/// Once committed a movement is never updated or deleted; balances are a
/// derived projection over these records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    /// Commit timestamp, assigned by the log; non-decreasing in commit order.
    pub created_at: DateTime<Utc>,
    /// Business timestamp supplied by the caller.
    pub occurred_at: DateTime<Utc>,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub movement_type: MovementType,
    /// Positive magnitude of the change.
    pub qty: i64,
    /// Signed effect that was applied to the balance.
    pub delta: i64,
    pub reference_id: Option<OrderId>,
    pub description: Option<String>,
    /// Monotonic position in this key's stream (starts at 1).
    pub sequence: u64,
}

impl StockMovement {
    pub fn key(&self) -> LedgerKey {
        LedgerKey::new(self.product_id, self.warehouse_id)
    }
}
