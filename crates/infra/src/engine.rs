//! Stock Ledger Engine.
//!
//! Owns the authoritative quantity-on-hand per (product, warehouse) key and
//! applies movements to it with strict consistency:
//!
//! - **Per-key serialization**: every balance mutation runs under that key's
//!   async mutex, so the read / non-negativity check / append never
//!   interleaves with another writer on the same key. Different keys proceed
//!   concurrently.
//! - **All-or-nothing commits**: the movement append and the balance update
//!   never diverge. A rejected movement leaves both untouched; a multi-line
//!   sale commits as one atomic log batch.
//! - **Bounded waiting**: lock acquisition is capped by a timeout (`Busy`),
//!   and optimistic log conflicts are retried with backoff a bounded number
//!   of times (`Conflict`).
//!
//! Balances are a projection: the movement log is the source of truth and
//! [`StockLedger::from_log`] rebuilds the cache by replay.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{
    DomainError, DomainResult, ExpectedVersion, MovementId, OrderId, ProductId, WarehouseId,
};
use stockline_ledger::{
    LedgerKey, MovementRequest, QuantityChange, StockAccount, StockMovement,
};

use crate::movement_log::{MovementFilter, MovementLog, MovementLogError};

/// Tuning knobs for lock waiting and conflict retries.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Upper bound on waiting for a per-key lock before failing `Busy`.
    pub lock_timeout: Duration,
    /// Total attempts per operation when the log reports an optimistic
    /// conflict (first try included).
    pub max_attempts: u32,
    /// Base backoff between attempts; doubles each retry.
    pub retry_backoff: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            max_attempts: 4,
            retry_backoff: Duration::from_millis(20),
        }
    }
}

/// Read-side view of one balance row. Absent rows read as qty 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub qty: i64,
    /// `None` when the key has never had a movement.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Result of a committed movement: the record plus the new balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementReceipt {
    pub movement: StockMovement,
    pub balance: BalanceSnapshot,
}

/// One cart line as the ledger sees it; pricing is not its concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleLine {
    pub product_id: ProductId,
    pub qty: i64,
}

/// Result of an atomically committed sale batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleReceipt {
    pub order_id: OrderId,
    /// One OUT movement per line, in line order.
    pub movements: Vec<StockMovement>,
    /// Final balances of every key the sale touched.
    pub balances: Vec<BalanceSnapshot>,
}

#[derive(Debug, Clone, Copy)]
struct BalanceEntry {
    qty: i64,
    version: u64,
    updated_at: DateTime<Utc>,
}

/// The ledger engine. Generic over the movement log backend.
pub struct StockLedger<L> {
    log: L,
    config: LedgerConfig,
    balances: RwLock<HashMap<LedgerKey, BalanceEntry>>,
    locks: Mutex<HashMap<LedgerKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl<L> StockLedger<L>
where
    L: MovementLog,
{
    pub fn new(log: L) -> Self {
        Self::with_config(log, LedgerConfig::default())
    }

    pub fn with_config(log: L, config: LedgerConfig) -> Self {
        Self {
            log,
            config,
            balances: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Rebuild the balance projection by replaying the log.
    ///
    /// Fails if the replay ever drives a balance negative: that means the
    /// log was written by something that did not enforce the invariant.
    pub fn from_log(log: L, config: LedgerConfig) -> DomainResult<Self> {
        let ledger = Self::with_config(log, config);
        {
            let history = ledger.log.query(&MovementFilter::default());
            let mut balances = ledger
                .balances
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            for movement in &history {
                let key = movement.key();
                let entry = balances.entry(key).or_insert(BalanceEntry {
                    qty: 0,
                    version: 0,
                    updated_at: movement.created_at,
                });
                entry.qty += movement.delta;
                entry.version = movement.sequence;
                entry.updated_at = movement.created_at;
                if entry.qty < 0 {
                    return Err(DomainError::validation(format!(
                        "movement log replay drove balance for {key} to {}",
                        entry.qty
                    )));
                }
            }
        }
        Ok(ledger)
    }

    /// Apply a single movement with full consistency guarantees.
    ///
    /// Once the append begins it runs to completion under the key's lock;
    /// cancelling the future before that point leaves no trace.
    pub async fn apply_movement(&self, req: MovementRequest) -> DomainResult<MovementReceipt> {
        // Fail fast on malformed requests before taking any lock.
        req.validate()?;

        let key = req.key();
        let _guard = self.acquire(key).await?;

        let mut attempt = 1u32;
        loop {
            let account = self.account_for(key)?;
            let draft = account.handle(&req)?;

            match self
                .log
                .append(vec![draft], &[(key, ExpectedVersion::Exact(account.version()))])
            {
                Ok(committed) => {
                    let movement = committed.into_iter().next().ok_or_else(|| {
                        DomainError::conflict("movement log committed an empty batch")
                    })?;
                    let mut account = account;
                    account.apply(&movement);
                    self.store_balance(key, account.qty(), account.version(), movement.created_at);

                    tracing::debug!(
                        key = %key,
                        movement_type = %movement.movement_type,
                        delta = movement.delta,
                        qty = account.qty(),
                        "movement committed"
                    );

                    return Ok(MovementReceipt {
                        balance: self.balance(key.product_id, key.warehouse_id),
                        movement,
                    });
                }
                Err(MovementLogError::Concurrency { .. }) if attempt < self.config.max_attempts => {
                    tracing::warn!(key = %key, attempt, "optimistic conflict, retrying");
                    self.refresh_from_log(key);
                    tokio::time::sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(map_log_error(e)),
            }
        }
    }

    /// Record a checkout: one OUT movement per line, committed as a single
    /// atomic batch. Either every line commits or none does; the first line
    /// that would overdraw names its product in `InsufficientStock`.
    pub async fn record_sale(
        &self,
        order_id: OrderId,
        warehouse_id: WarehouseId,
        lines: &[SaleLine],
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<SaleReceipt> {
        if lines.is_empty() {
            return Err(DomainError::validation("sale must have at least one line"));
        }
        let requests: Vec<MovementRequest> = lines
            .iter()
            .map(|line| MovementRequest {
                product_id: line.product_id,
                warehouse_id,
                change: QuantityChange::Out { qty: line.qty },
                reference_id: Some(order_id),
                description: Some(format!("sale order {order_id}")),
                occurred_at,
            })
            .collect();
        for req in &requests {
            req.validate()?;
        }

        // Canonical lock order across all touched keys prevents deadlock
        // between concurrent multi-line sales.
        let mut keys: Vec<LedgerKey> = requests.iter().map(|r| r.key()).collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            guards.push(self.acquire(*key).await?);
        }

        let mut attempt = 1u32;
        loop {
            // Stage accounts so repeated lines on one product are decided
            // against the quantity left by their predecessors.
            let mut staged: BTreeMap<LedgerKey, StockAccount> = BTreeMap::new();
            let mut expectations = Vec::with_capacity(keys.len());
            for key in &keys {
                let account = self.account_for(*key)?;
                expectations.push((*key, ExpectedVersion::Exact(account.version())));
                staged.insert(*key, account);
            }

            let mut drafts = Vec::with_capacity(requests.len());
            for req in &requests {
                let account = staged
                    .get_mut(&req.key())
                    .ok_or_else(|| DomainError::conflict("sale staging lost a key"))?;
                let draft = account.handle(req)?;
                account.apply_draft(&draft);
                drafts.push(draft);
            }

            match self.log.append(drafts, &expectations) {
                Ok(committed) => {
                    let now = committed
                        .last()
                        .map(|m| m.created_at)
                        .unwrap_or(occurred_at);
                    let mut last_sequence: HashMap<LedgerKey, u64> = HashMap::new();
                    for movement in &committed {
                        last_sequence.insert(movement.key(), movement.sequence);
                    }
                    for (key, account) in &staged {
                        let version = last_sequence.get(key).copied().unwrap_or(account.version());
                        self.store_balance(*key, account.qty(), version, now);
                    }

                    tracing::info!(
                        order_id = %order_id,
                        warehouse_id = %warehouse_id,
                        lines = committed.len(),
                        "sale committed"
                    );

                    let balances = keys
                        .iter()
                        .map(|k| self.balance(k.product_id, k.warehouse_id))
                        .collect();
                    return Ok(SaleReceipt {
                        order_id,
                        movements: committed,
                        balances,
                    });
                }
                Err(MovementLogError::Concurrency { .. }) if attempt < self.config.max_attempts => {
                    tracing::warn!(order_id = %order_id, attempt, "optimistic conflict on sale, retrying");
                    for key in &keys {
                        self.refresh_from_log(*key);
                    }
                    tokio::time::sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(map_log_error(e)),
            }
        }
    }

    /// Current balance; qty 0 (never an error) when the key has no history.
    pub fn balance(&self, product_id: ProductId, warehouse_id: WarehouseId) -> BalanceSnapshot {
        let key = LedgerKey::new(product_id, warehouse_id);
        let balances = self
            .balances
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match balances.get(&key) {
            Some(entry) => BalanceSnapshot {
                product_id,
                warehouse_id,
                qty: entry.qty,
                updated_at: Some(entry.updated_at),
            },
            None => BalanceSnapshot {
                product_id,
                warehouse_id,
                qty: 0,
                updated_at: None,
            },
        }
    }

    /// All balance rows that have ever had a movement, optionally filtered
    /// by warehouse, in key order.
    pub fn balances(&self, warehouse_id: Option<WarehouseId>) -> Vec<BalanceSnapshot> {
        let balances = self
            .balances
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut rows: Vec<BalanceSnapshot> = balances
            .iter()
            .filter(|(key, _)| warehouse_id.is_none_or(|w| key.warehouse_id == w))
            .map(|(key, entry)| BalanceSnapshot {
                product_id: key.product_id,
                warehouse_id: key.warehouse_id,
                qty: entry.qty,
                updated_at: Some(entry.updated_at),
            })
            .collect();
        rows.sort_by_key(|b| (b.product_id, b.warehouse_id));
        rows
    }

    /// Movement history in commit order (`created_at` ascending).
    pub fn movements(&self, filter: &MovementFilter) -> Vec<StockMovement> {
        self.log.query(filter)
    }

    /// Lookup one movement; `NotFound` if no such id was ever committed.
    pub fn movement(&self, id: MovementId) -> DomainResult<StockMovement> {
        self.log.get(id).ok_or(DomainError::NotFound)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.config.retry_backoff * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    async fn acquire(
        &self,
        key: LedgerKey,
    ) -> DomainResult<tokio::sync::OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            locks
                .entry(key)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };

        tokio::time::timeout(self.config.lock_timeout, lock.lock_owned())
            .await
            .map_err(|_| DomainError::busy(format!("timed out waiting for ledger key {key}")))
    }

    fn account_for(&self, key: LedgerKey) -> DomainResult<StockAccount> {
        let balances = self
            .balances
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match balances.get(&key) {
            Some(entry) => StockAccount::from_balance(key, entry.qty, entry.version),
            None => Ok(StockAccount::empty(key)),
        }
    }

    fn store_balance(&self, key: LedgerKey, qty: i64, version: u64, updated_at: DateTime<Utc>) {
        let mut balances = self
            .balances
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        balances.insert(
            key,
            BalanceEntry {
                qty,
                version,
                updated_at,
            },
        );
    }

    /// Re-derive one key's balance from the log after a conflict: another
    /// writer advanced the stream, so the cache is stale.
    fn refresh_from_log(&self, key: LedgerKey) {
        let stream = self.log.load_key(key);
        if let Some(last) = stream.last() {
            let qty: i64 = stream.iter().map(|m| m.delta).sum();
            self.store_balance(key, qty, last.sequence, last.created_at);
        }
    }
}

fn map_log_error(err: MovementLogError) -> DomainError {
    match err {
        MovementLogError::Concurrency { key, .. } => DomainError::conflict(format!(
            "concurrent writers on ledger key {key} exceeded the retry budget"
        )),
        MovementLogError::InvalidAppend(msg) => DomainError::validation(msg),
    }
}
