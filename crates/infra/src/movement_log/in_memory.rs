use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use stockline_core::{ExpectedVersion, MovementId};
use stockline_ledger::{LedgerKey, MovementDraft, StockMovement};

use super::{MovementFilter, MovementLog, MovementLogError};

#[derive(Debug, Default)]
struct LogInner {
    /// Commit-ordered history; never truncated or rewritten.
    all: Vec<StockMovement>,
    /// Current stream version per key (sequence of the last movement).
    versions: HashMap<LedgerKey, u64>,
    /// Indexes into `all` per key, in sequence order.
    by_key: HashMap<LedgerKey, Vec<usize>>,
}

/// In-memory append-only movement log.
///
/// The single `RwLock` over the whole log is what makes multi-key batch
/// appends atomic: all expectation checks and all inserts happen under one
/// write guard. Intended for tests/dev and as the reference implementation
/// of the [`MovementLog`] contract.
#[derive(Debug, Default)]
pub struct InMemoryMovementLog {
    inner: RwLock<LogInner>,
}

impl InMemoryMovementLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MovementLog for InMemoryMovementLog {
    fn append(
        &self,
        drafts: Vec<MovementDraft>,
        expectations: &[(LedgerKey, ExpectedVersion)],
    ) -> Result<Vec<StockMovement>, MovementLogError> {
        if drafts.is_empty() {
            return Ok(vec![]);
        }

        let mut expected: HashMap<LedgerKey, ExpectedVersion> = HashMap::new();
        for (key, version) in expectations {
            if expected.insert(*key, *version).is_some() {
                return Err(MovementLogError::InvalidAppend(format!(
                    "duplicate expectation for key {key}"
                )));
            }
        }
        for draft in &drafts {
            if !expected.contains_key(&draft.key()) {
                return Err(MovementLogError::InvalidAppend(format!(
                    "no expectation provided for key {}",
                    draft.key()
                )));
            }
        }

        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Check every touched key before committing anything.
        for (key, version) in &expected {
            let actual = inner.versions.get(key).copied().unwrap_or(0);
            if !version.matches(actual) {
                return Err(MovementLogError::Concurrency {
                    key: *key,
                    expected: *version,
                    actual,
                });
            }
        }

        // Commit timestamp is stamped here, under the write lock, and clamped
        // so it never runs backwards relative to the last committed movement.
        // Callers capture `occurred_at` before they queue for the key lock, so
        // that field cannot order the log.
        let mut stamp = Utc::now();
        if let Some(last) = inner.all.last() {
            if stamp < last.created_at {
                stamp = last.created_at;
            }
        }

        // All checks passed: assign sequences and append.
        let mut committed = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let key = draft.key();
            let next = inner.versions.get(&key).copied().unwrap_or(0) + 1;
            let movement = draft.into_committed(next, stamp);

            let index = inner.all.len();
            inner.all.push(movement.clone());
            inner.versions.insert(key, next);
            inner.by_key.entry(key).or_default().push(index);
            committed.push(movement);
        }

        Ok(committed)
    }

    fn load_key(&self, key: LedgerKey) -> Vec<StockMovement> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner
            .by_key
            .get(&key)
            .map(|indexes| indexes.iter().map(|&i| inner.all[i].clone()).collect())
            .unwrap_or_default()
    }

    fn query(&self, filter: &MovementFilter) -> Vec<StockMovement> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let iter = inner.all.iter().filter(|m| filter.matches(m)).skip(filter.offset);
        match filter.limit {
            Some(limit) => iter.take(limit).cloned().collect(),
            None => iter.cloned().collect(),
        }
    }

    fn get(&self, id: MovementId) -> Option<StockMovement> {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.all.iter().find(|m| m.id == id).cloned()
    }
}
