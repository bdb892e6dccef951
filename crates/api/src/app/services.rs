//! Service wiring shared by every handler.

use std::sync::{Arc, RwLock};

use stockline_core::DomainResult;
use stockline_infra::{InMemoryCatalog, InMemoryMovementLog, InMemorySalesLog, StockLedger};
use stockline_sales::StoreSettings;

/// Everything the handlers need, wired once at startup and shared via
/// `Extension<Arc<AppServices>>`.
pub struct AppServices {
    pub ledger: StockLedger<Arc<InMemoryMovementLog>>,
    pub catalog: InMemoryCatalog,
    pub sales: InMemorySalesLog,
    settings: RwLock<StoreSettings>,
}

impl AppServices {
    pub fn new() -> Self {
        Self {
            ledger: StockLedger::new(Arc::new(InMemoryMovementLog::new())),
            catalog: InMemoryCatalog::new(),
            sales: InMemorySalesLog::new(),
            settings: RwLock::new(StoreSettings::default()),
        }
    }

    pub fn settings(&self) -> StoreSettings {
        self.settings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the store settings wholesale after validation.
    pub fn update_settings(&self, next: StoreSettings) -> DomainResult<StoreSettings> {
        next.validate()?;
        let mut guard = self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = next.clone();
        Ok(next)
    }
}

impl Default for AppServices {
    fn default() -> Self {
        Self::new()
    }
}
