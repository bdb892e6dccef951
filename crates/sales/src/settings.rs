use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult};

/// How a computed total is rounded to a whole minor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    Nearest,
    Up,
    Down,
}

/// Store-wide settings that feed the checkout math.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub store_name: String,
    pub address: Option<String>,
    /// Tax rate in basis points (1000 = 10%).
    pub tax_rate_bps: u32,
    /// ISO currency code, informational only (all amounts are minor units).
    pub currency: String,
    pub rounding: RoundingMode,
}

impl StoreSettings {
    pub fn validate(&self) -> DomainResult<()> {
        if self.store_name.trim().is_empty() {
            return Err(DomainError::validation("store_name cannot be empty"));
        }
        if self.tax_rate_bps > 10_000 {
            return Err(DomainError::validation(
                "tax_rate_bps cannot exceed 10000 (100%)",
            ));
        }
        Ok(())
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_name: "Stockline Store".to_string(),
            address: None,
            tax_rate_bps: 1_000,
            currency: "IDR".to_string(),
            rounding: RoundingMode::Nearest,
        }
    }
}
