use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{CashierId, DomainError, DomainResult, OrderId, ProductId, WarehouseId};

use crate::totals::OrderTotals;

/// Accepted tender types at the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Qris,
    BankTransfer,
}

/// One cart line: product, quantity, unit price in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub qty: i64,
    pub unit_price: i64,
}

impl OrderLine {
    pub fn validate(&self) -> DomainResult<()> {
        if self.qty <= 0 {
            return Err(DomainError::validation("line qty must be positive"));
        }
        if self.unit_price < 0 {
            return Err(DomainError::validation("unit_price cannot be negative"));
        }
        Ok(())
    }

    pub fn line_total(&self) -> DomainResult<i64> {
        self.qty
            .checked_mul(self.unit_price)
            .ok_or_else(|| DomainError::validation("line total overflow"))
    }
}

/// A completed checkout. Immutable once recorded; the stock side lives in the
/// movement ledger under this order's id as `reference_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrder {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub cashier_id: CashierId,
    pub warehouse_id: WarehouseId,
    pub lines: Vec<OrderLine>,
    pub subtotal: i64,
    pub discount: i64,
    pub tax: i64,
    pub total: i64,
    pub payment_method: PaymentMethod,
    pub payment_amount: i64,
    pub change: i64,
    pub notes: Option<String>,
}

impl SalesOrder {
    /// Assemble an order from validated lines and computed totals.
    ///
    /// Fails when the tendered amount does not cover the total.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: OrderId,
        cashier_id: CashierId,
        warehouse_id: WarehouseId,
        lines: Vec<OrderLine>,
        totals: OrderTotals,
        payment_method: PaymentMethod,
        payment_amount: i64,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("order must have at least one line"));
        }
        for line in &lines {
            line.validate()?;
        }
        if payment_amount < totals.total {
            return Err(DomainError::validation(format!(
                "payment_amount {} does not cover total {}",
                payment_amount, totals.total
            )));
        }

        Ok(Self {
            id,
            created_at: now,
            cashier_id,
            warehouse_id,
            lines,
            subtotal: totals.subtotal,
            discount: totals.discount,
            tax: totals.tax,
            total: totals.total,
            payment_method,
            payment_amount,
            change: payment_amount - totals.total,
            notes,
        })
    }

    /// Total units across all lines, saturating rather than wrapping.
    pub fn total_qty(&self) -> i64 {
        self.lines.iter().fold(0i64, |acc, l| acc.saturating_add(l.qty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::StoreSettings;
    use crate::totals::compute_totals;

    fn line(qty: i64, unit_price: i64) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(),
            qty,
            unit_price,
        }
    }

    fn build(lines: Vec<OrderLine>, payment: i64) -> DomainResult<SalesOrder> {
        let totals = compute_totals(&lines, 0, &StoreSettings::default())?;
        SalesOrder::create(
            OrderId::new(),
            CashierId::new(),
            WarehouseId::new(),
            lines,
            totals,
            PaymentMethod::Cash,
            payment,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn change_is_payment_minus_total() {
        // subtotal 10_000, 10% tax -> total 11_000
        let order = build(vec![line(2, 5_000)], 15_000).unwrap();
        assert_eq!(order.total, 11_000);
        assert_eq!(order.change, 4_000);
        assert_eq!(order.total_qty(), 2);
    }

    #[test]
    fn underpayment_is_rejected() {
        let err = build(vec![line(1, 10_000)], 10_999).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn empty_cart_is_rejected() {
        let err = build(vec![], 1_000).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn invalid_line_is_rejected() {
        let err = build(vec![line(0, 1_000)], 1_000).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
