//! In-memory record of completed checkouts, plus the daily sales rollup.

use std::sync::RwLock;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use stockline_core::OrderId;
use stockline_sales::SalesOrder;

/// Dashboard rollup for one calendar day (UTC).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DailySalesSummary {
    pub total_sales: i64,
    pub total_transactions: u64,
    pub total_quantity: i64,
}

/// Append-only list of completed orders.
#[derive(Debug, Default)]
pub struct InMemorySalesLog {
    orders: RwLock<Vec<SalesOrder>>,
}

impl InMemorySalesLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, order: SalesOrder) {
        let mut orders = self
            .orders
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        orders.push(order);
    }

    pub fn get(&self, id: OrderId) -> Option<SalesOrder> {
        let orders = self
            .orders
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        orders.iter().find(|o| o.id == id).cloned()
    }

    pub fn list(&self) -> Vec<SalesOrder> {
        let orders = self
            .orders
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        orders.clone()
    }

    /// Rollup over orders created on the given UTC date.
    pub fn summary_for(&self, date: NaiveDate) -> DailySalesSummary {
        let orders = self
            .orders
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut summary = DailySalesSummary::default();
        for order in orders.iter().filter(|o| o.created_at.date_naive() == date) {
            summary.total_sales += order.total;
            summary.total_transactions += 1;
            summary.total_quantity += order.total_qty();
        }
        summary
    }

    /// Convenience: rollup for the current UTC day.
    pub fn today_summary(&self) -> DailySalesSummary {
        self.summary_for(Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use stockline_core::{CashierId, ProductId, WarehouseId};
    use stockline_sales::{compute_totals, OrderLine, PaymentMethod, StoreSettings};

    fn order_at(created_at: DateTime<Utc>, qty: i64, unit_price: i64) -> SalesOrder {
        let lines = vec![OrderLine {
            product_id: ProductId::new(),
            qty,
            unit_price,
        }];
        let totals = compute_totals(&lines, 0, &StoreSettings::default()).unwrap();
        SalesOrder::create(
            OrderId::new(),
            CashierId::new(),
            WarehouseId::new(),
            lines,
            totals,
            PaymentMethod::Cash,
            totals.total,
            None,
            created_at,
        )
        .unwrap()
    }

    #[test]
    fn summary_counts_only_the_requested_day() {
        let log = InMemorySalesLog::new();
        let now = Utc::now();
        log.record(order_at(now, 2, 5_000));
        log.record(order_at(now, 1, 3_000));
        log.record(order_at(now - Duration::days(1), 10, 1_000));

        let today = log.summary_for(now.date_naive());
        assert_eq!(today.total_transactions, 2);
        assert_eq!(today.total_quantity, 3);
        // 10_000 + 10% tax + 3_000 + 10% tax
        assert_eq!(today.total_sales, 11_000 + 3_300);

        let yesterday = log.summary_for((now - Duration::days(1)).date_naive());
        assert_eq!(yesterday.total_transactions, 1);
    }

    #[test]
    fn lookup_by_id() {
        let log = InMemorySalesLog::new();
        let order = order_at(Utc::now(), 1, 500);
        let id = order.id;
        log.record(order);
        assert!(log.get(id).is_some());
        assert!(log.get(OrderId::new()).is_none());
    }
}
