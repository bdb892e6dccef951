use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult};

use crate::order::OrderLine;
use crate::settings::{RoundingMode, StoreSettings};

/// Computed money breakdown of a cart, all in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: i64,
    pub discount: i64,
    pub tax: i64,
    pub total: i64,
}

/// Compute subtotal, tax and total for a cart.
///
/// `subtotal = Σ qty * unit_price`, the discount is applied before tax, and
/// the tax (settings rate, basis points) is rounded per the store's rounding
/// mode. `total = subtotal - discount + tax`.
pub fn compute_totals(
    lines: &[OrderLine],
    discount: i64,
    settings: &StoreSettings,
) -> DomainResult<OrderTotals> {
    settings.validate()?;
    if lines.is_empty() {
        return Err(DomainError::validation("order must have at least one line"));
    }

    let mut subtotal: i64 = 0;
    for line in lines {
        line.validate()?;
        subtotal = subtotal
            .checked_add(line.line_total()?)
            .ok_or_else(|| DomainError::validation("subtotal overflow"))?;
    }

    if discount < 0 {
        return Err(DomainError::validation("discount cannot be negative"));
    }
    if discount > subtotal {
        return Err(DomainError::validation("discount cannot exceed subtotal"));
    }

    let taxable = subtotal - discount;
    let tax = rounded_div(
        taxable as i128 * settings.tax_rate_bps as i128,
        10_000,
        settings.rounding,
    );
    let total = taxable + tax;

    Ok(OrderTotals {
        subtotal,
        discount,
        tax,
        total,
    })
}

fn rounded_div(numerator: i128, denominator: i128, mode: RoundingMode) -> i64 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let adjusted = if remainder == 0 {
        quotient
    } else {
        match mode {
            RoundingMode::Down => quotient,
            RoundingMode::Up => quotient + 1,
            RoundingMode::Nearest => {
                if remainder * 2 >= denominator {
                    quotient + 1
                } else {
                    quotient
                }
            }
        }
    };
    adjusted as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stockline_core::ProductId;

    fn line(qty: i64, unit_price: i64) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(),
            qty,
            unit_price,
        }
    }

    fn settings(tax_rate_bps: u32, rounding: RoundingMode) -> StoreSettings {
        StoreSettings {
            tax_rate_bps,
            rounding,
            ..Default::default()
        }
    }

    #[test]
    fn ten_percent_tax_on_round_subtotal() {
        let totals =
            compute_totals(&[line(2, 5_000)], 0, &settings(1_000, RoundingMode::Nearest)).unwrap();
        assert_eq!(totals.subtotal, 10_000);
        assert_eq!(totals.tax, 1_000);
        assert_eq!(totals.total, 11_000);
    }

    #[test]
    fn discount_is_applied_before_tax() {
        let totals =
            compute_totals(&[line(1, 10_000)], 2_000, &settings(1_000, RoundingMode::Nearest))
                .unwrap();
        assert_eq!(totals.subtotal, 10_000);
        assert_eq!(totals.discount, 2_000);
        assert_eq!(totals.tax, 800);
        assert_eq!(totals.total, 8_800);
    }

    #[test]
    fn rounding_modes_differ_on_fractional_tax() {
        // 11% of 105 = 11.55
        let lines = [line(1, 105)];
        let down = compute_totals(&lines, 0, &settings(1_100, RoundingMode::Down)).unwrap();
        let up = compute_totals(&lines, 0, &settings(1_100, RoundingMode::Up)).unwrap();
        let nearest = compute_totals(&lines, 0, &settings(1_100, RoundingMode::Nearest)).unwrap();
        assert_eq!(down.tax, 11);
        assert_eq!(up.tax, 12);
        assert_eq!(nearest.tax, 12);
    }

    #[test]
    fn huge_line_total_is_rejected_not_wrapped() {
        let err = compute_totals(
            &[line(i64::MAX, 2)],
            0,
            &settings(1_000, RoundingMode::Nearest),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // Per-line totals are fine but their sum is not.
        let err = compute_totals(
            &[line(1, i64::MAX), line(1, i64::MAX)],
            0,
            &settings(1_000, RoundingMode::Nearest),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn discount_larger_than_subtotal_is_rejected() {
        let err =
            compute_totals(&[line(1, 100)], 200, &settings(1_000, RoundingMode::Nearest))
                .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: total always equals subtotal - discount + tax, and the
        /// tax never exceeds the taxable amount for rates <= 100%.
        #[test]
        fn total_is_consistent(
            qtys in prop::collection::vec((1i64..20, 1i64..100_000), 1..8),
            discount_pct in 0i64..100,
            rate in 0u32..10_000,
        ) {
            let lines: Vec<OrderLine> = qtys
                .iter()
                .map(|(q, p)| line(*q, *p))
                .collect();
            let subtotal: i64 = lines.iter().map(|l| l.line_total().unwrap()).sum();
            let discount = subtotal * discount_pct / 100;

            for mode in [RoundingMode::Nearest, RoundingMode::Up, RoundingMode::Down] {
                let totals = compute_totals(&lines, discount, &settings(rate, mode)).unwrap();
                prop_assert_eq!(totals.subtotal, subtotal);
                prop_assert_eq!(totals.total, totals.subtotal - totals.discount + totals.tax);
                prop_assert!(totals.tax >= 0);
                prop_assert!(totals.tax <= totals.subtotal - totals.discount + 1);
            }
        }
    }
}
