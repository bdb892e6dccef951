//! Checkout domain module.
//!
//! Order lines, payment handling, and cart total computation (tax rate and
//! rounding come from the store settings). Pure domain logic; the ledger
//! engine performs the stock side of a sale, and the API layer persists the
//! resulting order.

pub mod order;
pub mod settings;
pub mod totals;

pub use order::{OrderLine, PaymentMethod, SalesOrder};
pub use settings::{RoundingMode, StoreSettings};
pub use totals::{compute_totals, OrderTotals};
