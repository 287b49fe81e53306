//! Calculation logic for the church ledger.
//!
//! This module contains the pure calculations behind the ledger: net salary
//! from a base salary and the selected subsidies and discounts, per-category
//! expense aggregation over a date window, and overall expense totals and
//! per-type statistics. Nothing here touches storage.

mod expense_aggregation;
mod expense_totals;
mod salary;

pub use expense_aggregation::{CategoryOrdering, CategoryTotal, ExpenseFilter, aggregate_by_category};
pub use expense_totals::{
    AVERAGE_DECIMAL_PLACES, CategoryBucket, ExpenseTotals, TypeStatistics, TypeTotal,
    summarize_expenses, type_statistics,
};
pub use salary::{AdjustmentSelection, SalaryBreakdown, compute_salary, net_salary};

use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};

/// Adds two amounts, failing instead of overflowing.
pub(crate) fn add_amount(total: Decimal, amount: Decimal, operation: &str) -> LedgerResult<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| LedgerError::AmountOverflow {
            operation: operation.to_string(),
        })
}

/// Sums amounts with [`add_amount`].
pub(crate) fn sum_amounts(
    amounts: impl IntoIterator<Item = Decimal>,
    operation: &str,
) -> LedgerResult<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| add_amount(total, amount, operation))
}
