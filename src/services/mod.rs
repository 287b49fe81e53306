//! Services that tie the pure calculations to the entity store.
//!
//! Each service validates its inputs, reads what the calculation needs from
//! an [`EntityStore`](crate::store::EntityStore), runs the calculation and
//! writes the result back. Services are synchronous and hold no state besides
//! the store handle.

mod catalog;
mod expenses;
mod payroll;

pub use catalog::{CatalogInput, CatalogService, EmployeeInput};
pub use expenses::{CategoryInput, CategoryUpdate, ExpenseInput, ExpenseService, LinkedExpense};
pub use payroll::{PayrollService, SalaryDetail, SalaryOutcome, SalaryUpdate};

/// Largest amount accepted for a salary, catalog entry or expense.
///
/// Keeps every total the ledger computes far below the decimal range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};

/// Trims a required text field, rejecting blank values.
pub(crate) fn required_text(field: &str, value: &str) -> LedgerResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid_field(field, "is required"));
    }
    Ok(trimmed.to_string())
}

/// Trims optional text, mapping blank values to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn non_negative(field: &str, amount: Decimal) -> LedgerResult<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(LedgerError::invalid_field(field, "must not be negative"));
    }
    within_limit(field, amount)
}

pub(crate) fn positive(field: &str, amount: Decimal) -> LedgerResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_field(field, "must be greater than zero"));
    }
    within_limit(field, amount)
}

fn within_limit(field: &str, amount: Decimal) -> LedgerResult<Decimal> {
    if amount > MAX_AMOUNT {
        return Err(LedgerError::invalid_field(
            field,
            format!("must not exceed {}", MAX_AMOUNT),
        ));
    }
    Ok(amount)
}
