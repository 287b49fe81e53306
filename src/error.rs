//! Error types for the church ledger.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing payroll or
//! aggregating expenses.

use thiserror::Error;

use crate::models::AdjustmentKind;

/// The main error type for the ledger.
///
/// All services return this error type, so the HTTP layer only needs a single
/// mapping from domain failures to status codes.
///
/// # Example
///
/// ```
/// use church_ledger::error::LedgerError;
///
/// let error = LedgerError::EmployeeNotFound { id: 7 };
/// assert_eq!(error.to_string(), "Employee not found: 7");
/// ```
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A request field was missing or malformed.
    #[error("Invalid field '{field}': {message}")]
    InvalidField {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// A period or date window was malformed or inverted.
    #[error("Invalid period '{value}': {message}")]
    InvalidPeriod {
        /// The value as received.
        value: String,
        /// A description of the problem.
        message: String,
    },

    /// The employee does not exist in the caller's org unit.
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// The requested employee id.
        id: u64,
    },

    /// The employee exists but is not active.
    #[error("Employee {id} is inactive")]
    EmployeeInactive {
        /// The inactive employee id.
        id: u64,
    },

    /// The salary record does not exist in the caller's org unit.
    #[error("Salary record not found: {id}")]
    SalaryRecordNotFound {
        /// The requested record id.
        id: u64,
    },

    /// Another salary record already covers this employee and period.
    #[error("Salary record already exists for employee {employee_id} in {period}")]
    DuplicateSalaryPeriod {
        /// The employee id.
        employee_id: u64,
        /// The period, formatted as `YYYY-MM`.
        period: String,
    },

    /// A subsidy or discount catalog entry was not found.
    #[error("{kind} not found: {id}")]
    CatalogEntryNotFound {
        /// Which catalog was searched.
        kind: AdjustmentKind,
        /// The requested entry id.
        id: u64,
    },

    /// The expense category does not exist in the caller's org unit.
    #[error("Category not found: {id}")]
    CategoryNotFound {
        /// The requested category id.
        id: u64,
    },

    /// A category with the same name already exists in the org unit.
    #[error("A category named '{name}' already exists")]
    DuplicateCategory {
        /// The conflicting name.
        name: String,
    },

    /// The expense does not exist in the caller's org unit.
    #[error("Expense not found: {id}")]
    ExpenseNotFound {
        /// The requested expense id.
        id: u64,
    },

    /// A money total does not fit in a decimal.
    #[error("Amount out of range while computing {operation}")]
    AmountOverflow {
        /// The calculation that overflowed.
        operation: String,
    },

    /// The entity store failed unexpectedly.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the failure. Never returned to clients.
        message: String,
    },
}

impl LedgerError {
    /// Shorthand for [`LedgerError::InvalidField`].
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        LedgerError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = LedgerError::ConfigNotFound {
            path: "/missing/settings.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/settings.yaml"
        );
    }

    #[test]
    fn test_invalid_period_displays_value_and_message() {
        let error = LedgerError::InvalidPeriod {
            value: "2025-13".to_string(),
            message: "month must be between 01 and 12".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid period '2025-13': month must be between 01 and 12"
        );
    }

    #[test]
    fn test_catalog_entry_not_found_names_the_catalog() {
        let error = LedgerError::CatalogEntryNotFound {
            kind: AdjustmentKind::Discount,
            id: 3,
        };
        assert_eq!(error.to_string(), "Discount not found: 3");
    }

    #[test]
    fn test_duplicate_salary_period_displays_employee_and_period() {
        let error = LedgerError::DuplicateSalaryPeriod {
            employee_id: 4,
            period: "2025-03".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Salary record already exists for employee 4 in 2025-03"
        );
    }

    #[test]
    fn test_amount_overflow_names_the_operation() {
        let error = LedgerError::AmountOverflow {
            operation: "net salary".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Amount out of range while computing net salary"
        );
    }

    #[test]
    fn test_invalid_field_helper() {
        let error = LedgerError::invalid_field("amount", "must be greater than zero");
        assert_eq!(
            error.to_string(),
            "Invalid field 'amount': must be greater than zero"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<LedgerError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> LedgerResult<()> {
            Err(LedgerError::CategoryNotFound { id: 1 })
        }

        fn propagates_error() -> LedgerResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
