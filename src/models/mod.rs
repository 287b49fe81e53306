//! Core data models for the church ledger.
//!
//! This module contains all the domain models used throughout the ledger.

mod catalog;
mod employee;
mod expense;
mod org_unit;
mod period;
mod salary_record;

pub use catalog::{AdjustmentKind, AppliedAdjustment, CatalogEntry, NewCatalogEntry};
pub use employee::{Employee, NewEmployee};
pub use expense::{
    CategoryExpenseLink, Expense, ExpenseCategory, ExpenseType, NewCategory, NewExpense,
};
pub use org_unit::OrgUnit;
pub use period::{DateWindow, Period};
pub(crate) use period::ensure_ordered;
pub use salary_record::{SalaryDraft, SalaryRecord};
