//! Application state for the church ledger API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::services::{CatalogService, ExpenseService, PayrollService};
use crate::store::{EntityStore, InMemoryStore};

/// Shared application state.
///
/// Holds one instance of each service, all backed by the same store.
#[derive(Clone)]
pub struct AppState {
    payroll: PayrollService,
    expenses: ExpenseService,
    catalog: CatalogService,
}

impl AppState {
    /// Creates the application state over the given store.
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            payroll: PayrollService::new(store.clone()),
            expenses: ExpenseService::new(store.clone()),
            catalog: CatalogService::new(store),
        }
    }

    /// Creates the application state over an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    /// Salary computation and salary record management.
    pub fn payroll(&self) -> &PayrollService {
        &self.payroll
    }

    /// Expense aggregation and category/expense management.
    pub fn expenses(&self) -> &ExpenseService {
        &self.expenses
    }

    /// Employees and the subsidy and discount catalogs.
    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }
}
