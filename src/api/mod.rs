//! HTTP API module for the church ledger.
//!
//! This module provides the REST API endpoints for payroll, expense and
//! catalog management. Every ledger route is scoped by [`CallerContext`].

mod context;
mod handlers;
mod request;
mod response;
mod state;

pub use context::{BRANCH_HEADER, CallerContext, HEADQUARTERS_HEADER};
pub use handlers::create_router;
pub use request::{
    CatalogRequest, CategoryRequest, EmployeeRequest, ExpenseReportQuery, ExpenseRequest,
    SalaryListQuery, SalaryRequest, SalaryUpdateRequest,
};
pub use response::{ApiError, ApiErrorResponse, Confirmation, HealthStatus};
pub use state::AppState;
