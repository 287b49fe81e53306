//! Durable storage abstraction for ledger entities.
//!
//! Services talk to an [`EntityStore`] so they can be exercised against the
//! bundled [`InMemoryStore`] or a database-backed implementation alike. The
//! store owns the uniqueness and referential constraints:
//!
//! - one salary record per (employee, period)
//! - one category name per org unit (trimmed, case-insensitive)
//! - at most one category link per expense
//! - links reference existing expenses and categories of the same org unit

mod memory;

pub use memory::InMemoryStore;

use crate::error::LedgerError;
use crate::models::{
    AdjustmentKind, CatalogEntry, CategoryExpenseLink, Employee, Expense, ExpenseCategory,
    NewCatalogEntry, NewCategory, NewEmployee, NewExpense, OrgUnit, Period, SalaryDraft,
    SalaryRecord,
};

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("conflict: {message}")]
    Conflict {
        /// Which constraint was hit.
        message: String,
    },
    /// The referenced row does not exist in the given org unit.
    #[error("{entity} {id} not found")]
    NotFound {
        /// The kind of row.
        entity: &'static str,
        /// The requested id.
        id: u64,
    },
    /// The backing storage could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A type alias for Results that return StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for LedgerError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { entity: "employee", id } => LedgerError::EmployeeNotFound { id },
            StoreError::NotFound { entity: "salary record", id } => {
                LedgerError::SalaryRecordNotFound { id }
            }
            StoreError::NotFound { entity: "category", id } => LedgerError::CategoryNotFound { id },
            StoreError::NotFound { entity: "expense", id } => LedgerError::ExpenseNotFound { id },
            StoreError::NotFound { entity: "subsidy", id } => LedgerError::CatalogEntryNotFound {
                kind: AdjustmentKind::Subsidy,
                id,
            },
            StoreError::NotFound { entity: "discount", id } => LedgerError::CatalogEntryNotFound {
                kind: AdjustmentKind::Discount,
                id,
            },
            other => LedgerError::Storage {
                message: other.to_string(),
            },
        }
    }
}

/// Change to apply to an expense's category link on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkChange {
    /// Leave the current link untouched.
    #[default]
    Keep,
    /// Link to this category, replacing any existing link.
    Set(u64),
    /// Remove the link, leaving the expense uncategorised.
    Clear,
}

/// Filters for listing salary records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalaryQuery {
    /// Earliest period, inclusive.
    pub start: Option<Period>,
    /// Latest period, inclusive.
    pub end: Option<Period>,
    /// Only records of this employee.
    pub employee_id: Option<u64>,
}

impl SalaryQuery {
    /// Returns true if the record passes every filter.
    pub fn matches(&self, record: &SalaryRecord) -> bool {
        self.start.is_none_or(|start| record.period >= start)
            && self.end.is_none_or(|end| record.period <= end)
            && self.employee_id.is_none_or(|id| record.employee_id == id)
    }
}

/// Storage abstraction for every ledger entity.
///
/// All reads are scoped by [`OrgUnit`]; a row owned by another unit behaves
/// exactly like a missing row.
pub trait EntityStore: Send + Sync {
    /// Inserts an employee and returns it with its assigned id.
    fn insert_employee(&self, employee: NewEmployee) -> StoreResult<Employee>;
    /// Replaces an existing employee.
    fn update_employee(&self, employee: Employee) -> StoreResult<Employee>;
    /// Fetches one employee.
    fn fetch_employee(&self, org: OrgUnit, id: u64) -> StoreResult<Option<Employee>>;
    /// Lists employees ordered by id.
    fn list_employees(&self, org: OrgUnit) -> StoreResult<Vec<Employee>>;

    /// Inserts a subsidy or discount.
    fn insert_catalog_entry(&self, entry: NewCatalogEntry) -> StoreResult<CatalogEntry>;
    /// Replaces an existing subsidy or discount.
    fn update_catalog_entry(&self, entry: CatalogEntry) -> StoreResult<CatalogEntry>;
    /// Fetches one subsidy or discount.
    fn fetch_catalog_entry(
        &self,
        org: OrgUnit,
        kind: AdjustmentKind,
        id: u64,
    ) -> StoreResult<Option<CatalogEntry>>;
    /// Deletes a subsidy or discount.
    fn delete_catalog_entry(&self, org: OrgUnit, kind: AdjustmentKind, id: u64) -> StoreResult<()>;
    /// Lists one catalog ordered by id.
    fn list_catalog(&self, org: OrgUnit, kind: AdjustmentKind) -> StoreResult<Vec<CatalogEntry>>;

    /// Inserts a record for (employee, period) or overwrites the existing one.
    ///
    /// Returns the stored record and `true` when it was newly created. The
    /// lookup and the write happen atomically.
    fn upsert_salary_record(&self, draft: SalaryDraft) -> StoreResult<(SalaryRecord, bool)>;
    /// Overwrites the record `id` with a new draft.
    ///
    /// Fails with `Conflict` if another record already holds the draft's
    /// (employee, period).
    fn replace_salary_record(&self, id: u64, draft: SalaryDraft) -> StoreResult<SalaryRecord>;
    /// Fetches one salary record.
    fn fetch_salary_record(&self, org: OrgUnit, id: u64) -> StoreResult<Option<SalaryRecord>>;
    /// Deletes one salary record.
    fn delete_salary_record(&self, org: OrgUnit, id: u64) -> StoreResult<()>;
    /// Lists salary records matching the query, newest period first.
    fn list_salary_records(&self, org: OrgUnit, query: SalaryQuery)
    -> StoreResult<Vec<SalaryRecord>>;

    /// Inserts a category; `Conflict` on a duplicate name.
    fn insert_category(&self, category: NewCategory) -> StoreResult<ExpenseCategory>;
    /// Replaces a category; `Conflict` if another category has the name.
    fn update_category(&self, category: ExpenseCategory) -> StoreResult<ExpenseCategory>;
    /// Fetches one category.
    fn fetch_category(&self, org: OrgUnit, id: u64) -> StoreResult<Option<ExpenseCategory>>;
    /// Finds a category by name (trimmed, case-insensitive).
    fn find_category_by_name(&self, org: OrgUnit, name: &str)
    -> StoreResult<Option<ExpenseCategory>>;
    /// Deletes a category and its links; returns how many expenses were unlinked.
    fn delete_category(&self, org: OrgUnit, id: u64) -> StoreResult<usize>;
    /// Lists categories ordered by id.
    fn list_categories(&self, org: OrgUnit) -> StoreResult<Vec<ExpenseCategory>>;

    /// Inserts an expense, optionally linked to a category.
    fn insert_expense(&self, expense: NewExpense, category_id: Option<u64>)
    -> StoreResult<Expense>;
    /// Replaces an expense and applies the link change.
    ///
    /// Returns the stored expense with the category it is linked to afterwards.
    fn update_expense(&self, expense: Expense, link: LinkChange)
    -> StoreResult<(Expense, Option<u64>)>;
    /// Fetches one expense.
    fn fetch_expense(&self, org: OrgUnit, id: u64) -> StoreResult<Option<Expense>>;
    /// Deletes an expense and its link.
    fn delete_expense(&self, org: OrgUnit, id: u64) -> StoreResult<()>;
    /// Lists expenses, most recently recorded first.
    fn list_expenses(&self, org: OrgUnit) -> StoreResult<Vec<Expense>>;
    /// Lists the category links of the org unit's expenses.
    fn list_links(&self, org: OrgUnit) -> StoreResult<Vec<CategoryExpenseLink>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_domain_error() {
        let error: LedgerError = StoreError::NotFound {
            entity: "category",
            id: 4,
        }
        .into();
        assert!(matches!(error, LedgerError::CategoryNotFound { id: 4 }));

        let error: LedgerError = StoreError::NotFound {
            entity: "discount",
            id: 2,
        }
        .into();
        assert!(matches!(
            error,
            LedgerError::CatalogEntryNotFound {
                kind: AdjustmentKind::Discount,
                id: 2
            }
        ));
    }

    #[test]
    fn test_unavailable_maps_to_storage_error() {
        let error: LedgerError = StoreError::Unavailable("disk full".to_string()).into();
        assert!(matches!(error, LedgerError::Storage { .. }));
    }
}
