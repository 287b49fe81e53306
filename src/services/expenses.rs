//! Expense aggregation engine and category/expense management.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use super::{optional_text, positive, required_text};
use crate::calculation::{
    CategoryOrdering, CategoryTotal, ExpenseFilter, ExpenseTotals, TypeStatistics,
    aggregate_by_category, summarize_expenses, type_statistics,
};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    DateWindow, Expense, ExpenseCategory, ExpenseType, NewCategory, NewExpense, OrgUnit,
};
use crate::store::{EntityStore, LinkChange, StoreError};

/// An expense together with the category it is filed under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedExpense {
    /// The expense itself.
    #[serde(flatten)]
    pub expense: Expense,
    /// The linked category, if any.
    pub category_id: Option<u64>,
}

/// Fields for creating a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    /// Required, non-blank.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Fields for updating a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    /// Required, non-blank.
    pub name: String,
    /// Replaces the description; `None` clears it.
    pub description: Option<String>,
    /// Changes the active flag only when present.
    pub active: Option<bool>,
}

/// Fields for creating or updating an expense.
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    /// What was paid for.
    pub description: String,
    /// Amount paid, greater than zero.
    pub amount: Decimal,
    /// When the expense happened.
    pub date: NaiveDate,
    /// Fixed or variable.
    pub expense_type: ExpenseType,
    /// Optional note.
    pub note: Option<String>,
}

/// Aggregates expenses and manages categories and expenses.
#[derive(Clone)]
pub struct ExpenseService {
    store: Arc<dyn EntityStore>,
}

impl ExpenseService {
    /// Creates an expense service over the given store.
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Totals the caller's expenses per active category.
    ///
    /// Categories without matching expenses are listed with a zero total.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` if `end` is before `start`.
    pub fn aggregate_by_category(
        &self,
        org: OrgUnit,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        expense_type: Option<ExpenseType>,
        ordering: CategoryOrdering,
    ) -> LedgerResult<Vec<CategoryTotal>> {
        let filter = ExpenseFilter {
            window: DateWindow::new(start, end)?,
            expense_type,
        };
        let categories = self.store.list_categories(org)?;
        let expenses = self.store.list_expenses(org)?;
        let links = self.store.list_links(org)?;

        aggregate_by_category(&categories, &expenses, &links, &filter, ordering)
    }

    /// Overall, per-type and per-category totals of the caller's expenses.
    pub fn totals(&self, org: OrgUnit) -> LedgerResult<ExpenseTotals> {
        let categories = self.store.list_categories(org)?;
        let expenses = self.store.list_expenses(org)?;
        let links = self.store.list_links(org)?;
        summarize_expenses(&expenses, &links, &categories)
    }

    /// Count, total, average and largest amount per expense type.
    pub fn type_statistics(&self, org: OrgUnit) -> LedgerResult<Vec<TypeStatistics>> {
        let expenses = self.store.list_expenses(org)?;
        type_statistics(&expenses)
    }

    /// Lists the caller's categories ordered by name.
    pub fn list_categories(&self, org: OrgUnit) -> LedgerResult<Vec<ExpenseCategory>> {
        let mut categories = self.store.list_categories(org)?;
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// - `InvalidField` if the name is blank
    /// - `DuplicateCategory` if the org unit already has a category with that name
    pub fn create_category(&self, org: OrgUnit, input: CategoryInput) -> LedgerResult<ExpenseCategory> {
        let name = required_text("name", &input.name)?;
        if self.store.find_category_by_name(org, &name)?.is_some() {
            return Err(LedgerError::DuplicateCategory { name });
        }

        let category = self
            .store
            .insert_category(NewCategory {
                org_unit: org,
                name: name.clone(),
                description: optional_text(input.description),
            })
            .map_err(|err| duplicate_name(err, &name))?;

        info!(org_unit = %org, category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Updates a category's name, description and optionally its active flag.
    pub fn update_category(
        &self,
        org: OrgUnit,
        id: u64,
        update: CategoryUpdate,
    ) -> LedgerResult<ExpenseCategory> {
        let name = required_text("name", &update.name)?;
        let mut category = self
            .store
            .fetch_category(org, id)?
            .ok_or(LedgerError::CategoryNotFound { id })?;

        if let Some(other) = self.store.find_category_by_name(org, &name)? {
            if other.id != id {
                return Err(LedgerError::DuplicateCategory { name });
            }
        }

        category.name = name.clone();
        category.description = optional_text(update.description);
        if let Some(active) = update.active {
            category.active = active;
        }

        let category = self
            .store
            .update_category(category)
            .map_err(|err| duplicate_name(err, &name))?;
        info!(org_unit = %org, category_id = id, "Category updated");
        Ok(category)
    }

    /// Deletes a category and its expense links; the expenses remain.
    ///
    /// Returns the number of expenses that were left uncategorised.
    pub fn delete_category(&self, org: OrgUnit, id: u64) -> LedgerResult<usize> {
        let unlinked = self.store.delete_category(org, id)?;
        info!(org_unit = %org, category_id = id, unlinked, "Category deleted");
        Ok(unlinked)
    }

    /// Lists the expenses of one category, most recent date first.
    pub fn category_expenses(&self, org: OrgUnit, category_id: u64) -> LedgerResult<Vec<LinkedExpense>> {
        self.store
            .fetch_category(org, category_id)?
            .ok_or(LedgerError::CategoryNotFound { id: category_id })?;

        let mut expenses: Vec<LinkedExpense> = self
            .list_expenses(org)?
            .into_iter()
            .filter(|linked| linked.category_id == Some(category_id))
            .collect();
        expenses.sort_by(|a, b| b.expense.date.cmp(&a.expense.date).then(b.expense.id.cmp(&a.expense.id)));
        Ok(expenses)
    }

    /// Lists the caller's expenses, most recently recorded first.
    pub fn list_expenses(&self, org: OrgUnit) -> LedgerResult<Vec<LinkedExpense>> {
        let category_of: HashMap<u64, u64> = self
            .store
            .list_links(org)?
            .into_iter()
            .map(|link| (link.expense_id, link.category_id))
            .collect();
        Ok(self
            .store
            .list_expenses(org)?
            .into_iter()
            .map(|expense| {
                let category_id = category_of.get(&expense.id).copied();
                LinkedExpense {
                    expense,
                    category_id,
                }
            })
            .collect())
    }

    /// Records an expense, optionally filed under a category.
    ///
    /// # Errors
    ///
    /// - `InvalidField` for a blank description or a non-positive amount
    /// - `CategoryNotFound` if the category is not in the caller's org unit
    pub fn create_expense(
        &self,
        org: OrgUnit,
        input: ExpenseInput,
        category_id: Option<u64>,
    ) -> LedgerResult<LinkedExpense> {
        let description = required_text("description", &input.description)?;
        let amount = positive("amount", input.amount)?;

        let expense = self.store.insert_expense(
            NewExpense {
                org_unit: org,
                description,
                amount,
                date: input.date,
                expense_type: input.expense_type,
                note: optional_text(input.note),
            },
            category_id,
        )?;

        info!(
            org_unit = %org,
            expense_id = expense.id,
            amount = %expense.amount,
            category_id = ?category_id,
            "Expense recorded"
        );
        Ok(LinkedExpense {
            expense,
            category_id,
        })
    }

    /// Replaces an expense's fields and applies the category link change.
    pub fn update_expense(
        &self,
        org: OrgUnit,
        id: u64,
        input: ExpenseInput,
        link: LinkChange,
    ) -> LedgerResult<LinkedExpense> {
        let description = required_text("description", &input.description)?;
        let amount = positive("amount", input.amount)?;
        let mut expense = self
            .store
            .fetch_expense(org, id)?
            .ok_or(LedgerError::ExpenseNotFound { id })?;

        expense.description = description;
        expense.amount = amount;
        expense.date = input.date;
        expense.expense_type = input.expense_type;
        expense.note = optional_text(input.note);

        let (expense, category_id) = self.store.update_expense(expense, link)?;

        info!(org_unit = %org, expense_id = id, "Expense updated");
        Ok(LinkedExpense {
            expense,
            category_id,
        })
    }

    /// Deletes an expense and its category link.
    pub fn delete_expense(&self, org: OrgUnit, id: u64) -> LedgerResult<()> {
        self.store.delete_expense(org, id)?;
        info!(org_unit = %org, expense_id = id, "Expense deleted");
        Ok(())
    }
}

fn duplicate_name(err: StoreError, name: &str) -> LedgerError {
    match err {
        StoreError::Conflict { .. } => LedgerError::DuplicateCategory {
            name: name.to_string(),
        },
        other => other.into(),
    }
}
