//! Category-based expense aggregation.
//!
//! Groups expenses under their linked category and sums them, keeping every
//! active category in the output even when nothing matches (left outer join
//! semantics). Pure function over already-scoped data.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::add_amount;
use crate::error::LedgerResult;
use crate::models::{CategoryExpenseLink, DateWindow, Expense, ExpenseCategory, ExpenseType};

/// Restricts which expenses are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    /// Inclusive date window.
    pub window: DateWindow,
    /// Only count expenses of this type, if set.
    pub expense_type: Option<ExpenseType>,
}

impl ExpenseFilter {
    /// Returns true if the expense passes the window and type filters.
    pub fn matches(&self, expense: &Expense) -> bool {
        self.window.contains(expense.date)
            && self.expense_type.is_none_or(|t| t == expense.expense_type)
    }
}

/// How aggregated categories are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOrdering {
    /// Largest total first, ties broken by name. Used by reports.
    #[default]
    TotalDescending,
    /// Alphabetical by name, ties broken by id. Used by listings.
    NameAscending,
}

/// One row of the per-category aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The category id.
    pub category_id: u64,
    /// The category name.
    pub name: String,
    /// The category description.
    pub description: Option<String>,
    /// Sum of matching expense amounts; zero when none match.
    pub total: Decimal,
    /// Number of matching expenses.
    pub count: u64,
}

/// Aggregates expenses by category.
///
/// `categories`, `expenses` and `links` are expected to be scoped to a single
/// org unit already. Inactive categories are skipped; links pointing at
/// unknown expenses or categories are ignored.
///
/// # Errors
///
/// `AmountOverflow` if a category total does not fit in a decimal.
///
/// # Examples
///
/// ```
/// use church_ledger::calculation::{aggregate_by_category, CategoryOrdering, ExpenseFilter};
/// use church_ledger::models::{ExpenseCategory, OrgUnit};
///
/// let empty = ExpenseCategory {
///     id: 1,
///     org_unit: OrgUnit::Headquarters(1),
///     name: "Água".to_string(),
///     description: None,
///     active: true,
/// };
///
/// let rows = aggregate_by_category(
///     &[empty],
///     &[],
///     &[],
///     &ExpenseFilter::default(),
///     CategoryOrdering::NameAscending,
/// )
/// .unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].count, 0);
/// assert!(rows[0].total.is_zero());
/// ```
pub fn aggregate_by_category(
    categories: &[ExpenseCategory],
    expenses: &[Expense],
    links: &[CategoryExpenseLink],
    filter: &ExpenseFilter,
    ordering: CategoryOrdering,
) -> LedgerResult<Vec<CategoryTotal>> {
    let expenses_by_id: HashMap<u64, &Expense> = expenses.iter().map(|e| (e.id, e)).collect();

    let mut sums: HashMap<u64, (Decimal, u64)> = HashMap::new();
    for link in links {
        let Some(expense) = expenses_by_id.get(&link.expense_id) else {
            continue;
        };
        if !filter.matches(expense) {
            continue;
        }
        let entry = sums.entry(link.category_id).or_insert((Decimal::ZERO, 0));
        entry.0 = add_amount(entry.0, expense.amount, "category total")?;
        entry.1 += 1;
    }

    let mut rows: Vec<CategoryTotal> = categories
        .iter()
        .filter(|category| category.active)
        .map(|category| {
            let (total, count) = sums
                .get(&category.id)
                .copied()
                .unwrap_or((Decimal::ZERO, 0));
            CategoryTotal {
                category_id: category.id,
                name: category.name.clone(),
                description: category.description.clone(),
                total,
                count,
            }
        })
        .collect();

    match ordering {
        CategoryOrdering::TotalDescending => rows.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.category_id.cmp(&b.category_id))
        }),
        CategoryOrdering::NameAscending => rows.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.category_id.cmp(&b.category_id))
        }),
    }

    Ok(rows)
}
