//! Expense and expense category models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OrgUnit;

/// Whether an expense recurs every month or not.
///
/// Accepts the Portuguese labels used by older clients on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    /// A recurring expense (rent, salaries, utilities).
    #[serde(alias = "Fixed", alias = "Fixa", alias = "fixa")]
    Fixed,
    /// A one-off or irregular expense.
    #[serde(
        alias = "Variable",
        alias = "Variável",
        alias = "Variavel",
        alias = "variável",
        alias = "variavel"
    )]
    Variable,
}

impl ExpenseType {
    /// Every expense type, in reporting order.
    pub const ALL: [ExpenseType; 2] = [ExpenseType::Fixed, ExpenseType::Variable];
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpenseType::Fixed => write!(f, "fixed"),
            ExpenseType::Variable => write!(f, "variable"),
        }
    }
}

impl FromStr for ExpenseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" | "fixa" => Ok(ExpenseType::Fixed),
            "variable" | "variável" | "variavel" => Ok(ExpenseType::Variable),
            other => Err(format!("unknown expense type '{}'", other)),
        }
    }
}

/// A grouping for expenses, such as "Aluguel" or "Água".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    /// Unique identifier for the category.
    pub id: u64,
    /// Owning org unit.
    pub org_unit: OrgUnit,
    /// Display name, unique within the org unit.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Inactive categories are left out of aggregations.
    pub active: bool,
}

impl ExpenseCategory {
    /// The key used for name uniqueness: trimmed and lowercased.
    ///
    /// # Examples
    ///
    /// ```
    /// use church_ledger::models::ExpenseCategory;
    ///
    /// assert_eq!(ExpenseCategory::normalized_name("  Água "), "água");
    /// ```
    pub fn normalized_name(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

/// Fields needed to create a category; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    /// Owning org unit.
    pub org_unit: OrgUnit,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// A single expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier for the expense.
    pub id: u64,
    /// Owning org unit.
    pub org_unit: OrgUnit,
    /// What was paid for.
    pub description: String,
    /// The amount paid, always greater than zero.
    pub amount: Decimal,
    /// The date the expense was incurred.
    pub date: NaiveDate,
    /// Fixed or variable.
    pub expense_type: ExpenseType,
    /// Optional note.
    pub note: Option<String>,
    /// When the expense was recorded.
    pub created_at: DateTime<Utc>,
}

/// Fields needed to record an expense; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// Owning org unit.
    pub org_unit: OrgUnit,
    /// What was paid for.
    pub description: String,
    /// The amount paid.
    pub amount: Decimal,
    /// The date the expense was incurred.
    pub date: NaiveDate,
    /// Fixed or variable.
    pub expense_type: ExpenseType,
    /// Optional note.
    pub note: Option<String>,
}

/// Join record tying one expense to one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryExpenseLink {
    /// The linked expense.
    pub expense_id: u64,
    /// The category it is filed under.
    pub category_id: u64,
}
