//! Overall expense totals and per-type statistics.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{add_amount, sum_amounts};
use crate::error::LedgerResult;
use crate::models::{CategoryExpenseLink, Expense, ExpenseCategory, ExpenseType};

/// Number of decimal places kept in computed averages.
pub const AVERAGE_DECIMAL_PLACES: u32 = 2;

/// Total spent on one expense type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTotal {
    /// The expense type.
    pub expense_type: ExpenseType,
    /// Sum of amounts of that type.
    pub total: Decimal,
}

/// Total spent under one category, or on uncategorised expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    /// The category id; `None` for expenses without a category.
    pub category_id: Option<u64>,
    /// The category name, when the category is known.
    pub name: Option<String>,
    /// Sum of amounts in the bucket.
    pub total: Decimal,
}

/// Overall, per-type and per-category totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseTotals {
    /// Sum of every expense.
    pub overall: Decimal,
    /// One row per expense type, always both types.
    pub by_type: Vec<TypeTotal>,
    /// One row per category that has expenses, uncategorised last.
    pub by_category: Vec<CategoryBucket>,
}

/// Count, sum, mean and maximum of the expenses of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStatistics {
    /// The expense type.
    pub expense_type: ExpenseType,
    /// Number of expenses.
    pub count: u64,
    /// Sum of amounts.
    pub total: Decimal,
    /// Mean amount, rounded to two decimal places; zero when empty.
    pub average: Decimal,
    /// Largest single amount; zero when empty.
    pub largest: Decimal,
}

/// Summarises expenses into overall, per-type and per-category totals.
///
/// Expenses with no link land in a bucket with `category_id: None`.
///
/// # Errors
///
/// `AmountOverflow` if any total does not fit in a decimal.
pub fn summarize_expenses(
    expenses: &[Expense],
    links: &[CategoryExpenseLink],
    categories: &[ExpenseCategory],
) -> LedgerResult<ExpenseTotals> {
    let category_of: HashMap<u64, u64> = links
        .iter()
        .map(|link| (link.expense_id, link.category_id))
        .collect();
    let names: HashMap<u64, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let overall = sum_amounts(expenses.iter().map(|e| e.amount), "overall total")?;

    let by_type = ExpenseType::ALL
        .iter()
        .map(|expense_type| {
            let total = sum_amounts(
                expenses
                    .iter()
                    .filter(|e| e.expense_type == *expense_type)
                    .map(|e| e.amount),
                "type total",
            )?;
            Ok(TypeTotal {
                expense_type: *expense_type,
                total,
            })
        })
        .collect::<LedgerResult<Vec<_>>>()?;

    let mut categorised: BTreeMap<u64, Decimal> = BTreeMap::new();
    let mut uncategorised: Option<Decimal> = None;
    for expense in expenses {
        match category_of.get(&expense.id) {
            Some(category_id) => {
                let total = categorised.entry(*category_id).or_default();
                *total = add_amount(*total, expense.amount, "category total")?;
            }
            None => {
                let total = uncategorised.unwrap_or(Decimal::ZERO);
                uncategorised = Some(add_amount(total, expense.amount, "uncategorised total")?);
            }
        }
    }

    let mut by_category: Vec<CategoryBucket> = categorised
        .into_iter()
        .map(|(category_id, total)| CategoryBucket {
            category_id: Some(category_id),
            name: names.get(&category_id).map(|name| name.to_string()),
            total,
        })
        .collect();
    by_category.sort_by(|a, b| a.name.cmp(&b.name).then(a.category_id.cmp(&b.category_id)));
    if let Some(total) = uncategorised {
        by_category.push(CategoryBucket {
            category_id: None,
            name: None,
            total,
        });
    }

    Ok(ExpenseTotals {
        overall,
        by_type,
        by_category,
    })
}

/// Computes count, total, average and largest amount for each expense type.
///
/// # Errors
///
/// `AmountOverflow` if a type total does not fit in a decimal.
///
/// # Examples
///
/// ```
/// use church_ledger::calculation::type_statistics;
/// use church_ledger::models::ExpenseType;
///
/// let stats = type_statistics(&[]).unwrap();
/// assert_eq!(stats.len(), 2);
/// assert_eq!(stats[0].expense_type, ExpenseType::Fixed);
/// assert_eq!(stats[0].count, 0);
/// ```
pub fn type_statistics(expenses: &[Expense]) -> LedgerResult<Vec<TypeStatistics>> {
    ExpenseType::ALL
        .iter()
        .map(|expense_type| {
            let amounts: Vec<Decimal> = expenses
                .iter()
                .filter(|e| e.expense_type == *expense_type)
                .map(|e| e.amount)
                .collect();
            let count = amounts.len() as u64;
            let total = sum_amounts(amounts.iter().copied(), "type total")?;
            let average = if count == 0 {
                Decimal::ZERO
            } else {
                (total / Decimal::from(count)).round_dp(AVERAGE_DECIMAL_PLACES)
            };
            let largest = amounts.iter().copied().max().unwrap_or(Decimal::ZERO);

            Ok(TypeStatistics {
                expense_type: *expense_type,
                count,
                total,
                average,
                largest,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrgUnit;
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn expense(id: u64, amount: &str, expense_type: ExpenseType) -> Expense {
        Expense {
            id,
            org_unit: OrgUnit::Branch(3),
            description: format!("expense {}", id),
            amount: dec(amount),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            expense_type,
            note: None,
            created_at: Utc::now(),
        }
    }

    fn category(id: u64, name: &str) -> ExpenseCategory {
        ExpenseCategory {
            id,
            org_unit: OrgUnit::Branch(3),
            name: name.to_string(),
            description: None,
            active: true,
        }
    }

    #[test]
    fn test_summary_splits_by_type_and_category() {
        let expenses = vec![
            expense(1, "100", ExpenseType::Fixed),
            expense(2, "50", ExpenseType::Variable),
            expense(3, "25", ExpenseType::Variable),
        ];
        let links = vec![
            CategoryExpenseLink { expense_id: 1, category_id: 10 },
            CategoryExpenseLink { expense_id: 2, category_id: 10 },
        ];
        let categories = vec![category(10, "Aluguel")];

        let totals = summarize_expenses(&expenses, &links, &categories).unwrap();

        assert_eq!(totals.overall, dec("175"));
        assert_eq!(totals.by_type[0].total, dec("100"));
        assert_eq!(totals.by_type[1].total, dec("75"));
        assert_eq!(totals.by_category.len(), 2);
        assert_eq!(totals.by_category[0].name.as_deref(), Some("Aluguel"));
        assert_eq!(totals.by_category[0].total, dec("150"));
        assert_eq!(totals.by_category[1].category_id, None);
        assert_eq!(totals.by_category[1].total, dec("25"));
    }

    #[test]
    fn test_summary_of_nothing() {
        let totals = summarize_expenses(&[], &[], &[]).unwrap();
        assert_eq!(totals.overall, Decimal::ZERO);
        assert_eq!(totals.by_type.len(), 2);
        assert!(totals.by_category.is_empty());
    }

    #[test]
    fn test_type_statistics() {
        let expenses = vec![
            expense(1, "10", ExpenseType::Variable),
            expense(2, "20", ExpenseType::Variable),
            expense(3, "5", ExpenseType::Variable),
        ];

        let stats = type_statistics(&expenses).unwrap();
        let variable = &stats[1];

        assert_eq!(variable.count, 3);
        assert_eq!(variable.total, dec("35"));
        assert_eq!(variable.average, dec("11.67"));
        assert_eq!(variable.largest, dec("20"));
        assert_eq!(stats[0].count, 0);
        assert_eq!(stats[0].average, Decimal::ZERO);
    }

    fn huge(id: u64, expense_type: ExpenseType) -> Expense {
        Expense {
            amount: Decimal::MAX,
            ..expense(id, "0", expense_type)
        }
    }

    #[test]
    fn test_summary_overflow_is_an_error() {
        let expenses = vec![huge(1, ExpenseType::Fixed), huge(2, ExpenseType::Variable)];

        let err = summarize_expenses(&expenses, &[], &[]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::LedgerError::AmountOverflow { ref operation } if operation == "overall total"
        ));
    }

    #[test]
    fn test_type_statistics_overflow_is_an_error() {
        let expenses = vec![huge(1, ExpenseType::Variable), huge(2, ExpenseType::Variable)];

        let err = type_statistics(&expenses).unwrap_err();
        assert!(matches!(
            err,
            crate::error::LedgerError::AmountOverflow { ref operation } if operation == "type total"
        ));
    }

    #[test]
    fn test_one_huge_expense_per_type_still_summarises_per_type() {
        let expenses = vec![huge(1, ExpenseType::Fixed), huge(2, ExpenseType::Variable)];

        let stats = type_statistics(&expenses).unwrap();
        assert_eq!(stats[0].total, Decimal::MAX);
        assert_eq!(stats[1].largest, Decimal::MAX);
    }
}
