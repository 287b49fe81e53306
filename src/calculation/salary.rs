//! Net salary computation.
//!
//! This module derives a salary breakdown from a base salary and a selection
//! of subsidy and discount catalog entries. It performs no I/O: callers pass
//! the catalogs in and persist the result themselves.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{add_amount, sum_amounts};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{AdjustmentKind, AppliedAdjustment, CatalogEntry};

/// The subsidies and discounts chosen for one payroll run.
///
/// Ids are held as sets, so selecting the same entry twice applies it once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentSelection {
    /// Selected subsidy ids.
    pub subsidy_ids: BTreeSet<u64>,
    /// Selected discount ids.
    pub discount_ids: BTreeSet<u64>,
}

impl AdjustmentSelection {
    /// Creates a selection from any iterables of ids.
    pub fn new(
        subsidy_ids: impl IntoIterator<Item = u64>,
        discount_ids: impl IntoIterator<Item = u64>,
    ) -> Self {
        Self {
            subsidy_ids: subsidy_ids.into_iter().collect(),
            discount_ids: discount_ids.into_iter().collect(),
        }
    }
}

/// The result of a salary computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryBreakdown {
    /// The base salary the computation started from.
    pub base_salary: Decimal,
    /// Subsidies that were found and applied.
    pub subsidies: Vec<AppliedAdjustment>,
    /// Discounts that were found and applied.
    pub discounts: Vec<AppliedAdjustment>,
    /// Sum of applied subsidy amounts.
    pub total_subsidies: Decimal,
    /// Sum of applied discount amounts.
    pub total_discounts: Decimal,
    /// `base_salary + total_subsidies - total_discounts`.
    pub net_salary: Decimal,
    /// Selected subsidy ids with no active catalog entry.
    pub ignored_subsidy_ids: Vec<u64>,
    /// Selected discount ids with no active catalog entry.
    pub ignored_discount_ids: Vec<u64>,
}

/// Computes the net salary: base plus subsidies minus discounts.
///
/// No floor is applied; a result below zero is returned as is.
///
/// # Errors
///
/// `AmountOverflow` if the result does not fit in a decimal.
///
/// # Examples
///
/// ```
/// use church_ledger::calculation::net_salary;
/// use rust_decimal::Decimal;
///
/// let net = net_salary(Decimal::from(1000), Decimal::from(50), Decimal::from(1200)).unwrap();
/// assert_eq!(net, Decimal::from(-150));
///
/// assert!(net_salary(Decimal::MAX, Decimal::ONE, Decimal::ZERO).is_err());
/// ```
pub fn net_salary(
    base_salary: Decimal,
    total_subsidies: Decimal,
    total_discounts: Decimal,
) -> LedgerResult<Decimal> {
    add_amount(base_salary, total_subsidies, NET_SALARY)?
        .checked_sub(total_discounts)
        .ok_or_else(|| LedgerError::AmountOverflow {
            operation: NET_SALARY.to_string(),
        })
}

const NET_SALARY: &str = "net salary";

/// Computes a salary breakdown from a base salary and a selection.
///
/// Each selected id is looked up among the active entries of the matching
/// catalog. Ids that are unknown, inactive, or belong to the other catalog
/// are skipped and reported in the `ignored_*` fields; they never cause an
/// error.
///
/// # Errors
///
/// `AmountOverflow` if a total does not fit in a decimal.
///
/// # Arguments
///
/// * `base_salary` - The employee's monthly base salary
/// * `selection` - The chosen subsidy and discount ids
/// * `subsidies` - The subsidy catalog visible to the caller
/// * `discounts` - The discount catalog visible to the caller
///
/// # Examples
///
/// ```
/// use church_ledger::calculation::{compute_salary, AdjustmentSelection};
/// use church_ledger::models::{AdjustmentKind, CatalogEntry, OrgUnit};
/// use rust_decimal::Decimal;
///
/// let entry = |id, kind, amount| CatalogEntry {
///     id,
///     org_unit: OrgUnit::Headquarters(1),
///     kind,
///     name: format!("entry {}", id),
///     amount: Decimal::from(amount),
///     active: true,
/// };
/// let subsidies = vec![
///     entry(1, AdjustmentKind::Subsidy, 10_000),
///     entry(2, AdjustmentKind::Subsidy, 5_000),
/// ];
/// let discounts = vec![entry(1, AdjustmentKind::Discount, 3_000)];
///
/// let selection = AdjustmentSelection::new([1, 2], [1]);
/// let breakdown =
///     compute_salary(Decimal::from(100_000), &selection, &subsidies, &discounts).unwrap();
///
/// assert_eq!(breakdown.total_subsidies, Decimal::from(15_000));
/// assert_eq!(breakdown.total_discounts, Decimal::from(3_000));
/// assert_eq!(breakdown.net_salary, Decimal::from(112_000));
/// ```
pub fn compute_salary(
    base_salary: Decimal,
    selection: &AdjustmentSelection,
    subsidies: &[CatalogEntry],
    discounts: &[CatalogEntry],
) -> LedgerResult<SalaryBreakdown> {
    let (applied_subsidies, ignored_subsidy_ids) =
        resolve_selection(&selection.subsidy_ids, subsidies, AdjustmentKind::Subsidy);
    let (applied_discounts, ignored_discount_ids) =
        resolve_selection(&selection.discount_ids, discounts, AdjustmentKind::Discount);

    let total_subsidies = sum_amounts(applied_subsidies.iter().map(|a| a.amount), "subsidy total")?;
    let total_discounts = sum_amounts(applied_discounts.iter().map(|a| a.amount), "discount total")?;
    let net_salary = net_salary(base_salary, total_subsidies, total_discounts)?;

    Ok(SalaryBreakdown {
        base_salary,
        subsidies: applied_subsidies,
        discounts: applied_discounts,
        total_subsidies,
        total_discounts,
        net_salary,
        ignored_subsidy_ids,
        ignored_discount_ids,
    })
}

/// Splits selected ids into applied snapshots and ignored ids.
fn resolve_selection(
    selected: &BTreeSet<u64>,
    catalog: &[CatalogEntry],
    kind: AdjustmentKind,
) -> (Vec<AppliedAdjustment>, Vec<u64>) {
    let mut applied = Vec::with_capacity(selected.len());
    let mut ignored = Vec::new();

    for id in selected {
        match catalog
            .iter()
            .find(|entry| entry.id == *id && entry.kind == kind && entry.active)
        {
            Some(entry) => applied.push(entry.applied()),
            None => ignored.push(*id),
        }
    }

    (applied, ignored)
}
