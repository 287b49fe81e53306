//! Salary record model.
//!
//! A salary record is the persisted result of a payroll run for one employee
//! in one [`Period`]. The net salary it carries is always produced by
//! [`compute_salary`](crate::calculation::compute_salary); clients never
//! supply it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AppliedAdjustment, OrgUnit, Period};
use crate::calculation::SalaryBreakdown;

/// A computed salary for one employee and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRecord {
    /// Unique identifier for the record.
    pub id: u64,
    /// Owning org unit.
    pub org_unit: OrgUnit,
    /// The employee paid by this record.
    pub employee_id: u64,
    /// The month this record pays.
    pub period: Period,
    /// The employee's base salary at computation time.
    pub base_salary: Decimal,
    /// Subsidies applied, as they were at computation time.
    pub subsidies: Vec<AppliedAdjustment>,
    /// Discounts applied, as they were at computation time.
    pub discounts: Vec<AppliedAdjustment>,
    /// Sum of the applied subsidies.
    pub total_subsidies: Decimal,
    /// Sum of the applied discounts.
    pub total_discounts: Decimal,
    /// `base_salary + total_subsidies - total_discounts`; may be negative.
    pub net_salary: Decimal,
    /// When the record was first computed.
    pub created_at: DateTime<Utc>,
    /// When the record was last recomputed.
    pub updated_at: DateTime<Utc>,
}

impl SalaryRecord {
    /// Ids of the subsidies applied to this record.
    pub fn subsidy_ids(&self) -> Vec<u64> {
        self.subsidies.iter().map(|s| s.id).collect()
    }

    /// Ids of the discounts applied to this record.
    pub fn discount_ids(&self) -> Vec<u64> {
        self.discounts.iter().map(|d| d.id).collect()
    }

    /// Overwrites every computed field from a fresh breakdown.
    pub(crate) fn apply(&mut self, draft: SalaryDraft, now: DateTime<Utc>) {
        self.org_unit = draft.org_unit;
        self.employee_id = draft.employee_id;
        self.period = draft.period;
        self.base_salary = draft.breakdown.base_salary;
        self.subsidies = draft.breakdown.subsidies;
        self.discounts = draft.breakdown.discounts;
        self.total_subsidies = draft.breakdown.total_subsidies;
        self.total_discounts = draft.breakdown.total_discounts;
        self.net_salary = draft.breakdown.net_salary;
        self.updated_at = now;
    }
}

/// Everything the store needs to insert or update a salary record.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryDraft {
    /// Owning org unit.
    pub org_unit: OrgUnit,
    /// The employee being paid.
    pub employee_id: u64,
    /// The month being paid.
    pub period: Period,
    /// The computed amounts.
    pub breakdown: SalaryBreakdown,
}

impl SalaryDraft {
    /// Builds a new record from this draft.
    pub(crate) fn into_record(self, id: u64, now: DateTime<Utc>) -> SalaryRecord {
        SalaryRecord {
            id,
            org_unit: self.org_unit,
            employee_id: self.employee_id,
            period: self.period,
            base_salary: self.breakdown.base_salary,
            subsidies: self.breakdown.subsidies,
            discounts: self.breakdown.discounts,
            total_subsidies: self.breakdown.total_subsidies,
            total_discounts: self.breakdown.total_discounts,
            net_salary: self.breakdown.net_salary,
            created_at: now,
            updated_at: now,
        }
    }
}
