//! Employee model.
//!
//! Employees are the payroll subjects of an org unit. Each carries the base
//! salary that salary records start from.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OrgUnit;

/// Represents a salaried employee of an org unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: u64,
    /// The headquarters or branch that employs this person.
    pub org_unit: OrgUnit,
    /// Soft reference to the member record of this person, if any.
    pub member_ref: Option<u64>,
    /// The monthly base salary, never negative.
    pub base_salary: Decimal,
    /// Whether payroll may still be run for this employee.
    pub active: bool,
}

impl Employee {
    /// Returns true if salary records may be computed for this employee.
    ///
    /// # Examples
    ///
    /// ```
    /// use church_ledger::models::{Employee, OrgUnit};
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: 1,
    ///     org_unit: OrgUnit::Headquarters(1),
    ///     member_ref: None,
    ///     base_salary: Decimal::from(100_000),
    ///     active: false,
    /// };
    /// assert!(!employee.is_payable());
    /// ```
    pub fn is_payable(&self) -> bool {
        self.active
    }
}

/// Fields needed to hire an employee; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    /// Owning org unit.
    pub org_unit: OrgUnit,
    /// Soft reference to the member record.
    pub member_ref: Option<u64>,
    /// The monthly base salary.
    pub base_salary: Decimal,
    /// Initial active flag.
    pub active: bool,
}
