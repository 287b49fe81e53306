//! Employee and subsidy/discount catalog management.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use super::{non_negative, required_text};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{AdjustmentKind, CatalogEntry, Employee, NewCatalogEntry, NewEmployee, OrgUnit};
use crate::store::EntityStore;

/// Fields for creating or updating an employee.
#[derive(Debug, Clone)]
pub struct EmployeeInput {
    /// Optional reference to a church member.
    pub member_ref: Option<u64>,
    /// Monthly base salary, never negative.
    pub base_salary: Decimal,
    /// Defaults to active on create; left unchanged on update when absent.
    pub active: Option<bool>,
}

/// Fields for creating or updating a subsidy or discount.
#[derive(Debug, Clone)]
pub struct CatalogInput {
    /// Display name, required.
    pub name: String,
    /// Fixed amount, never negative.
    pub amount: Decimal,
    /// Defaults to active on create; left unchanged on update when absent.
    pub active: Option<bool>,
}

/// Maintains employees and the subsidy and discount catalogs.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn EntityStore>,
}

impl CatalogService {
    /// Creates a catalog service over the given store.
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Registers an employee in the caller's org unit.
    pub fn create_employee(&self, org: OrgUnit, input: EmployeeInput) -> LedgerResult<Employee> {
        let base_salary = non_negative("base_salary", input.base_salary)?;
        let employee = self.store.insert_employee(NewEmployee {
            org_unit: org,
            member_ref: input.member_ref,
            base_salary,
            active: input.active.unwrap_or(true),
        })?;
        info!(org_unit = %org, employee_id = employee.id, "Employee registered");
        Ok(employee)
    }

    /// Updates an employee. Existing salary records keep their snapshot.
    pub fn update_employee(
        &self,
        org: OrgUnit,
        id: u64,
        input: EmployeeInput,
    ) -> LedgerResult<Employee> {
        let base_salary = non_negative("base_salary", input.base_salary)?;
        let mut employee = self.employee(org, id)?;
        employee.member_ref = input.member_ref;
        employee.base_salary = base_salary;
        if let Some(active) = input.active {
            employee.active = active;
        }
        let employee = self.store.update_employee(employee)?;
        info!(org_unit = %org, employee_id = id, active = employee.active, "Employee updated");
        Ok(employee)
    }

    /// Fetches one employee.
    pub fn employee(&self, org: OrgUnit, id: u64) -> LedgerResult<Employee> {
        self.store
            .fetch_employee(org, id)?
            .ok_or(LedgerError::EmployeeNotFound { id })
    }

    /// Lists the caller's employees by id.
    pub fn list_employees(&self, org: OrgUnit) -> LedgerResult<Vec<Employee>> {
        Ok(self.store.list_employees(org)?)
    }

    /// Adds a subsidy or discount to the caller's catalog.
    pub fn create_entry(
        &self,
        org: OrgUnit,
        kind: AdjustmentKind,
        input: CatalogInput,
    ) -> LedgerResult<CatalogEntry> {
        let name = required_text("name", &input.name)?;
        let amount = non_negative("amount", input.amount)?;
        let entry = self.store.insert_catalog_entry(NewCatalogEntry {
            org_unit: org,
            kind,
            name,
            amount,
            active: input.active.unwrap_or(true),
        })?;
        info!(org_unit = %org, kind = %kind, entry_id = entry.id, amount = %entry.amount, "Catalog entry created");
        Ok(entry)
    }

    /// Updates a catalog entry. Salary records already computed keep the old amount.
    pub fn update_entry(
        &self,
        org: OrgUnit,
        kind: AdjustmentKind,
        id: u64,
        input: CatalogInput,
    ) -> LedgerResult<CatalogEntry> {
        let name = required_text("name", &input.name)?;
        let amount = non_negative("amount", input.amount)?;
        let mut entry = self
            .store
            .fetch_catalog_entry(org, kind, id)?
            .ok_or(LedgerError::CatalogEntryNotFound { kind, id })?;
        entry.name = name;
        entry.amount = amount;
        if let Some(active) = input.active {
            entry.active = active;
        }
        let entry = self.store.update_catalog_entry(entry)?;
        info!(org_unit = %org, kind = %kind, entry_id = id, "Catalog entry updated");
        Ok(entry)
    }

    /// Removes a catalog entry.
    pub fn delete_entry(&self, org: OrgUnit, kind: AdjustmentKind, id: u64) -> LedgerResult<()> {
        self.store.delete_catalog_entry(org, kind, id)?;
        info!(org_unit = %org, kind = %kind, entry_id = id, "Catalog entry deleted");
        Ok(())
    }

    /// Lists one catalog of the caller's org unit.
    pub fn list_entries(&self, org: OrgUnit, kind: AdjustmentKind) -> LedgerResult<Vec<CatalogEntry>> {
        Ok(self.store.list_catalog(org, kind)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    const HQ: OrgUnit = OrgUnit::Headquarters(1);
    const BRANCH: OrgUnit = OrgUnit::Branch(2);

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(InMemoryStore::new()))
    }

    fn employee_input(base: i64) -> EmployeeInput {
        EmployeeInput {
            member_ref: Some(12),
            base_salary: Decimal::from(base),
            active: None,
        }
    }

    fn entry_input(name: &str, amount: i64) -> CatalogInput {
        CatalogInput {
            name: name.to_string(),
            amount: Decimal::from(amount),
            active: None,
        }
    }

    #[test]
    fn test_employee_defaults_to_active() {
        let employee = service().create_employee(HQ, employee_input(1000)).unwrap();
        assert!(employee.active);
        assert_eq!(employee.member_ref, Some(12));
    }

    #[test]
    fn test_negative_base_salary_is_rejected() {
        let err = service().create_employee(HQ, employee_input(-1)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidField { ref field, .. } if field == "base_salary"));
    }

    #[test]
    fn test_update_employee_keeps_flag_when_absent() {
        let service = service();
        let mut input = employee_input(1000);
        input.active = Some(false);
        let employee = service.create_employee(HQ, input).unwrap();

        let updated = service
            .update_employee(HQ, employee.id, employee_input(2000))
            .unwrap();
        assert!(!updated.active);
        assert_eq!(updated.base_salary, Decimal::from(2000));
    }

    #[test]
    fn test_employee_of_other_org_is_not_found() {
        let service = service();
        let employee = service.create_employee(HQ, employee_input(1000)).unwrap();

        let err = service.employee(BRANCH, employee.id).unwrap_err();
        assert!(matches!(err, LedgerError::EmployeeNotFound { .. }));
        assert!(service.list_employees(BRANCH).unwrap().is_empty());
    }

    #[test]
    fn test_catalog_entries_are_kept_per_kind() {
        let service = service();
        service
            .create_entry(HQ, AdjustmentKind::Subsidy, entry_input("Transporte", 100))
            .unwrap();
        service
            .create_entry(HQ, AdjustmentKind::Discount, entry_input("INSS", 50))
            .unwrap();

        let subsidies = service.list_entries(HQ, AdjustmentKind::Subsidy).unwrap();
        assert_eq!(subsidies.len(), 1);
        assert_eq!(subsidies[0].name, "Transporte");
    }

    #[test]
    fn test_catalog_entry_validation() {
        let service = service();
        let err = service
            .create_entry(HQ, AdjustmentKind::Subsidy, entry_input("Bónus", -5))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidField { ref field, .. } if field == "amount"));

        let err = service
            .create_entry(HQ, AdjustmentKind::Subsidy, entry_input("  ", 10))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidField { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_update_and_delete_entry() {
        let service = service();
        let entry = service
            .create_entry(HQ, AdjustmentKind::Discount, entry_input("INSS", 50))
            .unwrap();

        let mut input = entry_input("INSS 2025", 60);
        input.active = Some(false);
        let updated = service
            .update_entry(HQ, AdjustmentKind::Discount, entry.id, input)
            .unwrap();
        assert_eq!(updated.amount, Decimal::from(60));
        assert!(!updated.active);

        service
            .delete_entry(HQ, AdjustmentKind::Discount, entry.id)
            .unwrap();
        let err = service
            .delete_entry(HQ, AdjustmentKind::Discount, entry.id)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::CatalogEntryNotFound {
                kind: AdjustmentKind::Discount,
                ..
            }
        ));
    }

    #[test]
    fn test_update_entry_under_wrong_kind() {
        let service = service();
        let entry = service
            .create_entry(HQ, AdjustmentKind::Subsidy, entry_input("Transporte", 100))
            .unwrap();

        let err = service
            .update_entry(HQ, AdjustmentKind::Discount, entry.id, entry_input("x", 1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::CatalogEntryNotFound { .. }));
    }
}
