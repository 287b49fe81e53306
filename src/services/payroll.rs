//! Salary computation engine.
//!
//! Computes and persists one salary record per employee per period, and
//! recomputes records when their selection changes.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::calculation::{AdjustmentSelection, SalaryBreakdown, compute_salary};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    AdjustmentKind, CatalogEntry, Employee, OrgUnit, Period, SalaryDraft, SalaryRecord,
    ensure_ordered,
};
use crate::store::{EntityStore, SalaryQuery, StoreError};

/// Result of a payroll run.
#[derive(Debug, Clone, Serialize)]
pub struct SalaryOutcome {
    /// The stored record.
    pub record: SalaryRecord,
    /// `true` if a new record was created, `false` if an existing one was updated.
    pub created: bool,
    /// Selected subsidy ids that were not applied.
    pub ignored_subsidy_ids: Vec<u64>,
    /// Selected discount ids that were not applied.
    pub ignored_discount_ids: Vec<u64>,
}

/// Changes requested when editing a salary record.
#[derive(Debug, Clone, Default)]
pub struct SalaryUpdate {
    /// Move the record to another employee.
    pub employee_id: Option<u64>,
    /// Move the record to another period.
    pub period: Option<Period>,
    /// Replaces the selected subsidies; `None` keeps the record's current ones.
    pub subsidy_ids: Option<Vec<u64>>,
    /// Replaces the selected discounts; `None` keeps the record's current ones.
    pub discount_ids: Option<Vec<u64>>,
}

/// A salary record together with what can be selected when editing it.
#[derive(Debug, Clone, Serialize)]
pub struct SalaryDetail {
    /// The stored record.
    pub record: SalaryRecord,
    /// Subsidy ids applied to the record.
    pub selected_subsidy_ids: Vec<u64>,
    /// Discount ids applied to the record.
    pub selected_discount_ids: Vec<u64>,
    /// Active subsidies of the org unit.
    pub available_subsidies: Vec<CatalogEntry>,
    /// Active discounts of the org unit.
    pub available_discounts: Vec<CatalogEntry>,
}

/// Computes, stores and maintains salary records.
#[derive(Clone)]
pub struct PayrollService {
    store: Arc<dyn EntityStore>,
}

impl PayrollService {
    /// Creates a payroll service over the given store.
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Computes the salary of an employee for a period and stores it.
    ///
    /// Running the same (employee, period) twice updates the existing record
    /// in place. Unknown or inactive subsidy/discount ids are skipped.
    ///
    /// # Errors
    ///
    /// - `EmployeeNotFound` if the employee is not in the caller's org unit
    /// - `EmployeeInactive` if the employee is no longer active
    pub fn compute_and_store(
        &self,
        org: OrgUnit,
        employee_id: u64,
        period: Period,
        selection: &AdjustmentSelection,
    ) -> LedgerResult<SalaryOutcome> {
        let employee = self.employee(org, employee_id)?;
        if !employee.is_payable() {
            return Err(LedgerError::EmployeeInactive { id: employee_id });
        }

        let breakdown = self.breakdown(org, &employee, selection)?;
        let ignored_subsidy_ids = breakdown.ignored_subsidy_ids.clone();
        let ignored_discount_ids = breakdown.ignored_discount_ids.clone();

        let (record, created) = self.store.upsert_salary_record(SalaryDraft {
            org_unit: org,
            employee_id,
            period,
            breakdown,
        })?;

        info!(
            org_unit = %org,
            record_id = record.id,
            employee_id,
            period = %period,
            net_salary = %record.net_salary,
            created,
            "Salary record stored"
        );

        Ok(SalaryOutcome {
            record,
            created,
            ignored_subsidy_ids,
            ignored_discount_ids,
        })
    }

    /// Recomputes an existing record from the employee's current base salary
    /// and the current catalog amounts of the new selection.
    ///
    /// A selection list left out of `update` keeps the subsidies or discounts
    /// currently applied to the record.
    ///
    /// # Errors
    ///
    /// - `SalaryRecordNotFound` if the record is not in the caller's org unit
    /// - `EmployeeNotFound` if the (new) employee does not exist
    /// - `DuplicateSalaryPeriod` if another record holds the target employee and period
    pub fn update_and_recompute(
        &self,
        org: OrgUnit,
        record_id: u64,
        update: SalaryUpdate,
    ) -> LedgerResult<SalaryRecord> {
        let existing = self
            .store
            .fetch_salary_record(org, record_id)?
            .ok_or(LedgerError::SalaryRecordNotFound { id: record_id })?;

        let employee_id = update.employee_id.unwrap_or(existing.employee_id);
        let period = update.period.unwrap_or(existing.period);
        let selection = AdjustmentSelection::new(
            update.subsidy_ids.unwrap_or_else(|| existing.subsidy_ids()),
            update.discount_ids.unwrap_or_else(|| existing.discount_ids()),
        );
        let employee = self.employee(org, employee_id)?;
        let breakdown = self.breakdown(org, &employee, &selection)?;

        let draft = SalaryDraft {
            org_unit: org,
            employee_id,
            period,
            breakdown,
        };
        let record = self
            .store
            .replace_salary_record(record_id, draft)
            .map_err(|err| match err {
                StoreError::Conflict { .. } => LedgerError::DuplicateSalaryPeriod {
                    employee_id,
                    period: period.to_string(),
                },
                other => other.into(),
            })?;

        info!(
            org_unit = %org,
            record_id,
            employee_id,
            period = %period,
            net_salary = %record.net_salary,
            "Salary record recomputed"
        );
        Ok(record)
    }

    /// Removes a salary record.
    pub fn delete(&self, org: OrgUnit, record_id: u64) -> LedgerResult<()> {
        self.store.delete_salary_record(org, record_id)?;
        info!(org_unit = %org, record_id, "Salary record deleted");
        Ok(())
    }

    /// Lists salary records, newest period first.
    ///
    /// # Errors
    ///
    /// `InvalidPeriod` if `query.end` is before `query.start`.
    pub fn list(&self, org: OrgUnit, query: SalaryQuery) -> LedgerResult<Vec<SalaryRecord>> {
        ensure_ordered(query.start.as_ref(), query.end.as_ref())?;
        Ok(self.store.list_salary_records(org, query)?)
    }

    /// Returns one record with its selection and the selectable catalog.
    pub fn detailed(&self, org: OrgUnit, record_id: u64) -> LedgerResult<SalaryDetail> {
        let record = self
            .store
            .fetch_salary_record(org, record_id)?
            .ok_or(LedgerError::SalaryRecordNotFound { id: record_id })?;

        Ok(SalaryDetail {
            selected_subsidy_ids: record.subsidy_ids(),
            selected_discount_ids: record.discount_ids(),
            available_subsidies: self.active_catalog(org, AdjustmentKind::Subsidy)?,
            available_discounts: self.active_catalog(org, AdjustmentKind::Discount)?,
            record,
        })
    }

    fn employee(&self, org: OrgUnit, employee_id: u64) -> LedgerResult<Employee> {
        self.store
            .fetch_employee(org, employee_id)?
            .ok_or(LedgerError::EmployeeNotFound { id: employee_id })
    }

    fn active_catalog(&self, org: OrgUnit, kind: AdjustmentKind) -> LedgerResult<Vec<CatalogEntry>> {
        Ok(self
            .store
            .list_catalog(org, kind)?
            .into_iter()
            .filter(|entry| entry.active)
            .collect())
    }

    fn breakdown(
        &self,
        org: OrgUnit,
        employee: &Employee,
        selection: &AdjustmentSelection,
    ) -> LedgerResult<SalaryBreakdown> {
        let subsidies = self.store.list_catalog(org, AdjustmentKind::Subsidy)?;
        let discounts = self.store.list_catalog(org, AdjustmentKind::Discount)?;
        let breakdown = compute_salary(employee.base_salary, selection, &subsidies, &discounts)?;

        if !breakdown.ignored_subsidy_ids.is_empty() || !breakdown.ignored_discount_ids.is_empty() {
            debug!(
                employee_id = employee.id,
                ignored_subsidies = ?breakdown.ignored_subsidy_ids,
                ignored_discounts = ?breakdown.ignored_discount_ids,
                "Skipped unknown or inactive catalog entries"
            );
        }
        Ok(breakdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewCatalogEntry, NewEmployee};
    use crate::store::InMemoryStore;
    use rust_decimal::Decimal;

    const HQ: OrgUnit = OrgUnit::Headquarters(1);

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: PayrollService,
        employee: Employee,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let service = PayrollService::new(store.clone());
        let employee = store
            .insert_employee(NewEmployee {
                org_unit: HQ,
                member_ref: Some(12),
                base_salary: Decimal::from(100_000),
                active: true,
            })
            .unwrap();
        for (kind, amount) in [
            (AdjustmentKind::Subsidy, 10_000),
            (AdjustmentKind::Subsidy, 5_000),
            (AdjustmentKind::Discount, 3_000),
        ] {
            store
                .insert_catalog_entry(NewCatalogEntry {
                    org_unit: HQ,
                    kind,
                    name: format!("{} {}", kind, amount),
                    amount: Decimal::from(amount),
                    active: true,
                })
                .unwrap();
        }
        Fixture {
            store,
            service,
            employee,
        }
    }

    fn period(s: &str) -> Period {
        s.parse().unwrap()
    }

    #[test]
    fn test_compute_and_store_scenario() {
        let f = fixture();
        let selection = AdjustmentSelection::new([1, 2], [1]);

        let outcome = f
            .service
            .compute_and_store(HQ, f.employee.id, period("2025-03"), &selection)
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.record.net_salary, Decimal::from(112_000));
        assert_eq!(outcome.record.base_salary, Decimal::from(100_000));
    }

    #[test]
    fn test_identical_runs_are_idempotent() {
        let f = fixture();
        let selection = AdjustmentSelection::new([1], [1]);

        let first = f
            .service
            .compute_and_store(HQ, f.employee.id, period("2025-03"), &selection)
            .unwrap();
        let second = f
            .service
            .compute_and_store(HQ, f.employee.id, period("2025-03"), &selection)
            .unwrap();

        assert!(!second.created);
        assert_eq!(first.record.id, second.record.id);
        assert_eq!(first.record.net_salary, second.record.net_salary);
        assert_eq!(f.service.list(HQ, SalaryQuery::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_second_run_with_new_selection_updates_in_place() {
        let f = fixture();
        let first = f
            .service
            .compute_and_store(HQ, f.employee.id, period("2025-03"), &AdjustmentSelection::default())
            .unwrap();
        let second = f
            .service
            .compute_and_store(
                HQ,
                f.employee.id,
                period("2025-03"),
                &AdjustmentSelection::new([2], []),
            )
            .unwrap();

        assert_eq!(first.record.id, second.record.id);
        assert_eq!(second.record.net_salary, Decimal::from(105_000));
        assert_eq!(f.service.list(HQ, SalaryQuery::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_employee() {
        let f = fixture();
        let err = f
            .service
            .compute_and_store(HQ, 999, period("2025-03"), &AdjustmentSelection::default())
            .unwrap_err();
        assert!(matches!(err, LedgerError::EmployeeNotFound { id: 999 }));
    }

    #[test]
    fn test_employee_of_other_org_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .compute_and_store(
                OrgUnit::Branch(5),
                f.employee.id,
                period("2025-03"),
                &AdjustmentSelection::default(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::EmployeeNotFound { .. }));
    }

    #[test]
    fn test_inactive_employee_is_rejected() {
        let f = fixture();
        let mut employee = f.employee.clone();
        employee.active = false;
        f.store.update_employee(employee).unwrap();

        let err = f
            .service
            .compute_and_store(HQ, f.employee.id, period("2025-03"), &AdjustmentSelection::default())
            .unwrap_err();
        assert!(matches!(err, LedgerError::EmployeeInactive { .. }));
    }

    #[test]
    fn test_unknown_selection_ids_are_reported() {
        let f = fixture();
        let outcome = f
            .service
            .compute_and_store(
                HQ,
                f.employee.id,
                period("2025-03"),
                &AdjustmentSelection::new([1, 50], [60]),
            )
            .unwrap();

        assert_eq!(outcome.ignored_subsidy_ids, vec![50]);
        assert_eq!(outcome.ignored_discount_ids, vec![60]);
        assert_eq!(outcome.record.net_salary, Decimal::from(110_000));
    }

    #[test]
    fn test_update_uses_current_base_salary() {
        let f = fixture();
        let outcome = f
            .service
            .compute_and_store(HQ, f.employee.id, period("2025-03"), &AdjustmentSelection::default())
            .unwrap();

        let mut raised = f.employee.clone();
        raised.base_salary = Decimal::from(120_000);
        f.store.update_employee(raised).unwrap();

        let updated = f
            .service
            .update_and_recompute(
                HQ,
                outcome.record.id,
                SalaryUpdate {
                    subsidy_ids: Some(vec![]),
                    discount_ids: Some(vec![1]),
                    ..SalaryUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.base_salary, Decimal::from(120_000));
        assert_eq!(updated.net_salary, Decimal::from(117_000));
        assert_eq!(updated.period, period("2025-03"));
    }

    #[test]
    fn test_update_onto_taken_period_is_duplicate() {
        let f = fixture();
        let march = f
            .service
            .compute_and_store(HQ, f.employee.id, period("2025-03"), &AdjustmentSelection::default())
            .unwrap();
        f.service
            .compute_and_store(HQ, f.employee.id, period("2025-04"), &AdjustmentSelection::default())
            .unwrap();

        let err = f
            .service
            .update_and_recompute(
                HQ,
                march.record.id,
                SalaryUpdate {
                    period: Some(period("2025-04")),
                    ..SalaryUpdate::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateSalaryPeriod { .. }));
    }

    #[test]
    fn test_moving_period_keeps_selection() {
        let f = fixture();
        let outcome = f
            .service
            .compute_and_store(
                HQ,
                f.employee.id,
                period("2025-03"),
                &AdjustmentSelection::new([1, 2], [1]),
            )
            .unwrap();

        let moved = f
            .service
            .update_and_recompute(
                HQ,
                outcome.record.id,
                SalaryUpdate {
                    period: Some(period("2025-05")),
                    ..SalaryUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(moved.period, period("2025-05"));
        assert_eq!(moved.subsidy_ids(), vec![1, 2]);
        assert_eq!(moved.discount_ids(), vec![1]);
        assert_eq!(moved.net_salary, Decimal::from(112_000));
    }

    #[test]
    fn test_replacing_one_list_keeps_the_other() {
        let f = fixture();
        let outcome = f
            .service
            .compute_and_store(
                HQ,
                f.employee.id,
                period("2025-03"),
                &AdjustmentSelection::new([1], [1]),
            )
            .unwrap();

        let updated = f
            .service
            .update_and_recompute(
                HQ,
                outcome.record.id,
                SalaryUpdate {
                    discount_ids: Some(vec![]),
                    ..SalaryUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.subsidy_ids(), vec![1]);
        assert!(updated.discount_ids().is_empty());
        assert_eq!(updated.net_salary, Decimal::from(110_000));
    }

    #[test]
    fn test_overflowing_salary_is_an_error_and_stores_nothing() {
        let f = fixture();
        let rich = f
            .store
            .insert_employee(NewEmployee {
                org_unit: HQ,
                member_ref: None,
                base_salary: Decimal::MAX,
                active: true,
            })
            .unwrap();
        let bonus = f
            .store
            .insert_catalog_entry(NewCatalogEntry {
                org_unit: HQ,
                kind: AdjustmentKind::Subsidy,
                name: "Bónus".to_string(),
                amount: Decimal::MAX,
                active: true,
            })
            .unwrap();

        let err = f
            .service
            .compute_and_store(
                HQ,
                rich.id,
                period("2025-03"),
                &AdjustmentSelection::new([bonus.id], []),
            )
            .unwrap_err();

        assert!(matches!(err, LedgerError::AmountOverflow { .. }));
        assert!(f.service.list(HQ, SalaryQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn test_update_missing_record() {
        let f = fixture();
        let err = f
            .service
            .update_and_recompute(HQ, 77, SalaryUpdate::default())
            .unwrap_err();
        assert!(matches!(err, LedgerError::SalaryRecordNotFound { id: 77 }));
    }

    #[test]
    fn test_snapshot_survives_catalog_edits() {
        let f = fixture();
        let outcome = f
            .service
            .compute_and_store(
                HQ,
                f.employee.id,
                period("2025-03"),
                &AdjustmentSelection::new([1], []),
            )
            .unwrap();

        let mut subsidy = f
            .store
            .fetch_catalog_entry(HQ, AdjustmentKind::Subsidy, 1)
            .unwrap()
            .unwrap();
        subsidy.amount = Decimal::from(1);
        f.store.update_catalog_entry(subsidy).unwrap();

        let detail = f.service.detailed(HQ, outcome.record.id).unwrap();
        assert_eq!(detail.record.subsidies[0].amount, Decimal::from(10_000));
        assert_eq!(detail.selected_subsidy_ids, vec![1]);
        assert_eq!(detail.available_subsidies.len(), 2);
        assert_eq!(detail.available_discounts.len(), 1);
    }

    #[test]
    fn test_list_filters_and_validates_range() {
        let f = fixture();
        for p in ["2025-01", "2025-02", "2025-03"] {
            f.service
                .compute_and_store(HQ, f.employee.id, period(p), &AdjustmentSelection::default())
                .unwrap();
        }

        let records = f
            .service
            .list(
                HQ,
                SalaryQuery {
                    start: Some(period("2025-02")),
                    end: Some(period("2025-03")),
                    employee_id: Some(f.employee.id),
                },
            )
            .unwrap();
        let periods: Vec<String> = records.iter().map(|r| r.period.to_string()).collect();
        assert_eq!(periods, vec!["2025-03", "2025-02"]);

        let err = f
            .service
            .list(
                HQ,
                SalaryQuery {
                    start: Some(period("2025-03")),
                    end: Some(period("2025-01")),
                    employee_id: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPeriod { .. }));
    }

    #[test]
    fn test_delete_record() {
        let f = fixture();
        let outcome = f
            .service
            .compute_and_store(HQ, f.employee.id, period("2025-03"), &AdjustmentSelection::default())
            .unwrap();

        f.service.delete(HQ, outcome.record.id).unwrap();
        let err = f.service.delete(HQ, outcome.record.id).unwrap_err();
        assert!(matches!(err, LedgerError::SalaryRecordNotFound { .. }));
    }
}
