//! In-process [`EntityStore`] backed by ordered maps behind a mutex.
//!
//! Every trait method takes the lock once and holds it for the whole
//! read-modify-write, so compound operations such as the salary upsert are
//! atomic with respect to concurrent requests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::{EntityStore, LinkChange, SalaryQuery, StoreError, StoreResult};
use crate::models::{
    AdjustmentKind, CatalogEntry, CategoryExpenseLink, Employee, Expense, ExpenseCategory,
    NewCatalogEntry, NewCategory, NewEmployee, NewExpense, OrgUnit, Period, SalaryDraft,
    SalaryRecord,
};

const EMPLOYEE: &str = "employee";
const SUBSIDY: &str = "subsidy";
const DISCOUNT: &str = "discount";
const SALARY_RECORD: &str = "salary record";
const CATEGORY: &str = "category";
const EXPENSE: &str = "expense";

fn catalog_entity(kind: AdjustmentKind) -> &'static str {
    match kind {
        AdjustmentKind::Subsidy => SUBSIDY,
        AdjustmentKind::Discount => DISCOUNT,
    }
}

fn not_found(entity: &'static str, id: u64) -> StoreError {
    StoreError::NotFound { entity, id }
}

#[derive(Debug, Default)]
struct Tables {
    sequences: HashMap<&'static str, u64>,
    employees: BTreeMap<u64, Employee>,
    subsidies: BTreeMap<u64, CatalogEntry>,
    discounts: BTreeMap<u64, CatalogEntry>,
    salary_records: BTreeMap<u64, SalaryRecord>,
    /// Unique index on (employee_id, period).
    salary_index: HashMap<(u64, Period), u64>,
    categories: BTreeMap<u64, ExpenseCategory>,
    expenses: BTreeMap<u64, Expense>,
    /// expense_id -> category_id; one link per expense.
    links: BTreeMap<u64, u64>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> u64 {
        let sequence = self.sequences.entry(table).or_insert(0);
        *sequence += 1;
        *sequence
    }

    fn catalog(&self, kind: AdjustmentKind) -> &BTreeMap<u64, CatalogEntry> {
        match kind {
            AdjustmentKind::Subsidy => &self.subsidies,
            AdjustmentKind::Discount => &self.discounts,
        }
    }

    fn catalog_mut(&mut self, kind: AdjustmentKind) -> &mut BTreeMap<u64, CatalogEntry> {
        match kind {
            AdjustmentKind::Subsidy => &mut self.subsidies,
            AdjustmentKind::Discount => &mut self.discounts,
        }
    }

    fn ensure_employee(&self, org: OrgUnit, id: u64) -> StoreResult<()> {
        match self.employees.get(&id) {
            Some(employee) if employee.org_unit == org => Ok(()),
            _ => Err(not_found(EMPLOYEE, id)),
        }
    }

    fn ensure_category(&self, org: OrgUnit, id: u64) -> StoreResult<()> {
        match self.categories.get(&id) {
            Some(category) if category.org_unit == org => Ok(()),
            _ => Err(not_found(CATEGORY, id)),
        }
    }

    fn name_taken(&self, org: OrgUnit, name: &str, except: Option<u64>) -> bool {
        let wanted = ExpenseCategory::normalized_name(name);
        self.categories.values().any(|category| {
            category.org_unit == org
                && Some(category.id) != except
                && ExpenseCategory::normalized_name(&category.name) == wanted
        })
    }
}

/// Thread-safe in-memory store.
///
/// Ids are assigned per table starting at 1, like auto-increment columns.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl EntityStore for InMemoryStore {
    fn insert_employee(&self, employee: NewEmployee) -> StoreResult<Employee> {
        let mut tables = self.tables()?;
        let id = tables.next_id(EMPLOYEE);
        let employee = Employee {
            id,
            org_unit: employee.org_unit,
            member_ref: employee.member_ref,
            base_salary: employee.base_salary,
            active: employee.active,
        };
        tables.employees.insert(id, employee.clone());
        Ok(employee)
    }

    fn update_employee(&self, employee: Employee) -> StoreResult<Employee> {
        let mut tables = self.tables()?;
        tables.ensure_employee(employee.org_unit, employee.id)?;
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    fn fetch_employee(&self, org: OrgUnit, id: u64) -> StoreResult<Option<Employee>> {
        let tables = self.tables()?;
        Ok(tables
            .employees
            .get(&id)
            .filter(|employee| employee.org_unit == org)
            .cloned())
    }

    fn list_employees(&self, org: OrgUnit) -> StoreResult<Vec<Employee>> {
        let tables = self.tables()?;
        Ok(tables
            .employees
            .values()
            .filter(|employee| employee.org_unit == org)
            .cloned()
            .collect())
    }

    fn insert_catalog_entry(&self, entry: NewCatalogEntry) -> StoreResult<CatalogEntry> {
        let mut tables = self.tables()?;
        let id = tables.next_id(catalog_entity(entry.kind));
        let entry = CatalogEntry {
            id,
            org_unit: entry.org_unit,
            kind: entry.kind,
            name: entry.name,
            amount: entry.amount,
            active: entry.active,
        };
        tables.catalog_mut(entry.kind).insert(id, entry.clone());
        Ok(entry)
    }

    fn update_catalog_entry(&self, entry: CatalogEntry) -> StoreResult<CatalogEntry> {
        let mut tables = self.tables()?;
        let catalog = tables.catalog_mut(entry.kind);
        let owned = catalog
            .get(&entry.id)
            .is_some_and(|existing| existing.org_unit == entry.org_unit);
        if !owned {
            return Err(not_found(catalog_entity(entry.kind), entry.id));
        }
        catalog.insert(entry.id, entry.clone());
        Ok(entry)
    }

    fn fetch_catalog_entry(
        &self,
        org: OrgUnit,
        kind: AdjustmentKind,
        id: u64,
    ) -> StoreResult<Option<CatalogEntry>> {
        let tables = self.tables()?;
        Ok(tables
            .catalog(kind)
            .get(&id)
            .filter(|entry| entry.org_unit == org)
            .cloned())
    }

    fn delete_catalog_entry(&self, org: OrgUnit, kind: AdjustmentKind, id: u64) -> StoreResult<()> {
        let mut tables = self.tables()?;
        let catalog = tables.catalog_mut(kind);
        match catalog.remove(&id) {
            Some(entry) if entry.org_unit != org => {
                catalog.insert(id, entry);
                Err(not_found(catalog_entity(kind), id))
            }
            Some(_) => Ok(()),
            None => Err(not_found(catalog_entity(kind), id)),
        }
    }

    fn list_catalog(&self, org: OrgUnit, kind: AdjustmentKind) -> StoreResult<Vec<CatalogEntry>> {
        let tables = self.tables()?;
        Ok(tables
            .catalog(kind)
            .values()
            .filter(|entry| entry.org_unit == org)
            .cloned()
            .collect())
    }

    fn upsert_salary_record(&self, draft: SalaryDraft) -> StoreResult<(SalaryRecord, bool)> {
        let mut tables = self.tables()?;
        tables.ensure_employee(draft.org_unit, draft.employee_id)?;

        let now = Utc::now();
        let key = (draft.employee_id, draft.period);
        let existing = tables.salary_index.get(&key).copied();

        if let Some(id) = existing {
            let record = tables
                .salary_records
                .get_mut(&id)
                .ok_or_else(|| StoreError::Unavailable(format!("salary index points at missing record {}", id)))?;
            record.apply(draft, now);
            return Ok((record.clone(), false));
        }

        let id = tables.next_id(SALARY_RECORD);
        let record = draft.into_record(id, now);
        tables.salary_records.insert(id, record.clone());
        tables.salary_index.insert(key, id);
        Ok((record, true))
    }

    fn replace_salary_record(&self, id: u64, draft: SalaryDraft) -> StoreResult<SalaryRecord> {
        let mut tables = self.tables()?;
        let old_key = match tables.salary_records.get(&id) {
            Some(record) if record.org_unit == draft.org_unit => (record.employee_id, record.period),
            _ => return Err(not_found(SALARY_RECORD, id)),
        };
        tables.ensure_employee(draft.org_unit, draft.employee_id)?;

        let new_key = (draft.employee_id, draft.period);
        if let Some(holder) = tables.salary_index.get(&new_key) {
            if *holder != id {
                return Err(StoreError::Conflict {
                    message: format!(
                        "employee {} already has a salary record for {}",
                        draft.employee_id, draft.period
                    ),
                });
            }
        }

        let now = Utc::now();
        let record = tables
            .salary_records
            .get_mut(&id)
            .ok_or_else(|| not_found(SALARY_RECORD, id))?;
        record.apply(draft, now);
        let record = record.clone();

        tables.salary_index.remove(&old_key);
        tables.salary_index.insert(new_key, id);
        Ok(record)
    }

    fn fetch_salary_record(&self, org: OrgUnit, id: u64) -> StoreResult<Option<SalaryRecord>> {
        let tables = self.tables()?;
        Ok(tables
            .salary_records
            .get(&id)
            .filter(|record| record.org_unit == org)
            .cloned())
    }

    fn delete_salary_record(&self, org: OrgUnit, id: u64) -> StoreResult<()> {
        let mut tables = self.tables()?;
        let key = match tables.salary_records.get(&id) {
            Some(record) if record.org_unit == org => (record.employee_id, record.period),
            _ => return Err(not_found(SALARY_RECORD, id)),
        };
        tables.salary_records.remove(&id);
        tables.salary_index.remove(&key);
        Ok(())
    }

    fn list_salary_records(
        &self,
        org: OrgUnit,
        query: SalaryQuery,
    ) -> StoreResult<Vec<SalaryRecord>> {
        let tables = self.tables()?;
        let mut records: Vec<SalaryRecord> = tables
            .salary_records
            .values()
            .filter(|record| record.org_unit == org && query.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.period
                .cmp(&a.period)
                .then(a.employee_id.cmp(&b.employee_id))
                .then(a.id.cmp(&b.id))
        });
        Ok(records)
    }

    fn insert_category(&self, category: NewCategory) -> StoreResult<ExpenseCategory> {
        let mut tables = self.tables()?;
        if tables.name_taken(category.org_unit, &category.name, None) {
            return Err(StoreError::Conflict {
                message: format!("category '{}' already exists", category.name.trim()),
            });
        }
        let id = tables.next_id(CATEGORY);
        let category = ExpenseCategory {
            id,
            org_unit: category.org_unit,
            name: category.name,
            description: category.description,
            active: true,
        };
        tables.categories.insert(id, category.clone());
        Ok(category)
    }

    fn update_category(&self, category: ExpenseCategory) -> StoreResult<ExpenseCategory> {
        let mut tables = self.tables()?;
        tables.ensure_category(category.org_unit, category.id)?;
        if tables.name_taken(category.org_unit, &category.name, Some(category.id)) {
            return Err(StoreError::Conflict {
                message: format!("category '{}' already exists", category.name.trim()),
            });
        }
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    fn fetch_category(&self, org: OrgUnit, id: u64) -> StoreResult<Option<ExpenseCategory>> {
        let tables = self.tables()?;
        Ok(tables
            .categories
            .get(&id)
            .filter(|category| category.org_unit == org)
            .cloned())
    }

    fn find_category_by_name(
        &self,
        org: OrgUnit,
        name: &str,
    ) -> StoreResult<Option<ExpenseCategory>> {
        let tables = self.tables()?;
        let wanted = ExpenseCategory::normalized_name(name);
        Ok(tables
            .categories
            .values()
            .find(|category| {
                category.org_unit == org
                    && ExpenseCategory::normalized_name(&category.name) == wanted
            })
            .cloned())
    }

    fn delete_category(&self, org: OrgUnit, id: u64) -> StoreResult<usize> {
        let mut tables = self.tables()?;
        tables.ensure_category(org, id)?;
        tables.categories.remove(&id);
        let before = tables.links.len();
        tables.links.retain(|_, category_id| *category_id != id);
        Ok(before - tables.links.len())
    }

    fn list_categories(&self, org: OrgUnit) -> StoreResult<Vec<ExpenseCategory>> {
        let tables = self.tables()?;
        Ok(tables
            .categories
            .values()
            .filter(|category| category.org_unit == org)
            .cloned()
            .collect())
    }

    fn insert_expense(
        &self,
        expense: NewExpense,
        category_id: Option<u64>,
    ) -> StoreResult<Expense> {
        let mut tables = self.tables()?;
        if let Some(category_id) = category_id {
            tables.ensure_category(expense.org_unit, category_id)?;
        }
        let id = tables.next_id(EXPENSE);
        let expense = Expense {
            id,
            org_unit: expense.org_unit,
            description: expense.description,
            amount: expense.amount,
            date: expense.date,
            expense_type: expense.expense_type,
            note: expense.note,
            created_at: Utc::now(),
        };
        tables.expenses.insert(id, expense.clone());
        if let Some(category_id) = category_id {
            tables.links.insert(id, category_id);
        }
        Ok(expense)
    }

    fn update_expense(
        &self,
        expense: Expense,
        link: LinkChange,
    ) -> StoreResult<(Expense, Option<u64>)> {
        let mut tables = self.tables()?;
        let created_at = match tables.expenses.get(&expense.id) {
            Some(existing) if existing.org_unit == expense.org_unit => existing.created_at,
            _ => return Err(not_found(EXPENSE, expense.id)),
        };
        if let LinkChange::Set(category_id) = link {
            tables.ensure_category(expense.org_unit, category_id)?;
        }

        let expense = Expense {
            created_at,
            ..expense
        };
        tables.expenses.insert(expense.id, expense.clone());
        match link {
            LinkChange::Keep => {}
            LinkChange::Set(category_id) => {
                tables.links.insert(expense.id, category_id);
            }
            LinkChange::Clear => {
                tables.links.remove(&expense.id);
            }
        }
        let category_id = tables.links.get(&expense.id).copied();
        Ok((expense, category_id))
    }

    fn fetch_expense(&self, org: OrgUnit, id: u64) -> StoreResult<Option<Expense>> {
        let tables = self.tables()?;
        Ok(tables
            .expenses
            .get(&id)
            .filter(|expense| expense.org_unit == org)
            .cloned())
    }

    fn delete_expense(&self, org: OrgUnit, id: u64) -> StoreResult<()> {
        let mut tables = self.tables()?;
        match tables.expenses.get(&id) {
            Some(expense) if expense.org_unit == org => {}
            _ => return Err(not_found(EXPENSE, id)),
        }
        tables.expenses.remove(&id);
        tables.links.remove(&id);
        Ok(())
    }

    fn list_expenses(&self, org: OrgUnit) -> StoreResult<Vec<Expense>> {
        let tables = self.tables()?;
        let mut expenses: Vec<Expense> = tables
            .expenses
            .values()
            .filter(|expense| expense.org_unit == org)
            .cloned()
            .collect();
        expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(expenses)
    }

    fn list_links(&self, org: OrgUnit) -> StoreResult<Vec<CategoryExpenseLink>> {
        let tables = self.tables()?;
        Ok(tables
            .links
            .iter()
            .filter(|(expense_id, _)| {
                tables
                    .expenses
                    .get(expense_id)
                    .is_some_and(|expense| expense.org_unit == org)
            })
            .map(|(expense_id, category_id)| CategoryExpenseLink {
                expense_id: *expense_id,
                category_id: *category_id,
            })
            .collect())
    }
}
