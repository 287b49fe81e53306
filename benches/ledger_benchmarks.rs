//! Performance benchmarks for the church ledger.
//!
//! Covers the pure calculations and the HTTP path for the two engines:
//! - Salary computation with a full catalog selection
//! - Category aggregation over growing expense sets
//! - POST /salarios upsert through the router
//! - GET /relatorio/despesas through the router
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::hint::black_box;

use axum::{body::Body, http::Request};
use chrono::{Duration, NaiveDate, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rust_decimal::Decimal;
use tower::ServiceExt;

use church_ledger::api::{AppState, create_router};
use church_ledger::calculation::{
    AdjustmentSelection, CategoryOrdering, ExpenseFilter, aggregate_by_category, compute_salary,
};
use church_ledger::models::{
    AdjustmentKind, CatalogEntry, CategoryExpenseLink, DateWindow, Expense, ExpenseCategory,
    ExpenseType, OrgUnit,
};

const HQ: OrgUnit = OrgUnit::Headquarters(1);

fn catalog(kind: AdjustmentKind, count: u64) -> Vec<CatalogEntry> {
    (1..=count)
        .map(|id| CatalogEntry {
            id,
            org_unit: HQ,
            kind,
            name: format!("{} {}", kind, id),
            amount: Decimal::new(1_000 + id as i64 * 25, 2),
            active: id % 7 != 0,
        })
        .collect()
}

/// Builds `count` expenses spread over a year and 12 categories.
fn ledger(count: u64) -> (Vec<ExpenseCategory>, Vec<Expense>, Vec<CategoryExpenseLink>) {
    let categories: Vec<ExpenseCategory> = (1..=12)
        .map(|id| ExpenseCategory {
            id,
            org_unit: HQ,
            name: format!("Categoria {:02}", id),
            description: None,
            active: true,
        })
        .collect();

    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let expenses: Vec<Expense> = (1..=count)
        .map(|id| Expense {
            id,
            org_unit: HQ,
            description: format!("Despesa {}", id),
            amount: Decimal::new(10_000 + (id as i64 % 97) * 150, 2),
            date: start + Duration::days((id % 365) as i64),
            expense_type: if id % 3 == 0 {
                ExpenseType::Variable
            } else {
                ExpenseType::Fixed
            },
            note: None,
            created_at: Utc::now(),
        })
        .collect();

    let links = expenses
        .iter()
        .filter(|e| e.id % 10 != 0)
        .map(|e| CategoryExpenseLink {
            expense_id: e.id,
            category_id: e.id % 12 + 1,
        })
        .collect();

    (categories, expenses, links)
}

/// Benchmark: net salary with 20 subsidies and 10 discounts selected.
fn bench_compute_salary(c: &mut Criterion) {
    let subsidies = catalog(AdjustmentKind::Subsidy, 20);
    let discounts = catalog(AdjustmentKind::Discount, 10);
    let selection = AdjustmentSelection::new(1..=20, 1..=10);

    c.bench_function("compute_salary", |b| {
        b.iter(|| {
            compute_salary(
                black_box(Decimal::new(15_000_000, 2)),
                black_box(&selection),
                &subsidies,
                &discounts,
            )
        })
    });
}

/// Benchmark: category aggregation over a quarter window.
fn bench_aggregate_by_category(c: &mut Criterion) {
    let filter = ExpenseFilter {
        window: DateWindow::new(
            NaiveDate::from_ymd_opt(2025, 1, 1),
            NaiveDate::from_ymd_opt(2025, 3, 31),
        )
        .unwrap(),
        expense_type: None,
    };

    let mut group = c.benchmark_group("aggregate_by_category");
    for count in [1_000u64, 10_000] {
        let (categories, expenses, links) = ledger(count);
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                aggregate_by_category(
                    &categories,
                    &expenses,
                    &links,
                    black_box(&filter),
                    CategoryOrdering::TotalDescending,
                )
            })
        });
    }
    group.finish();
}

/// Benchmark: repeated POST /salarios for the same employee and period.
fn bench_salary_upsert_http(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let state = AppState::in_memory();
    let catalog_service = state.catalog();
    let employee = catalog_service
        .create_employee(
            HQ,
            church_ledger::services::EmployeeInput {
                member_ref: None,
                base_salary: Decimal::new(10_000_000, 2),
                active: None,
            },
        )
        .unwrap();
    for entry in catalog(AdjustmentKind::Subsidy, 5) {
        catalog_service
            .create_entry(
                HQ,
                AdjustmentKind::Subsidy,
                church_ledger::services::CatalogInput {
                    name: entry.name,
                    amount: entry.amount,
                    active: None,
                },
            )
            .unwrap();
    }
    let router = create_router(state);
    let body = serde_json::json!({
        "employee_id": employee.id,
        "period": "2025-03",
        "subsidy_ids": [1, 2, 3, 4, 5]
    })
    .to_string();

    c.bench_function("salary_upsert_http", |b| {
        b.to_async(&rt).iter(|| async {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/salarios")
                        .header("Content-Type", "application/json")
                        .header("x-sede-id", "1")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: GET /relatorio/despesas with 1000 stored expenses.
fn bench_expense_report_http(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let state = AppState::in_memory();
    let (categories, expenses, links) = ledger(1_000);

    let mut category_ids = Vec::with_capacity(categories.len());
    for category in categories {
        let created = state
            .expenses()
            .create_category(
                HQ,
                church_ledger::services::CategoryInput {
                    name: category.name,
                    description: None,
                },
            )
            .unwrap();
        category_ids.push(created.id);
    }
    for expense in expenses {
        let category_id = links
            .iter()
            .find(|l| l.expense_id == expense.id)
            .map(|l| category_ids[(l.category_id - 1) as usize]);
        state
            .expenses()
            .create_expense(
                HQ,
                church_ledger::services::ExpenseInput {
                    description: expense.description,
                    amount: expense.amount,
                    date: expense.date,
                    expense_type: expense.expense_type,
                    note: None,
                },
                category_id,
            )
            .unwrap();
    }
    let router = create_router(state);

    c.bench_function("expense_report_http", |b| {
        b.to_async(&rt).iter(|| async {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/relatorio/despesas?start_date=2025-01-01&end_date=2025-06-30")
                        .header("x-sede-id", "1")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_compute_salary,
    bench_aggregate_by_category,
    bench_salary_upsert_http,
    bench_expense_report_http,
);

criterion_main!(benches);
