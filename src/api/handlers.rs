//! HTTP request handlers for the church ledger API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! handler except `/health` takes a [`CallerContext`] and tags its log events
//! with a fresh correlation id.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::CategoryOrdering;
use crate::error::LedgerError;
use crate::models::{AdjustmentKind, CatalogEntry, Period};
use crate::services::SalaryUpdate;
use crate::store::{LinkChange, SalaryQuery};

use super::context::CallerContext;
use super::request::{
    CatalogRequest, CategoryRequest, EmployeeRequest, ExpenseReportQuery, ExpenseRequest,
    SalaryListQuery, SalaryRequest, SalaryUpdateRequest,
};
use super::response::{ApiError, ApiErrorResponse, Confirmation, HealthStatus};
use super::state::AppState;

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/lista/despesas", get(list_expenses))
        .route("/lista/tipos-despesa", get(type_statistics))
        .route("/despesas", post(create_expense))
        .route("/despesas/totais", get(expense_totals))
        .route(
            "/despesas/:id",
            put(update_expense).delete(delete_expense),
        )
        .route("/categorias", get(list_categories).post(create_category))
        .route("/categorias/despesas", get(categories_with_totals))
        .route(
            "/categorias/:id",
            put(update_category).delete(delete_category),
        )
        .route("/categorias/:id/despesas", get(category_expenses))
        .route("/relatorio/despesas", get(expense_report))
        .route("/funcionarios", get(list_employees).post(create_employee))
        .route("/funcionarios/:id", get(get_employee).put(update_employee))
        .route("/subsidios", get(list_subsidies).post(create_subsidy))
        .route(
            "/subsidios/:id",
            put(update_subsidy).delete(delete_subsidy),
        )
        .route("/descontos", get(list_discounts).post(create_discount))
        .route(
            "/descontos/:id",
            put(update_discount).delete(delete_discount),
        )
        .route("/salarios", get(list_salaries).post(compute_salary))
        .route(
            "/salarios/:id",
            put(recompute_salary).delete(delete_salary),
        )
        .route("/salarios/:id/detalhado", get(salary_detail))
        .with_state(state)
}

/// Unwraps a JSON body, turning extractor rejections into 400 responses.
fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> ApiResult<T> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

fn query_params<T>(
    query: Result<Query<T>, QueryRejection>,
    correlation_id: Uuid,
) -> ApiResult<T> {
    query.map(|Query(params)| params).map_err(|rejection| {
        let message = rejection.body_text();
        warn!(correlation_id = %correlation_id, error = %message, "Invalid query string");
        ApiErrorResponse::bad_request(ApiError::invalid_query(message))
    })
}

fn path_id(path: Result<Path<u64>, PathRejection>, correlation_id: Uuid) -> ApiResult<u64> {
    path.map(|Path(id)| id).map_err(|rejection| {
        let message = rejection.body_text();
        warn!(correlation_id = %correlation_id, error = %message, "Invalid path parameter");
        ApiErrorResponse::bad_request(ApiError::validation_error(message))
    })
}

/// Logs a failed operation and converts the error into a response.
fn failed(correlation_id: Uuid, action: &'static str) -> impl Fn(LedgerError) -> ApiErrorResponse {
    move |err| {
        warn!(
            correlation_id = %correlation_id,
            error = %err,
            action,
            "Request failed"
        );
        err.into()
    }
}

/// Handler for GET /health.
async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// Expenses

async fn list_expenses(
    State(state): State<AppState>,
    caller: CallerContext,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let expenses = state
        .expenses()
        .list_expenses(caller.org_unit)
        .map_err(failed(correlation_id, "list expenses"))?;
    info!(correlation_id = %correlation_id, org_unit = %caller.org_unit, count = expenses.len(), "Listed expenses");
    Ok(Json(expenses))
}

async fn create_expense(
    State(state): State<AppState>,
    caller: CallerContext,
    payload: Result<Json<ExpenseRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, org_unit = %caller.org_unit, "Processing expense creation");

    let (input, link) = json_body(payload, correlation_id)?.into_parts();
    let category_id = match link {
        LinkChange::Set(id) => Some(id),
        LinkChange::Keep | LinkChange::Clear => None,
    };
    let expense = state
        .expenses()
        .create_expense(caller.org_unit, input, category_id)
        .map_err(failed(correlation_id, "create expense"))?;

    Ok((StatusCode::CREATED, Json(expense)))
}

async fn update_expense(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ExpenseRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_id(id, correlation_id)?;
    let (input, link) = json_body(payload, correlation_id)?.into_parts();

    let expense = state
        .expenses()
        .update_expense(caller.org_unit, id, input, link)
        .map_err(failed(correlation_id, "update expense"))?;
    info!(correlation_id = %correlation_id, expense_id = id, "Expense update completed");
    Ok(Json(expense))
}

async fn delete_expense(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_id(id, correlation_id)?;
    state
        .expenses()
        .delete_expense(caller.org_unit, id)
        .map_err(failed(correlation_id, "delete expense"))?;
    Ok(Json(Confirmation::new("Expense deleted")))
}

async fn expense_totals(
    State(state): State<AppState>,
    caller: CallerContext,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let totals = state
        .expenses()
        .totals(caller.org_unit)
        .map_err(failed(correlation_id, "expense totals"))?;
    info!(correlation_id = %correlation_id, overall = %totals.overall, "Computed expense totals");
    Ok(Json(totals))
}

async fn type_statistics(
    State(state): State<AppState>,
    caller: CallerContext,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let statistics = state
        .expenses()
        .type_statistics(caller.org_unit)
        .map_err(failed(correlation_id, "expense type statistics"))?;
    Ok(Json(statistics))
}

// Categories

async fn list_categories(
    State(state): State<AppState>,
    caller: CallerContext,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let categories = state
        .expenses()
        .list_categories(caller.org_unit)
        .map_err(failed(correlation_id, "list categories"))?;
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<AppState>,
    caller: CallerContext,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let category = state
        .expenses()
        .create_category(caller.org_unit, request.into_input())
        .map_err(failed(correlation_id, "create category"))?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_id(id, correlation_id)?;
    let request = json_body(payload, correlation_id)?;
    let category = state
        .expenses()
        .update_category(caller.org_unit, id, request.into_update())
        .map_err(failed(correlation_id, "update category"))?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_id(id, correlation_id)?;
    let unlinked = state
        .expenses()
        .delete_category(caller.org_unit, id)
        .map_err(failed(correlation_id, "delete category"))?;
    Ok(Json(Confirmation {
        message: "Category deleted".to_string(),
        unlinked_expenses: Some(unlinked),
    }))
}

async fn category_expenses(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_id(id, correlation_id)?;
    let expenses = state
        .expenses()
        .category_expenses(caller.org_unit, id)
        .map_err(failed(correlation_id, "category expenses"))?;
    Ok(Json(expenses))
}

async fn categories_with_totals(
    State(state): State<AppState>,
    caller: CallerContext,
    query: Result<Query<ExpenseReportQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;
    let rows = state
        .expenses()
        .aggregate_by_category(
            caller.org_unit,
            query.start_date,
            query.end_date,
            query.expense_type,
            CategoryOrdering::NameAscending,
        )
        .map_err(failed(correlation_id, "categories with totals"))?;
    Ok(Json(rows))
}

async fn expense_report(
    State(state): State<AppState>,
    caller: CallerContext,
    query: Result<Query<ExpenseReportQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;
    info!(
        correlation_id = %correlation_id,
        org_unit = %caller.org_unit,
        start_date = ?query.start_date,
        end_date = ?query.end_date,
        expense_type = ?query.expense_type,
        "Processing expense report"
    );
    let rows = state
        .expenses()
        .aggregate_by_category(
            caller.org_unit,
            query.start_date,
            query.end_date,
            query.expense_type,
            CategoryOrdering::TotalDescending,
        )
        .map_err(failed(correlation_id, "expense report"))?;
    info!(correlation_id = %correlation_id, categories = rows.len(), "Expense report completed");
    Ok(Json(rows))
}

// Employees

async fn list_employees(
    State(state): State<AppState>,
    caller: CallerContext,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let employees = state
        .catalog()
        .list_employees(caller.org_unit)
        .map_err(failed(correlation_id, "list employees"))?;
    Ok(Json(employees))
}

async fn create_employee(
    State(state): State<AppState>,
    caller: CallerContext,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let employee = state
        .catalog()
        .create_employee(caller.org_unit, request.into())
        .map_err(failed(correlation_id, "create employee"))?;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn get_employee(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_id(id, correlation_id)?;
    let employee = state
        .catalog()
        .employee(caller.org_unit, id)
        .map_err(failed(correlation_id, "get employee"))?;
    Ok(Json(employee))
}

async fn update_employee(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_id(id, correlation_id)?;
    let request = json_body(payload, correlation_id)?;
    let employee = state
        .catalog()
        .update_employee(caller.org_unit, id, request.into())
        .map_err(failed(correlation_id, "update employee"))?;
    Ok(Json(employee))
}

// Subsidy and discount catalogs

fn list_entries(
    state: &AppState,
    caller: CallerContext,
    kind: AdjustmentKind,
) -> ApiResult<Json<Vec<CatalogEntry>>> {
    let correlation_id = Uuid::new_v4();
    let entries = state
        .catalog()
        .list_entries(caller.org_unit, kind)
        .map_err(failed(correlation_id, "list catalog"))?;
    Ok(Json(entries))
}

fn create_entry(
    state: &AppState,
    caller: CallerContext,
    kind: AdjustmentKind,
    payload: Result<Json<CatalogRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CatalogEntry>)> {
    let correlation_id = Uuid::new_v4();
    let request = json_body(payload, correlation_id)?;
    let entry = state
        .catalog()
        .create_entry(caller.org_unit, kind, request.into())
        .map_err(failed(correlation_id, "create catalog entry"))?;
    Ok((StatusCode::CREATED, Json(entry)))
}

fn update_entry(
    state: &AppState,
    caller: CallerContext,
    kind: AdjustmentKind,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<CatalogRequest>, JsonRejection>,
) -> ApiResult<Json<CatalogEntry>> {
    let correlation_id = Uuid::new_v4();
    let id = path_id(id, correlation_id)?;
    let request = json_body(payload, correlation_id)?;
    let entry = state
        .catalog()
        .update_entry(caller.org_unit, kind, id, request.into())
        .map_err(failed(correlation_id, "update catalog entry"))?;
    Ok(Json(entry))
}

fn delete_entry(
    state: &AppState,
    caller: CallerContext,
    kind: AdjustmentKind,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Confirmation>> {
    let correlation_id = Uuid::new_v4();
    let id = path_id(id, correlation_id)?;
    state
        .catalog()
        .delete_entry(caller.org_unit, kind, id)
        .map_err(failed(correlation_id, "delete catalog entry"))?;
    Ok(Json(Confirmation::new(format!("{} deleted", kind))))
}

async fn list_subsidies(
    State(state): State<AppState>,
    caller: CallerContext,
) -> ApiResult<impl IntoResponse> {
    list_entries(&state, caller, AdjustmentKind::Subsidy)
}

async fn create_subsidy(
    State(state): State<AppState>,
    caller: CallerContext,
    payload: Result<Json<CatalogRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    create_entry(&state, caller, AdjustmentKind::Subsidy, payload)
}

async fn update_subsidy(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<CatalogRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    update_entry(&state, caller, AdjustmentKind::Subsidy, id, payload)
}

async fn delete_subsidy(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    delete_entry(&state, caller, AdjustmentKind::Subsidy, id)
}

async fn list_discounts(
    State(state): State<AppState>,
    caller: CallerContext,
) -> ApiResult<impl IntoResponse> {
    list_entries(&state, caller, AdjustmentKind::Discount)
}

async fn create_discount(
    State(state): State<AppState>,
    caller: CallerContext,
    payload: Result<Json<CatalogRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    create_entry(&state, caller, AdjustmentKind::Discount, payload)
}

async fn update_discount(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<CatalogRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    update_entry(&state, caller, AdjustmentKind::Discount, id, payload)
}

async fn delete_discount(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    delete_entry(&state, caller, AdjustmentKind::Discount, id)
}

// Salaries

async fn list_salaries(
    State(state): State<AppState>,
    caller: CallerContext,
    query: Result<Query<SalaryListQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;
    let records = state
        .payroll()
        .list(
            caller.org_unit,
            SalaryQuery {
                start: query.start_period,
                end: query.end_period,
                employee_id: query.employee_id,
            },
        )
        .map_err(failed(correlation_id, "list salaries"))?;
    Ok(Json(records))
}

/// Handler for POST /salarios.
///
/// Returns 201 when a record was created and 200 when the employee already
/// had a record for the period and it was updated.
async fn compute_salary(
    State(state): State<AppState>,
    caller: CallerContext,
    payload: Result<Json<SalaryRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, org_unit = %caller.org_unit, "Processing salary computation");

    let request = json_body(payload, correlation_id)?;
    let period = request
        .period()
        .map_err(failed(correlation_id, "compute salary"))?;
    let outcome = state
        .payroll()
        .compute_and_store(
            caller.org_unit,
            request.employee_id,
            period,
            &request.selection(),
        )
        .map_err(failed(correlation_id, "compute salary"))?;

    info!(
        correlation_id = %correlation_id,
        record_id = outcome.record.id,
        net_salary = %outcome.record.net_salary,
        created = outcome.created,
        "Salary computation completed"
    );
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

async fn recompute_salary(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<SalaryUpdateRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_id(id, correlation_id)?;
    let request = json_body(payload, correlation_id)?;
    let period = request
        .period
        .as_deref()
        .map(str::parse::<Period>)
        .transpose()
        .map_err(failed(correlation_id, "recompute salary"))?;

    let update = SalaryUpdate {
        employee_id: request.employee_id,
        period,
        subsidy_ids: request.subsidy_ids,
        discount_ids: request.discount_ids,
    };
    let record = state
        .payroll()
        .update_and_recompute(caller.org_unit, id, update)
        .map_err(failed(correlation_id, "recompute salary"))?;
    Ok(Json(record))
}

async fn delete_salary(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_id(id, correlation_id)?;
    state
        .payroll()
        .delete(caller.org_unit, id)
        .map_err(failed(correlation_id, "delete salary"))?;
    Ok(Json(Confirmation::new("Salary record deleted")))
}

async fn salary_detail(
    State(state): State<AppState>,
    caller: CallerContext,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_id(id, correlation_id)?;
    let detail = state
        .payroll()
        .detailed(caller.org_unit, id)
        .map_err(failed(correlation_id, "salary detail"))?;
    Ok(Json(detail))
}
