//! Request types for the church ledger API.
//!
//! Bodies and query strings use snake_case names. The names sent by older
//! clients (`startDate`, `tipo`, `FuncionarioId`, `mes_ano`, ...) are accepted
//! as aliases.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::calculation::AdjustmentSelection;
use crate::models::{ExpenseType, Period};
use crate::services::{CatalogInput, CategoryInput, CategoryUpdate, EmployeeInput, ExpenseInput};
use crate::store::LinkChange;

/// Parses an optional query value, treating blank strings as absent.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Distinguishes an absent field from an explicit `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query for `GET /relatorio/despesas` and `GET /categorias/despesas`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseReportQuery {
    /// Inclusive lower bound on the expense date.
    #[serde(default, alias = "startDate", deserialize_with = "blank_as_none")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the expense date.
    #[serde(default, alias = "endDate", deserialize_with = "blank_as_none")]
    pub end_date: Option<NaiveDate>,
    /// Only expenses of this type.
    #[serde(default, alias = "tipo", deserialize_with = "blank_as_none")]
    pub expense_type: Option<ExpenseType>,
}

/// Query for `GET /salarios`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalaryListQuery {
    /// Earliest period, `YYYY-MM`.
    #[serde(default, alias = "startPeriod", deserialize_with = "blank_as_none")]
    pub start_period: Option<Period>,
    /// Latest period, `YYYY-MM`.
    #[serde(default, alias = "endPeriod", deserialize_with = "blank_as_none")]
    pub end_period: Option<Period>,
    /// Only records of this employee.
    #[serde(
        default,
        alias = "FuncionarioId",
        alias = "funcionario_id",
        deserialize_with = "blank_as_none"
    )]
    pub employee_id: Option<u64>,
}

/// Body for `POST /categorias`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    /// Category name.
    #[serde(alias = "nome")]
    pub name: String,
    /// Optional description.
    #[serde(default, alias = "descricao")]
    pub description: Option<String>,
    /// Only honoured on update.
    #[serde(default, alias = "ativo")]
    pub active: Option<bool>,
}

impl CategoryRequest {
    /// Converts into the service's create input.
    pub fn into_input(self) -> CategoryInput {
        CategoryInput {
            name: self.name,
            description: self.description,
        }
    }

    /// Converts into the service's update input.
    pub fn into_update(self) -> CategoryUpdate {
        CategoryUpdate {
            name: self.name,
            description: self.description,
            active: self.active,
        }
    }
}

/// Body for `POST /despesas` and `PUT /despesas/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseRequest {
    /// What was paid for.
    #[serde(alias = "descricao")]
    pub description: String,
    /// Amount, as a string or a number.
    #[serde(alias = "valor")]
    pub amount: Decimal,
    /// Date of the expense, `YYYY-MM-DD`.
    #[serde(alias = "data")]
    pub date: NaiveDate,
    /// `fixed` or `variable`.
    #[serde(alias = "tipo")]
    pub expense_type: ExpenseType,
    /// Optional note.
    #[serde(default, alias = "observacao")]
    pub note: Option<String>,
    /// Absent keeps the link, `null` removes it, a value relinks.
    #[serde(default, alias = "categoria_id", deserialize_with = "present")]
    pub category_id: Option<Option<u64>>,
}

impl ExpenseRequest {
    /// Splits the body into the expense fields and the link change.
    pub fn into_parts(self) -> (ExpenseInput, LinkChange) {
        let link = match self.category_id {
            None => LinkChange::Keep,
            Some(None) => LinkChange::Clear,
            Some(Some(id)) => LinkChange::Set(id),
        };
        let input = ExpenseInput {
            description: self.description,
            amount: self.amount,
            date: self.date,
            expense_type: self.expense_type,
            note: self.note,
        };
        (input, link)
    }
}

/// Body for `POST /funcionarios` and `PUT /funcionarios/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeRequest {
    /// Optional reference to a church member.
    #[serde(default, alias = "membro_id")]
    pub member_ref: Option<u64>,
    /// Monthly base salary.
    #[serde(alias = "salario_base")]
    pub base_salary: Decimal,
    /// Active flag.
    #[serde(default, alias = "ativo")]
    pub active: Option<bool>,
}

impl From<EmployeeRequest> for EmployeeInput {
    fn from(request: EmployeeRequest) -> Self {
        EmployeeInput {
            member_ref: request.member_ref,
            base_salary: request.base_salary,
            active: request.active,
        }
    }
}

/// Body for the subsidy and discount endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRequest {
    /// Display name.
    #[serde(alias = "nome")]
    pub name: String,
    /// Fixed amount.
    #[serde(alias = "valor")]
    pub amount: Decimal,
    /// Active flag.
    #[serde(default, alias = "ativo")]
    pub active: Option<bool>,
}

impl From<CatalogRequest> for CatalogInput {
    fn from(request: CatalogRequest) -> Self {
        CatalogInput {
            name: request.name,
            amount: request.amount,
            active: request.active,
        }
    }
}

/// Body for `POST /salarios`.
///
/// The period is kept as text so a malformed value is reported as
/// `INVALID_PERIOD` rather than a JSON error.
#[derive(Debug, Clone, Deserialize)]
pub struct SalaryRequest {
    /// The employee being paid.
    #[serde(alias = "FuncionarioId", alias = "funcionario_id")]
    pub employee_id: u64,
    /// Month being paid, `YYYY-MM`.
    #[serde(alias = "mes_ano")]
    pub period: String,
    /// Selected subsidy ids.
    #[serde(default, alias = "subsidios")]
    pub subsidy_ids: Vec<u64>,
    /// Selected discount ids.
    #[serde(default, alias = "descontos")]
    pub discount_ids: Vec<u64>,
}

impl SalaryRequest {
    /// Parses the period.
    pub fn period(&self) -> crate::error::LedgerResult<Period> {
        self.period.parse()
    }

    /// The de-duplicated selection.
    pub fn selection(&self) -> AdjustmentSelection {
        AdjustmentSelection::new(
            self.subsidy_ids.iter().copied(),
            self.discount_ids.iter().copied(),
        )
    }
}

/// Body for `PUT /salarios/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct SalaryUpdateRequest {
    /// Moves the record to another employee.
    #[serde(default, alias = "FuncionarioId", alias = "funcionario_id")]
    pub employee_id: Option<u64>,
    /// Moves the record to another month.
    #[serde(default, alias = "mes_ano")]
    pub period: Option<String>,
    /// Replaces the selected subsidies; absent keeps the current ones.
    #[serde(default, alias = "subsidios")]
    pub subsidy_ids: Option<Vec<u64>>,
    /// Replaces the selected discounts; absent keeps the current ones.
    #[serde(default, alias = "descontos")]
    pub discount_ids: Option<Vec<u64>>,
}
