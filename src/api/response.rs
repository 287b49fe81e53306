//! Response types for the church ledger API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::LedgerError;
use crate::models::AdjustmentKind;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an invalid query string error response.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new("INVALID_QUERY", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response with the given body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    /// A 401 response for requests without a usable caller context.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: ApiError::new("UNAUTHORIZED", message),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

fn not_found(code: &str, message: String) -> ApiErrorResponse {
    ApiErrorResponse {
        status: StatusCode::NOT_FOUND,
        error: ApiError::new(code, message),
    }
}

impl From<LedgerError> for ApiErrorResponse {
    fn from(error: LedgerError) -> Self {
        let message = error.to_string();
        match error {
            LedgerError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            LedgerError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            LedgerError::InvalidField { field, .. } => ApiErrorResponse::bad_request(
                ApiError::with_details("VALIDATION_ERROR", message, format!("field: {}", field)),
            ),
            LedgerError::InvalidPeriod { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("INVALID_PERIOD", message))
            }
            LedgerError::AmountOverflow { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("AMOUNT_OUT_OF_RANGE", message))
            }
            LedgerError::DuplicateCategory { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("DUPLICATE_CATEGORY", message))
            }
            LedgerError::DuplicateSalaryPeriod { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("DUPLICATE_SALARY_PERIOD", message))
            }
            LedgerError::EmployeeInactive { .. } => {
                ApiErrorResponse::bad_request(ApiError::new("EMPLOYEE_INACTIVE", message))
            }
            LedgerError::EmployeeNotFound { .. } => not_found("EMPLOYEE_NOT_FOUND", message),
            LedgerError::SalaryRecordNotFound { .. } => {
                not_found("SALARY_RECORD_NOT_FOUND", message)
            }
            LedgerError::CatalogEntryNotFound { kind, .. } => match kind {
                AdjustmentKind::Subsidy => not_found("SUBSIDY_NOT_FOUND", message),
                AdjustmentKind::Discount => not_found("DISCOUNT_NOT_FOUND", message),
            },
            LedgerError::CategoryNotFound { .. } => not_found("CATEGORY_NOT_FOUND", message),
            LedgerError::ExpenseNotFound { .. } => not_found("EXPENSE_NOT_FOUND", message),
            LedgerError::Storage { message } => {
                error!(error = %message, "Storage failure");
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::new("INTERNAL_ERROR", "Internal server error"),
                }
            }
        }
    }
}

/// Body returned by delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confirmation {
    /// What was done.
    pub message: String,
    /// Expenses left without a category, for category deletes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlinked_expenses: Option<usize>,
}

impl Confirmation {
    /// A confirmation carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            unlinked_expenses: None,
        }
    }
}

/// Body returned by `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always `ok` while the server is serving.
    pub status: String,
    /// Crate version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_not_found_errors_map_to_404() {
        let cases = [
            (LedgerError::EmployeeNotFound { id: 1 }, "EMPLOYEE_NOT_FOUND"),
            (LedgerError::SalaryRecordNotFound { id: 1 }, "SALARY_RECORD_NOT_FOUND"),
            (LedgerError::CategoryNotFound { id: 1 }, "CATEGORY_NOT_FOUND"),
            (LedgerError::ExpenseNotFound { id: 1 }, "EXPENSE_NOT_FOUND"),
            (
                LedgerError::CatalogEntryNotFound {
                    kind: AdjustmentKind::Discount,
                    id: 1,
                },
                "DISCOUNT_NOT_FOUND",
            ),
        ];
        for (error, code) in cases {
            let response: ApiErrorResponse = error.into();
            assert_eq!(response.status, StatusCode::NOT_FOUND);
            assert_eq!(response.error.code, code);
        }
    }

    #[test]
    fn test_validation_errors_map_to_400() {
        let response: ApiErrorResponse = LedgerError::DuplicateCategory {
            name: "Água".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "DUPLICATE_CATEGORY");

        let response: ApiErrorResponse =
            LedgerError::invalid_field("amount", "must be greater than zero").into();
        assert_eq!(response.error.code, "VALIDATION_ERROR");
        assert_eq!(response.error.details.as_deref(), Some("field: amount"));

        let response: ApiErrorResponse = LedgerError::AmountOverflow {
            operation: "net salary".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "AMOUNT_OUT_OF_RANGE");
    }

    #[test]
    fn test_storage_error_hides_details() {
        let response: ApiErrorResponse = LedgerError::Storage {
            message: "lock poisoned".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.message, "Internal server error");
        assert!(response.error.details.is_none());
    }
}
