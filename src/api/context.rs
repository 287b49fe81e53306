//! Caller context extraction.
//!
//! Every ledger route is scoped to the org unit of the caller, read from the
//! `x-filial-id` (branch) or `x-sede-id` (headquarters) header.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use tracing::warn;

use crate::models::OrgUnit;

use super::response::ApiErrorResponse;

/// Header carrying the caller's branch id.
pub const BRANCH_HEADER: &str = "x-filial-id";

/// Header carrying the caller's headquarters id.
pub const HEADQUARTERS_HEADER: &str = "x-sede-id";

/// The org unit a request acts on. The branch header wins when both are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
    /// The caller's org unit.
    pub org_unit: OrgUnit,
}

fn header_id(headers: &HeaderMap, name: &str) -> Result<Option<u64>, ApiErrorResponse> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Some)
        .ok_or_else(|| {
            warn!(header = name, "Malformed caller context header");
            ApiErrorResponse::unauthorized(format!("Header '{}' must be a numeric id", name))
        })
}

impl CallerContext {
    /// Resolves the caller's org unit from request headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiErrorResponse> {
        let branch = header_id(headers, BRANCH_HEADER)?;
        let headquarters = header_id(headers, HEADQUARTERS_HEADER)?;

        OrgUnit::resolve(headquarters, branch)
            .map(|org_unit| CallerContext { org_unit })
            .ok_or_else(|| {
                ApiErrorResponse::unauthorized(
                    "Missing caller context: send x-sede-id or x-filial-id",
                )
            })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerContext
where
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}
