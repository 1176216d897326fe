use axum::extract::{Path, Query, State};
use axum::http::Uri;
use serde::Deserialize;
use serde_json::Value;

use crate::cache::CacheScope;
use crate::database::models::employee::{Employee, EmployeeDetail, NewEmployee};
use crate::response::{ApiResponse, ApiResult};
use crate::services::employee_service::{EmployeeListFilter, EmployeeService};
use crate::state::AppState;

use super::assets::{request_key, to_payload};

#[derive(Debug, Deserialize)]
pub struct EmployeeListQuery {
    /// Filter by department name, case-insensitive.
    pub department: Option<String>,
    /// Partial match on the job title.
    pub position: Option<String>,
    /// Partial match on username or email.
    pub search: Option<String>,
}

/// GET /api/employees - List employees, newest first. Cached per
/// path-and-query until the next employee write.
pub async fn employee_list(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<EmployeeListQuery>,
) -> ApiResult<Value> {
    let key = state
        .cache
        .response_key(CacheScope::EmployeeList, request_key(&uri));
    if let Some(hit) = state.cache.lookup(&key).await {
        return Ok(ApiResponse::success(hit));
    }

    let filter = EmployeeListFilter {
        department: query.department,
        position: query.position,
        search: query.search,
    };
    let service = EmployeeService::new(state.pool.clone(), state.invalidator());
    let employees = service.list(&filter).await?;

    let payload = to_payload(&employees)?;
    state.cache.store(&key, &payload).await;
    Ok(ApiResponse::success(payload))
}

/// POST /api/employees - Create an employee. Department and position are
/// required; the department must already exist.
pub async fn employee_create(
    State(state): State<AppState>,
    axum::Json(input): axum::Json<NewEmployee>,
) -> ApiResult<Employee> {
    let service = EmployeeService::new(state.pool.clone(), state.invalidator());
    let employee = service.create(input).await?;
    Ok(ApiResponse::created(employee))
}

/// GET /api/employees/:id - Fetch one employee and the assets they hold.
pub async fn employee_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<EmployeeDetail> {
    let service = EmployeeService::new(state.pool.clone(), state.invalidator());
    let employee = service.get(id).await?;
    Ok(ApiResponse::success(employee))
}
