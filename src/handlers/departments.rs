use axum::extract::State;

use crate::database::models::department::{Department, NewDepartment};
use crate::response::{ApiResponse, ApiResult};
use crate::services::department_service::DepartmentService;
use crate::state::AppState;

/// GET /api/departments - List departments by name.
pub async fn department_list(State(state): State<AppState>) -> ApiResult<Vec<Department>> {
    let service = DepartmentService::new(state.pool.clone());
    let departments = service.list().await?;
    Ok(ApiResponse::success(departments))
}

/// POST /api/departments - Create a department.
pub async fn department_create(
    State(state): State<AppState>,
    axum::Json(input): axum::Json<NewDepartment>,
) -> ApiResult<Department> {
    let service = DepartmentService::new(state.pool.clone());
    let department = service.create(input).await?;
    Ok(ApiResponse::created(department))
}
