use axum::extract::State;

use crate::database::models::category::{Category, NewCategory};
use crate::response::{ApiResponse, ApiResult};
use crate::services::category_service::CategoryService;
use crate::state::AppState;

/// GET /api/categories - List categories by name.
pub async fn category_list(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let service = CategoryService::new(state.pool.clone());
    let categories = service.list().await?;
    Ok(ApiResponse::success(categories))
}

/// POST /api/categories - Create a category.
pub async fn category_create(
    State(state): State<AppState>,
    axum::Json(input): axum::Json<NewCategory>,
) -> ApiResult<Category> {
    let service = CategoryService::new(state.pool.clone());
    let category = service.create(input).await?;
    Ok(ApiResponse::created(category))
}
