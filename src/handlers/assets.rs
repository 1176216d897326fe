use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::Uri;
use serde::Deserialize;
use serde_json::Value;

use crate::cache::CacheScope;
use crate::database::models::asset::{AssetDetail, AssetPatch, NewAsset};
use crate::error::ApiError;
use crate::response::{ApiResponse, ApiResult};
use crate::services::asset_service::{AssetListFilter, AssetService};
use crate::state::AppState;
use crate::types::AssetStatus;

#[derive(Debug, Deserialize)]
pub struct AssetListQuery {
    /// Filter by category name, case-insensitive.
    pub category: Option<String>,
    /// Filter by status code, e.g. IN_USE.
    pub status: Option<String>,
    /// Partial match on name, serial number or description.
    pub search: Option<String>,
}

/// GET /api/assets - List assets, newest first. Responses are cached per
/// path-and-query until the next asset write.
pub async fn asset_list(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<AssetListQuery>,
) -> ApiResult<Value> {
    let status = query
        .status
        .as_deref()
        .map(AssetStatus::from_str)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let key = state
        .cache
        .response_key(CacheScope::AssetList, request_key(&uri));
    if let Some(hit) = state.cache.lookup(&key).await {
        return Ok(ApiResponse::success(hit));
    }

    let filter = AssetListFilter {
        category: query.category,
        status,
        search: query.search,
    };
    let service = AssetService::new(state.pool.clone(), state.invalidator());
    let assets = service.list(&filter).await?;

    let payload = to_payload(&assets)?;
    state.cache.store(&key, &payload).await;
    Ok(ApiResponse::success(payload))
}

/// POST /api/assets - Register an asset. An initial holder lands in the
/// reassignment history as its first entry.
pub async fn asset_create(
    State(state): State<AppState>,
    axum::Json(input): axum::Json<NewAsset>,
) -> ApiResult<AssetDetail> {
    let service = AssetService::new(state.pool.clone(), state.invalidator());
    let asset = service.create(input).await?;
    Ok(ApiResponse::created(asset))
}

/// GET /api/assets/:id - Fetch one asset with its category and current holder.
pub async fn asset_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<AssetDetail> {
    let service = AssetService::new(state.pool.clone(), state.invalidator());
    let asset = service.get(id).await?;
    Ok(ApiResponse::success(asset))
}

/// PATCH /api/assets/:id - Partially update an asset. Changing the holder
/// appends a history entry; a bare note rewrites the latest one.
pub async fn asset_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    axum::Json(patch): axum::Json<AssetPatch>,
) -> ApiResult<AssetDetail> {
    let service = AssetService::new(state.pool.clone(), state.invalidator());
    let asset = service.update(id, patch).await?;
    Ok(ApiResponse::success(asset))
}

/// DELETE /api/assets/:id - Remove an asset and its history.
pub async fn asset_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let service = AssetService::new(state.pool.clone(), state.invalidator());
    service.delete(id).await?;
    Ok(ApiResponse::no_content())
}

pub(crate) fn request_key(uri: &Uri) -> &str {
    uri.path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
}

pub(crate) fn to_payload<T: serde::Serialize>(rows: &T) -> Result<Value, ApiError> {
    serde_json::to_value(rows)
        .map_err(|_| ApiError::internal_server_error("Failed to serialize response"))
}
