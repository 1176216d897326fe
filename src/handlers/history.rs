use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::Uri;
use serde::Deserialize;
use serde_json::Value;

use crate::cache::CacheScope;
use crate::database::models::history::HistoryEntry;
use crate::error::ApiError;
use crate::response::{ApiResponse, ApiResult};
use crate::services::history_service::HistoryService;
use crate::state::AppState;
use crate::types::SortOrder;

use super::assets::{request_key, to_payload};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// "asc" or "desc" by change date. Defaults to newest first.
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Partial match on the asset name.
    pub search: Option<String>,
    pub sort: Option<String>,
}

/// GET /api/assets/:id/history - Reassignment entries for one asset.
pub async fn asset_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<HistoryEntry>> {
    let sort = parse_sort(query.sort.as_deref())?;
    let service = HistoryService::new(state.pool.clone());
    let entries = service.list_for_asset(id, sort).await?;
    Ok(ApiResponse::success(entries))
}

/// GET /api/assets-history - The cross-asset reassignment feed. Cached per
/// path-and-query until the next ledger write.
pub async fn history_feed(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Value> {
    let sort = parse_sort(query.sort.as_deref())?;

    let key = state
        .cache
        .response_key(CacheScope::AssetHistory, request_key(&uri));
    if let Some(hit) = state.cache.lookup(&key).await {
        return Ok(ApiResponse::success(hit));
    }

    let service = HistoryService::new(state.pool.clone());
    let entries = service.list_all(query.search.as_deref(), sort).await?;

    let payload = to_payload(&entries)?;
    state.cache.store(&key, &payload).await;
    Ok(ApiResponse::success(payload))
}

fn parse_sort(raw: Option<&str>) -> Result<SortOrder, ApiError> {
    raw.map(SortOrder::from_str)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))
        .map(Option::unwrap_or_default)
}
