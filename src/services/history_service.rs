use sqlx::PgPool;

use crate::database::models::history::{HistoryEntry, HistoryFeedEntry, HistoryRow};
use crate::services::{like_pattern, ServiceError};
use crate::types::SortOrder;

const FEED_SQL: &str = "SELECT h.id, h.asset_id, a.name AS asset_name, a.serial_number AS asset_serial, \
     pu.id AS prev_id, pu.first_name AS prev_first_name, pu.last_name AS prev_last_name, \
     nu.id AS new_id, nu.first_name AS new_first_name, nu.last_name AS new_last_name, \
     h.change_date, h.notes \
     FROM asset_history h \
     JOIN assets a ON a.id = h.asset_id \
     LEFT JOIN employees pu ON pu.id = h.previous_user \
     LEFT JOIN employees nu ON nu.id = h.new_user";

/// Read side of the reassignment ledger. Appends happen inside the asset
/// write transaction; this service only renders committed entries.
pub struct HistoryService {
    pool: PgPool,
}

impl HistoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ledger entries for one asset, oldest or newest first.
    pub async fn list_for_asset(
        &self,
        asset_id: i64,
        sort: SortOrder,
    ) -> Result<Vec<HistoryEntry>, ServiceError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM assets WHERE id = $1")
            .bind(asset_id)
            .fetch_one(&self.pool)
            .await?;
        if count == 0 {
            return Err(ServiceError::NotFound("Asset not found".to_string()));
        }

        let dir = sort.sql();
        let query = format!(
            "{FEED_SQL} WHERE h.asset_id = $1 ORDER BY h.change_date {dir}, h.id {dir}"
        );
        let rows: Vec<HistoryRow> = sqlx::query_as(&query)
            .bind(asset_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(HistoryRow::into_entry).collect())
    }

    /// The cross-asset feed, optionally narrowed by asset name.
    pub async fn list_all(
        &self,
        search: Option<&str>,
        sort: SortOrder,
    ) -> Result<Vec<HistoryFeedEntry>, ServiceError> {
        let dir = sort.sql();
        let rows: Vec<HistoryRow> = match search {
            Some(term) => {
                let query = format!(
                    "{FEED_SQL} WHERE a.name ILIKE $1 ORDER BY h.change_date {dir}, h.id {dir}"
                );
                sqlx::query_as(&query)
                    .bind(like_pattern(term))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("{FEED_SQL} ORDER BY h.change_date {dir}, h.id {dir}");
                sqlx::query_as(&query).fetch_all(&self.pool).await?
            }
        };
        Ok(rows.into_iter().map(HistoryRow::into_feed_entry).collect())
    }
}
