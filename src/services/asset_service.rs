use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::info;

use crate::cache::{CacheScope, Invalidator};
use crate::database::models::asset::{Asset, AssetDetail, AssetDetailRow, AssetPatch, AssetSummary, NewAsset};
use crate::services::assignment::{self, LedgerAction};
use crate::services::{like_pattern, map_unique_violation, ServiceError};
use crate::types::{AssetStatus, Patch};

const DETAIL_SQL: &str = "SELECT a.id, a.name, a.serial_number, a.purchase_date, a.status, a.description, \
     c.id AS category_id, c.name AS category_name, \
     e.id AS holder_id, e.first_name AS holder_first_name, \
     e.last_name AS holder_last_name, e.email AS holder_email \
     FROM assets a \
     LEFT JOIN categories c ON c.id = a.category_id \
     LEFT JOIN employees e ON e.id = a.assigned_to \
     WHERE a.id = $1";

#[derive(Debug, Default, Clone)]
pub struct AssetListFilter {
    /// Case-insensitive match on the category name.
    pub category: Option<String>,
    pub status: Option<AssetStatus>,
    /// Partial match across name, serial number and description.
    pub search: Option<String>,
}

/// Registry writes and reads. Every write runs in a single transaction that
/// also carries its ledger consequence; the matching cache scopes are purged
/// after commit.
pub struct AssetService {
    pool: PgPool,
    invalidator: Invalidator,
}

impl AssetService {
    pub fn new(pool: PgPool, invalidator: Invalidator) -> Self {
        Self { pool, invalidator }
    }

    pub async fn create(&self, input: NewAsset) -> Result<AssetDetail, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Field 'name' may not be blank".to_string(),
            ));
        }
        if input.serial_number.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Field 'serial_number' may not be blank".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        if self.serial_exists(&mut tx, &input.serial_number).await? {
            return Err(ServiceError::Duplicate(format!(
                "Serial number '{}' is already registered",
                input.serial_number
            )));
        }
        if let Some(category_id) = input.category {
            Self::require_category(&mut tx, category_id).await?;
        }
        if let Some(employee_id) = input.assigned_to {
            Self::require_employee(&mut tx, employee_id).await?;
        }

        let status = input.status.unwrap_or_default();
        let description = input.description.clone().unwrap_or_default();

        let (asset_id,): (i64,) = sqlx::query_as(
            "INSERT INTO assets (name, serial_number, category_id, assigned_to, purchase_date, status, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.serial_number)
        .bind(input.category)
        .bind(input.assigned_to)
        .bind(input.purchase_date)
        .bind(status.as_str())
        .bind(&description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                format!(
                    "Serial number '{}' is already registered",
                    input.serial_number
                ),
            )
        })?;

        let action = assignment::plan_create(input.assigned_to, input.notes.as_deref());
        let ledger_changed = Self::apply_ledger_action(&mut tx, asset_id, &action).await?;

        tx.commit().await?;
        info!("Registered asset {} ({})", asset_id, input.serial_number);

        self.invalidator.invalidate(CacheScope::AssetList).await;
        if ledger_changed {
            self.invalidator.invalidate(CacheScope::AssetHistory).await;
        }

        self.fetch_detail(asset_id).await
    }

    pub async fn update(&self, id: i64, patch: AssetPatch) -> Result<AssetDetail, ServiceError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent updates so each holder diff sees
        // the previously committed value.
        let current: Asset = sqlx::query_as(
            "SELECT id, name, serial_number, category_id, assigned_to, purchase_date, status, description \
             FROM assets WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Asset not found".to_string()))?;

        if let Patch::Value(category_id) = &patch.category {
            Self::require_category(&mut tx, *category_id).await?;
        }
        if let Patch::Value(employee_id) = &patch.assigned_to {
            Self::require_employee(&mut tx, *employee_id).await?;
        }

        let name = patch
            .name
            .resolve_required(current.name.clone(), "name")
            .map_err(ServiceError::Validation)?;
        if name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Field 'name' may not be blank".to_string(),
            ));
        }
        let purchase_date = patch
            .purchase_date
            .resolve_required(current.purchase_date, "purchase_date")
            .map_err(ServiceError::Validation)?;
        let status = patch
            .status
            .resolve_required(current.status, "status")
            .map_err(ServiceError::Validation)?;
        let description = patch
            .description
            .resolve_required(current.description.clone(), "description")
            .map_err(ServiceError::Validation)?;

        let requested_holder = patch.assigned_to.clone().into_request();
        let assigned_to = patch.assigned_to.resolve_nullable(current.assigned_to);
        let category_id = patch.category.resolve_nullable(current.category_id);
        let note = patch.notes.into_value();

        sqlx::query(
            "UPDATE assets SET name = $2, category_id = $3, assigned_to = $4, \
             purchase_date = $5, status = $6, description = $7 WHERE id = $1",
        )
        .bind(id)
        .bind(&name)
        .bind(category_id)
        .bind(assigned_to)
        .bind(purchase_date)
        .bind(status.as_str())
        .bind(&description)
        .execute(&mut *tx)
        .await?;

        let action = assignment::plan_update(current.assigned_to, requested_holder, note.as_deref());
        let ledger_changed = Self::apply_ledger_action(&mut tx, id, &action).await?;

        tx.commit().await?;

        self.invalidator.invalidate(CacheScope::AssetList).await;
        if ledger_changed {
            self.invalidator.invalidate(CacheScope::AssetHistory).await;
        }

        self.fetch_detail(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("Asset not found".to_string()));
        }
        info!("Deleted asset {}", id);

        // The cascade removed the asset's ledger rows, so both scopes are stale.
        self.invalidator.invalidate(CacheScope::AssetList).await;
        self.invalidator.invalidate(CacheScope::AssetHistory).await;
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<AssetDetail, ServiceError> {
        self.fetch_detail(id).await
    }

    pub async fn list(&self, filter: &AssetListFilter) -> Result<Vec<AssetSummary>, ServiceError> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT a.id, a.name, a.serial_number, c.name AS category, a.status, a.description \
             FROM assets a LEFT JOIN categories c ON c.id = a.category_id WHERE 1=1",
        );
        if let Some(category) = &filter.category {
            query.push(" AND lower(c.name) = lower(");
            query.push_bind(category.clone());
            query.push(")");
        }
        if let Some(status) = filter.status {
            query.push(" AND a.status = ");
            query.push_bind(status.as_str());
        }
        if let Some(term) = &filter.search {
            let pattern = like_pattern(term);
            query.push(" AND (a.name ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR a.serial_number ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR a.description ILIKE ");
            query.push_bind(pattern);
            query.push(")");
        }
        query.push(" ORDER BY a.id DESC");

        let rows = query
            .build_query_as::<AssetSummary>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn fetch_detail(&self, id: i64) -> Result<AssetDetail, ServiceError> {
        let row: AssetDetailRow = sqlx::query_as(DETAIL_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Asset not found".to_string()))?;
        Ok(row.into())
    }

    async fn serial_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        serial_number: &str,
    ) -> Result<bool, ServiceError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM assets WHERE serial_number = $1")
                .bind(serial_number)
                .fetch_one(&mut **tx)
                .await?;
        Ok(count > 0)
    }

    async fn require_category(
        tx: &mut Transaction<'_, Postgres>,
        category_id: i64,
    ) -> Result<(), ServiceError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories WHERE id = $1")
            .bind(category_id)
            .fetch_one(&mut **tx)
            .await?;
        if count == 0 {
            return Err(ServiceError::NotFound(
                "Category does not exist".to_string(),
            ));
        }
        Ok(())
    }

    async fn require_employee(
        tx: &mut Transaction<'_, Postgres>,
        employee_id: i64,
    ) -> Result<(), ServiceError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM employees WHERE id = $1")
            .bind(employee_id)
            .fetch_one(&mut **tx)
            .await?;
        if count == 0 {
            return Err(ServiceError::NotFound(
                "Assigned user does not exist".to_string(),
            ));
        }
        Ok(())
    }

    /// Execute a planned ledger action inside the write transaction.
    /// Returns whether the ledger actually changed.
    async fn apply_ledger_action(
        tx: &mut Transaction<'_, Postgres>,
        asset_id: i64,
        action: &LedgerAction,
    ) -> Result<bool, ServiceError> {
        match action {
            LedgerAction::None => Ok(false),
            LedgerAction::Append { previous, new, note } => {
                sqlx::query(
                    "INSERT INTO asset_history (asset_id, previous_user, new_user, notes) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(asset_id)
                .bind(previous)
                .bind(new)
                .bind(note)
                .execute(&mut **tx)
                .await?;
                Ok(true)
            }
            LedgerAction::AmendLatestNote(note) => {
                // Rewrites the newest entry only; a bare note on an asset
                // with no history is dropped without error.
                let result = sqlx::query(
                    "UPDATE asset_history SET notes = $2 \
                     WHERE id = (SELECT id FROM asset_history WHERE asset_id = $1 \
                                 ORDER BY change_date DESC, id DESC LIMIT 1)",
                )
                .bind(asset_id)
                .bind(note)
                .execute(&mut **tx)
                .await?;
                Ok(result.rows_affected() > 0)
            }
        }
    }
}
