use sqlx::PgPool;
use tracing::info;

use super::manager::DatabaseError;

/// DDL applied at startup and by `devassets init`. Statements are idempotent
/// so repeated runs are safe; executed one at a time because the Postgres
/// extended protocol takes a single statement per query.
const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS departments (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        full_name TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL DEFAULT '',
        last_name TEXT NOT NULL DEFAULT '',
        email TEXT NOT NULL DEFAULT '',
        department_id BIGINT REFERENCES departments(id) ON DELETE SET NULL,
        "position" TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS assets (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        serial_number TEXT NOT NULL UNIQUE,
        category_id BIGINT REFERENCES categories(id) ON DELETE SET NULL,
        assigned_to BIGINT REFERENCES employees(id) ON DELETE SET NULL,
        purchase_date DATE NOT NULL,
        status TEXT NOT NULL DEFAULT 'IN_STORAGE',
        description TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS asset_history (
        id BIGSERIAL PRIMARY KEY,
        asset_id BIGINT NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
        previous_user BIGINT REFERENCES employees(id) ON DELETE SET NULL,
        new_user BIGINT REFERENCES employees(id) ON DELETE SET NULL,
        change_date TIMESTAMPTZ NOT NULL DEFAULT now(),
        notes TEXT NOT NULL DEFAULT ''
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_assets_status ON assets (status)",
    "CREATE INDEX IF NOT EXISTS idx_assets_assigned_to ON assets (assigned_to)",
    "CREATE INDEX IF NOT EXISTS idx_asset_history_asset_id ON asset_history (asset_id)",
    "CREATE INDEX IF NOT EXISTS idx_asset_history_change_date ON asset_history (change_date DESC)",
];

/// Create any missing tables and indexes.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema is up to date");
    Ok(())
}
