use sqlx::PgPool;

use crate::database::models::category::{Category, NewCategory};
use crate::services::{map_unique_violation, ServiceError};

pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Category>, ServiceError> {
        let rows: Vec<Category> =
            sqlx::query_as("SELECT id, name, created_at FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    pub async fn create(&self, input: NewCategory) -> Result<Category, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Field 'name' may not be blank".to_string(),
            ));
        }

        let category: Category = sqlx::query_as(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, format!("Category '{}' already exists", input.name))
        })?;
        Ok(category)
    }
}
