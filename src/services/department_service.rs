use sqlx::PgPool;

use crate::database::models::department::{Department, NewDepartment};
use crate::services::{map_unique_violation, ServiceError};

pub struct DepartmentService {
    pool: PgPool,
}

impl DepartmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Department>, ServiceError> {
        let rows: Vec<Department> =
            sqlx::query_as("SELECT id, name, full_name, created_at FROM departments ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    pub async fn create(&self, input: NewDepartment) -> Result<Department, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Field 'name' may not be blank".to_string(),
            ));
        }

        let department: Department = sqlx::query_as(
            "INSERT INTO departments (name, full_name) VALUES ($1, $2) \
             RETURNING id, name, full_name, created_at",
        )
        .bind(&input.name)
        .bind(&input.full_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, format!("Department '{}' already exists", input.name))
        })?;
        Ok(department)
    }
}
