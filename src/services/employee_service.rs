use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use crate::cache::{CacheScope, Invalidator};
use crate::database::models::asset::AssetSummary;
use crate::database::models::employee::{Employee, EmployeeDetail, EmployeeSummary, NewEmployee};
use crate::services::{like_pattern, map_unique_violation, ServiceError};

const SUMMARY_SQL: &str = "SELECT e.id, e.username, e.first_name, e.last_name, e.email, \
     d.name AS department, e.\"position\" \
     FROM employees e LEFT JOIN departments d ON d.id = e.department_id";

#[derive(Debug, Default, Clone)]
pub struct EmployeeListFilter {
    /// Case-insensitive match on the department name.
    pub department: Option<String>,
    /// Partial match on the job title.
    pub position: Option<String>,
    /// Partial match on username or email.
    pub search: Option<String>,
}

pub struct EmployeeService {
    pool: PgPool,
    invalidator: Invalidator,
}

impl EmployeeService {
    pub fn new(pool: PgPool, invalidator: Invalidator) -> Self {
        Self { pool, invalidator }
    }

    pub async fn list(
        &self,
        filter: &EmployeeListFilter,
    ) -> Result<Vec<EmployeeSummary>, ServiceError> {
        let mut query = QueryBuilder::<Postgres>::new(SUMMARY_SQL);
        query.push(" WHERE 1=1");
        if let Some(department) = &filter.department {
            query.push(" AND lower(d.name) = lower(");
            query.push_bind(department.clone());
            query.push(")");
        }
        if let Some(position) = &filter.position {
            query.push(" AND e.\"position\" ILIKE ");
            query.push_bind(like_pattern(position));
        }
        if let Some(term) = &filter.search {
            let pattern = like_pattern(term);
            query.push(" AND (e.username ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR e.email ILIKE ");
            query.push_bind(pattern);
            query.push(")");
        }
        query.push(" ORDER BY e.id DESC");

        let rows = query
            .build_query_as::<EmployeeSummary>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, input: NewEmployee) -> Result<Employee, ServiceError> {
        if input.username.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Field 'username' may not be blank".to_string(),
            ));
        }
        if input.position.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Field 'position' may not be blank".to_string(),
            ));
        }

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM departments WHERE id = $1")
            .bind(input.department)
            .fetch_one(&self.pool)
            .await?;
        if count == 0 {
            return Err(ServiceError::NotFound(
                "Department does not exist".to_string(),
            ));
        }

        let employee: Employee = sqlx::query_as(
            "INSERT INTO employees (username, first_name, last_name, email, department_id, \"position\") \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, username, first_name, last_name, email, department_id, \"position\", created_at",
        )
        .bind(&input.username)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(input.department)
        .bind(&input.position)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                format!("Username '{}' is already taken", input.username),
            )
        })?;

        info!("Created employee {} ({})", employee.id, employee.username);
        self.invalidator.invalidate(CacheScope::EmployeeList).await;
        Ok(employee)
    }

    pub async fn get(&self, id: i64) -> Result<EmployeeDetail, ServiceError> {
        let query = format!("{SUMMARY_SQL} WHERE e.id = $1");
        let summary: EmployeeSummary = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Employee not found".to_string()))?;

        let assets: Vec<AssetSummary> = sqlx::query_as(
            "SELECT a.id, a.name, a.serial_number, c.name AS category, a.status, a.description \
             FROM assets a LEFT JOIN categories c ON c.id = a.category_id \
             WHERE a.assigned_to = $1 ORDER BY a.id DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(EmployeeDetail {
            id: summary.id,
            username: summary.username,
            first_name: summary.first_name,
            last_name: summary.last_name,
            email: summary.email,
            department: summary.department,
            position: summary.position,
            assets,
        })
    }
}
