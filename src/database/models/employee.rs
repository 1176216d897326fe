use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::asset::AssetSummary;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Employee {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: Option<i64>,
    pub position: String,
    pub created_at: DateTime<Utc>,
}

/// List shape; `department` is the joined department name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EmployeeSummary {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Option<String>,
    pub position: String,
}

/// Detail shape: the employee plus every asset currently in their hands.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeDetail {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Option<String>,
    pub position: String,
    pub assets: Vec<AssetSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEmployee {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub department: i64,
    pub position: String,
}
