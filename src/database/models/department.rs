use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
}
