use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{AssetStatus, Patch};

/// Registry row as stored.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Asset {
    pub id: i64,
    pub name: String,
    pub serial_number: String,
    pub category_id: Option<i64>,
    pub assigned_to: Option<i64>,
    pub purchase_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: AssetStatus,
    pub description: String,
}

/// Summary shape returned by the list endpoint; `category` is the joined
/// category name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AssetSummary {
    pub id: i64,
    pub name: String,
    pub serial_number: String,
    pub category: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: AssetStatus,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HolderRef {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Detail shape with the category and holder expanded.
#[derive(Debug, Clone, Serialize)]
pub struct AssetDetail {
    pub id: i64,
    pub name: String,
    pub serial_number: String,
    pub category: Option<CategoryRef>,
    pub assigned_to: Option<HolderRef>,
    pub purchase_date: NaiveDate,
    pub status: AssetStatus,
    pub description: String,
}

/// Flat row backing `AssetDetail`, produced by the two LEFT JOINs.
#[derive(Debug, FromRow)]
pub struct AssetDetailRow {
    pub id: i64,
    pub name: String,
    pub serial_number: String,
    pub purchase_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: AssetStatus,
    pub description: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub holder_id: Option<i64>,
    pub holder_first_name: Option<String>,
    pub holder_last_name: Option<String>,
    pub holder_email: Option<String>,
}

impl From<AssetDetailRow> for AssetDetail {
    fn from(row: AssetDetailRow) -> Self {
        let category = match (row.category_id, row.category_name) {
            (Some(id), Some(name)) => Some(CategoryRef { id, name }),
            _ => None,
        };
        let assigned_to = row.holder_id.map(|id| HolderRef {
            id,
            name: full_name(
                row.holder_first_name.as_deref().unwrap_or(""),
                row.holder_last_name.as_deref().unwrap_or(""),
            ),
            email: row.holder_email.unwrap_or_default(),
        });
        AssetDetail {
            id: row.id,
            name: row.name,
            serial_number: row.serial_number,
            category,
            assigned_to,
            purchase_date: row.purchase_date,
            status: row.status,
            description: row.description,
        }
    }
}

/// "first last" with surrounding whitespace trimmed when either part is blank.
pub fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first, last).trim().to_string()
}

/// POST body for registering an asset.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAsset {
    pub name: String,
    pub serial_number: String,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub assigned_to: Option<i64>,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub status: Option<AssetStatus>,
    #[serde(default)]
    pub description: Option<String>,
    /// Optional annotation carried onto the initial ledger entry.
    #[serde(default)]
    pub notes: Option<String>,
}

/// PATCH body. Serial numbers are immutable, so `serial_number` is not a
/// field here and `deny_unknown_fields` rejects attempts to send it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetPatch {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub category: Patch<i64>,
    #[serde(default)]
    pub assigned_to: Patch<i64>,
    #[serde(default)]
    pub purchase_date: Patch<NaiveDate>,
    #[serde(default)]
    pub status: Patch<AssetStatus>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub notes: Patch<String>,
}
