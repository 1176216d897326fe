use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize)]
pub struct AssetRef {
    pub id: i64,
    pub name: String,
    pub serial_number: String,
}

/// Entry shape for the per-asset ledger endpoint. Holders are rendered as
/// full names, with "Unassigned" standing in for a null side.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub previous_user: String,
    pub new_user: String,
    pub change_date: String,
    pub notes: String,
}

/// Entry shape for the global feed, which also carries the parent asset.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryFeedEntry {
    pub id: i64,
    pub asset: AssetRef,
    pub previous_user: String,
    pub new_user: String,
    pub change_date: String,
    pub notes: String,
}

/// Flat row backing both entry shapes; LEFT JOINs keep vacated holder sides
/// as NULLs.
#[derive(Debug, FromRow)]
pub struct HistoryRow {
    pub id: i64,
    pub asset_id: i64,
    pub asset_name: String,
    pub asset_serial: String,
    pub prev_id: Option<i64>,
    pub prev_first_name: Option<String>,
    pub prev_last_name: Option<String>,
    pub new_id: Option<i64>,
    pub new_first_name: Option<String>,
    pub new_last_name: Option<String>,
    pub change_date: DateTime<Utc>,
    pub notes: String,
}

impl HistoryRow {
    fn previous_name(&self) -> String {
        holder_or_unassigned(
            self.prev_id,
            self.prev_first_name.as_deref(),
            self.prev_last_name.as_deref(),
        )
    }

    fn new_name(&self) -> String {
        holder_or_unassigned(
            self.new_id,
            self.new_first_name.as_deref(),
            self.new_last_name.as_deref(),
        )
    }

    fn formatted_date(&self) -> String {
        self.change_date.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn into_entry(self) -> HistoryEntry {
        HistoryEntry {
            id: self.id,
            previous_user: self.previous_name(),
            new_user: self.new_name(),
            change_date: self.formatted_date(),
            notes: self.notes,
        }
    }

    pub fn into_feed_entry(self) -> HistoryFeedEntry {
        let previous_user = self.previous_name();
        let new_user = self.new_name();
        let change_date = self.formatted_date();
        HistoryFeedEntry {
            id: self.id,
            asset: AssetRef {
                id: self.asset_id,
                name: self.asset_name,
                serial_number: self.asset_serial,
            },
            previous_user,
            new_user,
            change_date,
            notes: self.notes,
        }
    }
}

fn holder_or_unassigned(id: Option<i64>, first: Option<&str>, last: Option<&str>) -> String {
    match id {
        Some(_) => super::asset::full_name(first.unwrap_or(""), last.unwrap_or("")),
        None => "Unassigned".to_string(),
    }
}
