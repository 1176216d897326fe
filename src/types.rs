//! Shared request and column types used across the codebase.

use serde::{Deserialize, Deserializer, Serialize};

/// A single field in a PATCH body. Distinguishes a field that was absent
/// from one that was explicitly set to null, which plain `Option` cannot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field did not appear in the request body.
    Missing,
    /// Field was present with an explicit null.
    Null,
    /// Field was present with a value.
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    /// Outer `Some` means the field was present; inner `Option` is the
    /// requested value, with `None` for an explicit null.
    pub fn into_request(self) -> Option<Option<T>> {
        match self {
            Patch::Missing => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }

    /// The value itself, treating both absent and null as nothing.
    pub fn into_value(self) -> Option<T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Resolve against the stored value for a NOT NULL column. An explicit
    /// null is a validation failure reported with the field name.
    pub fn resolve_required(self, current: T, field: &str) -> Result<T, String> {
        match self {
            Patch::Missing => Ok(current),
            Patch::Null => Err(format!("Field '{}' may not be null", field)),
            Patch::Value(v) => Ok(v),
        }
    }

    /// Resolve against the stored value for a nullable column.
    pub fn resolve_nullable(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Missing => current,
            Patch::Null => None,
            Patch::Value(v) => Some(v),
        }
    }
}

// Deserialization only ever sees present fields; `Missing` comes from
// `#[serde(default)]` on the containing struct.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|opt| match opt {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// Lifecycle state of a registry asset, stored as TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    InUse,
    #[default]
    InStorage,
    Repair,
    Retired,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::InUse => "IN_USE",
            AssetStatus::InStorage => "IN_STORAGE",
            AssetStatus::Repair => "REPAIR",
            AssetStatus::Retired => "RETIRED",
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid status value: {0}")]
pub struct ParseStatusError(String);

impl std::str::FromStr for AssetStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_USE" => Ok(AssetStatus::InUse),
            "IN_STORAGE" => Ok(AssetStatus::InStorage),
            "REPAIR" => Ok(AssetStatus::Repair),
            "RETIRED" => Ok(AssetStatus::Retired),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

// Lets sqlx decode the TEXT column straight into the enum on FromRow.
impl TryFrom<String> for AssetStatus {
    type Error = ParseStatusError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Sort direction for the ledger read endpoints. Defaults to newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid sort value. Use 'asc' or 'desc'.")]
pub struct ParseSortError;

impl std::str::FromStr for SortOrder {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ParseSortError),
        }
    }
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Payload {
        #[serde(default)]
        holder: Patch<i64>,
    }

    #[test]
    fn patch_distinguishes_missing_null_and_value() {
        let absent: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.holder, Patch::Missing);

        let null: Payload = serde_json::from_str(r#"{"holder": null}"#).unwrap();
        assert_eq!(null.holder, Patch::Null);

        let value: Payload = serde_json::from_str(r#"{"holder": 7}"#).unwrap();
        assert_eq!(value.holder, Patch::Value(7));
    }

    #[test]
    fn patch_resolves_required_fields() {
        assert_eq!(Patch::Missing.resolve_required(5, "n"), Ok(5));
        assert_eq!(Patch::Value(9).resolve_required(5, "n"), Ok(9));
        assert!(Patch::<i64>::Null.resolve_required(5, "n").is_err());
    }

    #[test]
    fn patch_resolves_nullable_fields() {
        assert_eq!(Patch::Missing.resolve_nullable(Some(5)), Some(5));
        assert_eq!(Patch::<i64>::Null.resolve_nullable(Some(5)), None);
        assert_eq!(Patch::Value(9).resolve_nullable(None), Some(9));
    }

    #[test]
    fn status_round_trips_wire_values() {
        for raw in ["IN_USE", "IN_STORAGE", "REPAIR", "RETIRED"] {
            let status: AssetStatus = raw.parse().unwrap();
            assert_eq!(status.as_str(), raw);
        }
        assert!("in_use".parse::<AssetStatus>().is_err());
        assert_eq!(AssetStatus::default(), AssetStatus::InStorage);
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&AssetStatus::InUse).unwrap();
        assert_eq!(json, "\"IN_USE\"");
        let back: AssetStatus = serde_json::from_str("\"RETIRED\"").unwrap();
        assert_eq!(back, AssetStatus::Retired);
    }

    #[test]
    fn sort_order_accepts_only_asc_and_desc() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        let err = "newest".parse::<SortOrder>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid sort value. Use 'asc' or 'desc'.");
    }
}
