use derive_more::{Display, Into};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::Error;
use crate::validator::is_valid_item_id;

/// Catalog item identifier taken from a deep link.
///
/// Guaranteed to pass [`is_valid_item_id`] by construction.
/// Use `"ABC123".parse::<ItemId>()` or `ItemId::try_from(string)` to create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Into)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for ItemId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for ItemId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if is_valid_item_id(&s) {
            Ok(Self(s))
        } else {
            Err(Error::InvalidItemId(s))
        }
    }
}

/// Screen the navigator currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Route {
    pub name: String,
}

impl Route {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Parameters handed to the item-details screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct RouteParams {
    pub item_id: ItemId,
}

impl RouteParams {
    #[must_use]
    pub fn new(item_id: ItemId) -> Self {
        Self { item_id }
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Error,
    Info,
}

/// A deep link held back until the user signs in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct DeepLinkIntent {
    /// Link exactly as delivered.
    pub raw_url: String,
    pub item_id: ItemId,
    /// Capture time; the TTL counts from here.
    pub created_at: Instant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_item_id() {
        assert!("ABC123".parse::<ItemId>().is_ok());
        assert!("product-123".parse::<ItemId>().is_ok());
        assert!("item_456".parse::<ItemId>().is_ok());
    }

    #[test]
    fn invalid_item_id_keeps_input() {
        assert_eq!(
            "null".parse::<ItemId>(),
            Err(Error::InvalidItemId("null".into()))
        );
    }

    #[test]
    fn item_id_serde_roundtrip() {
        let id: ItemId = "ABC123".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ABC123\"");
        let parsed: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn item_id_deserialize_rejects_malformed() {
        assert!(serde_json::from_str::<ItemId>("\"<script>\"").is_err());
        assert!(serde_json::from_str::<ItemId>("\"0000\"").is_err());
    }

    #[test]
    fn route_params_use_camel_case() {
        let params = RouteParams::new("ABC123".parse().unwrap());
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({ "itemId": "ABC123" }));
    }

    #[test]
    fn item_id_into_string() {
        let id: ItemId = "item_456".parse().unwrap();
        let s: String = id.clone().into();
        assert_eq!(s, "item_456");
        assert_eq!(id.to_string(), "item_456");
    }
}
