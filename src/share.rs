use serde::{Deserialize, Serialize};

use crate::config::LinkConfig;
use crate::types::ItemId;
use crate::validator::ITEM_PATH_SEGMENTS;

/// Item fields the share sheet needs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ShareItem {
    pub id: ItemId,
    pub title: String,
    pub price: Option<String>,
}

impl ShareItem {
    #[must_use]
    pub fn new(id: ItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            price: None,
        }
    }

    /// Set the display price, already formatted (e.g. `"$12.00"`).
    #[must_use]
    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }
}

/// Payload for the platform share sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ShareContent {
    pub title: String,
    pub message: String,
    pub url: String,
}

/// Public link to an item: `{origin}/api/products/{id}`.
///
/// The router resolves exactly the links this produces.
#[must_use]
pub fn generate_share_url(config: &LinkConfig, item_id: &ItemId) -> String {
    format!(
        "{}/{}/{}/{}",
        config.origin(),
        ITEM_PATH_SEGMENTS[0],
        ITEM_PATH_SEGMENTS[1],
        urlencoding::encode(item_id.as_str())
    )
}

#[must_use]
pub fn generate_share_content(config: &LinkConfig, item: &ShareItem) -> ShareContent {
    let url = generate_share_url(config, &item.id);
    let message = match &item.price {
        Some(price) => format!(
            "Check out {} for {price} on {}!\n{url}",
            item.title,
            config.app_name()
        ),
        None => format!("Check out {} on {}!\n{url}", item.title, config.app_name()),
    };

    ShareContent {
        title: item.title.clone(),
        message,
        url,
    }
}
