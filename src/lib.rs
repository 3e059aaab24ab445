#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
mod gateway;
mod ledger;
pub mod mock;
pub mod router;
pub mod share;
pub mod traits;
pub mod types;
pub mod validator;

// Re-exports for convenient access
pub use config::LinkConfig;
pub use error::{Error, Rejection};
pub use ledger::PENDING_INTENT_TTL;
pub use router::{
    DeepLinkRouter, LOGIN_REQUIRED_NOTICE, MALFORMED_LINK_NOTICE, Resolution, Subscription,
};
pub use share::{ShareContent, ShareItem, generate_share_content, generate_share_url};
pub use traits::{LinkSource, Navigator, Notifier};
pub use types::{DeepLinkIntent, ItemId, NoticeKind, Route, RouteParams};
pub use validator::{is_valid_item_id, parse_item_url};
