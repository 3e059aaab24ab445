//! Which links were handled, which were already announced, and the single
//! pending intent.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;

use crate::types::{DeepLinkIntent, ItemId};

/// How long a deferred link stays eligible for dispatch after login.
pub const PENDING_INTENT_TTL: Duration = Duration::from_secs(5 * 60);

/// Bookkeeping owned by the router.
///
/// `handled` is session-scoped de-duplication and is cleared by
/// [`reset`](Self::reset) and [`on_logout`](Self::on_logout).
/// `permanently_handled` only suppresses repeated login notices and survives
/// both; [`clear_permanently_handled`](Self::clear_permanently_handled) is
/// the only way to empty it.
#[derive(Debug)]
pub(crate) struct IntentLedger {
    ttl: Duration,
    handled: HashSet<String>,
    permanently_handled: HashSet<String>,
    pending: Option<DeepLinkIntent>,
    logging_out: bool,
}

impl IntentLedger {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            handled: HashSet::new(),
            permanently_handled: HashSet::new(),
            pending: None,
            logging_out: false,
        }
    }

    pub(crate) fn remember(&mut self, url: &str) {
        self.handled.insert(url.to_owned());
    }

    /// Makes `url` dispatchable again after a navigation that did not land.
    pub(crate) fn forget(&mut self, url: &str) {
        self.handled.remove(url);
    }

    pub(crate) fn is_handled(&self, url: &str) -> bool {
        self.handled.contains(url)
    }

    /// Records that the login notice was shown for `url`.
    /// Returns `false` if it already had been.
    pub(crate) fn mark_notified(&mut self, url: &str) -> bool {
        self.permanently_handled.insert(url.to_owned())
    }

    pub(crate) fn is_permanently_handled(&self, url: &str) -> bool {
        self.permanently_handled.contains(url)
    }

    pub(crate) fn clear_permanently_handled(&mut self) {
        self.permanently_handled.clear();
    }

    /// Last link wins: any earlier pending intent is dropped.
    pub(crate) fn set_pending(&mut self, url: &str, item_id: ItemId, created_at: Instant) {
        self.pending = Some(DeepLinkIntent {
            raw_url: url.to_owned(),
            item_id,
            created_at,
        });
    }

    pub(crate) fn pending(&self) -> Option<&DeepLinkIntent> {
        self.pending.as_ref()
    }

    pub(crate) fn is_pending_valid(&self, now: Instant) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|intent| now.saturating_duration_since(intent.created_at) < self.ttl)
    }

    pub(crate) fn clear_pending(&mut self) {
        self.pending = None;
    }

    pub(crate) fn is_logging_out(&self) -> bool {
        self.logging_out
    }

    pub(crate) fn set_logging_out(&mut self, logging_out: bool) {
        self.logging_out = logging_out;
    }

    pub(crate) fn reset(&mut self) {
        self.handled.clear();
        self.pending = None;
        self.logging_out = false;
    }

    pub(crate) fn on_logout(&mut self) {
        self.pending = None;
        self.logging_out = true;
        self.handled.clear();
    }
}
