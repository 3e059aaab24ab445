//! Deep-link resolution controller.
//!
//! Every incoming URL and every authentication change goes through
//! [`DeepLinkRouter`], which decides whether to navigate now, defer until
//! login, reject with a notice, or ignore.
//!
//! Evaluation order for a URL:
//! 1. already handled this session: ignore
//! 2. navigator not mounted: re-check every retry interval
//! 3. not `{origin}/api/products/{id}`: ignore
//! 4. id fails the allow-list: "malformed link" notice, nothing cached
//! 5. not signed in: becomes the pending intent, "please log in" notice at
//!    most once per URL and never while logging out
//! 6. signed in: dispatch to the item route

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::LinkConfig;
use crate::error::Rejection;
use crate::gateway::{DispatchOutcome, NavigationGateway};
use crate::ledger::IntentLedger;
use crate::traits::{LinkSource, Navigator, Notifier};
use crate::types::{DeepLinkIntent, ItemId, NoticeKind, RouteParams};
use crate::validator::match_item_path;

/// Shown when a catalog link carries an id that fails the allow-list.
pub const MALFORMED_LINK_NOTICE: &str = "This product link is invalid.";
/// Shown once per URL when a valid link arrives without a session.
pub const LOGIN_REQUIRED_NOTICE: &str = "Please log in to view this item.";

/// What the router did with a link.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Resolution {
    /// Navigation was issued. `confirmed` is true when the navigator showed
    /// the item route afterwards. An unconfirmed URL is not kept as handled,
    /// so a redelivered copy dispatches again.
    Dispatched { item_id: ItemId, confirmed: bool },
    /// Held as the pending intent until login.
    Deferred { item_id: ItemId, notified: bool },
    /// Not navigated; see [`Rejection`].
    Rejected(Rejection),
    /// Dropped because `reset`/`on_logout` ran while waiting on the navigator.
    Cancelled,
}

/// Whether a URL was just delivered or is being replayed from the pending slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Delivered,
    Pending,
}

#[derive(Debug)]
struct RouterState {
    ledger: IntentLedger,
    authenticated: bool,
    /// Bumped by `reset` and `on_logout`; work started in an older epoch is stale.
    epoch: u64,
    listener: Option<CancellationToken>,
}

struct Inner<N, S> {
    config: LinkConfig,
    gateway: NavigationGateway<N>,
    notifier: S,
    state: Mutex<RouterState>,
}

/// Session-gated deep-link router.
///
/// Cheap to clone; clones share state. Construct one at startup and hand it
/// to both the navigation root and the session layer.
pub struct DeepLinkRouter<N, S> {
    inner: Arc<Inner<N, S>>,
}

// Manual Clone: avoid derive adding `N: Clone, S: Clone` bounds.
impl<N, S> Clone for DeepLinkRouter<N, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Handle to the listener started by [`DeepLinkRouter::initialize`].
///
/// Dropping it leaves the listener running; call [`remove`](Self::remove)
/// or [`DeepLinkRouter::remove_listener`] to stop it.
#[derive(Debug)]
pub struct Subscription {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Stop listening for new URLs. Resolutions already in flight finish.
    pub fn remove(self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }
}

impl<N: Navigator, S: Notifier> DeepLinkRouter<N, S> {
    #[must_use]
    pub fn new(config: LinkConfig, navigator: N, notifier: S) -> Self {
        let gateway =
            NavigationGateway::new(navigator, config.retry_interval, config.confirm_delay);
        let ledger = IntentLedger::new(config.pending_ttl);

        Self {
            inner: Arc::new(Inner {
                config,
                gateway,
                notifier,
                state: Mutex::new(RouterState {
                    ledger,
                    authenticated: false,
                    epoch: 0,
                    listener: None,
                }),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &LinkConfig {
        &self.inner.config
    }

    /// Start listening on `source` with the current session state.
    ///
    /// The launch URL is resolved first, then every delivered URL gets its
    /// own resolution task. Calling this again replaces the previous
    /// listener. Must be called from within a Tokio runtime.
    pub fn initialize<L: LinkSource>(&self, authenticated: bool, source: L) -> Subscription {
        let cancel = CancellationToken::new();
        {
            let mut state = self.state();
            state.authenticated = authenticated;
            if let Some(previous) = state.listener.replace(cancel.clone()) {
                previous.cancel();
            }
        }

        let router = self.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let mut urls = source.subscribe();

            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                initial = source.initial_url() => {
                    if let Some(url) = initial {
                        tracing::debug!(url = %url, "Resolving launch URL");
                        router.spawn_resolution(url);
                    }
                }
            }

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    next = urls.recv() => match next {
                        Some(url) => router.spawn_resolution(url),
                        None => break,
                    },
                }
            }
            tracing::debug!("Deep link listener stopped");
        });

        Subscription { cancel, task }
    }

    /// Stop the listener started by [`initialize`](Self::initialize), if any.
    pub fn remove_listener(&self) {
        if let Some(token) = self.state().listener.take() {
            token.cancel();
        }
    }

    /// Forget everything session-scoped: handled URLs, the pending intent,
    /// and the logging-out flag. Login notices already shown stay suppressed.
    pub fn reset(&self) {
        let mut state = self.state();
        state.ledger.reset();
        state.epoch += 1;
        tracing::debug!("Deep link state reset");
    }

    /// Start of an explicit logout.
    ///
    /// Drops the pending intent, forgets handled URLs and suppresses login
    /// notices until the next successful login.
    pub fn on_logout(&self) {
        let mut state = self.state();
        state.ledger.on_logout();
        state.authenticated = false;
        state.epoch += 1;
        tracing::debug!("Deep link state cleared for logout");
    }

    /// Administrative reset of the "already told the user to log in" set.
    pub fn clear_permanently_handled(&self) {
        self.state().ledger.clear_permanently_handled();
    }

    /// Push a new authentication state.
    ///
    /// On login a still-valid pending intent is dispatched and its
    /// resolution returned; an expired one is dropped silently. On logout
    /// the pending intent is dropped only while a logout is in progress.
    pub async fn update_authentication_state(&self, authenticated: bool) -> Option<Resolution> {
        let url = {
            let mut state = self.state();
            state.authenticated = authenticated;

            if !authenticated {
                if state.ledger.is_logging_out() {
                    state.ledger.clear_pending();
                }
                return None;
            }

            state.ledger.set_logging_out(false);
            let intent = state.ledger.pending()?.clone();
            if !state.ledger.is_pending_valid(Instant::now()) {
                state.ledger.clear_pending();
                tracing::debug!(url = %intent.raw_url, "Pending deep link expired");
                return Some(Resolution::Rejected(Rejection::Expired));
            }
            intent.raw_url
        };

        tracing::info!(url = %url, "Replaying pending deep link after login");
        Some(self.evaluate(&url, Trigger::Pending).await)
    }

    /// Resolve one delivered URL.
    pub async fn handle_url(&self, url: &str) -> Resolution {
        self.evaluate(url, Trigger::Delivered).await
    }

    #[must_use]
    pub fn pending_intent(&self) -> Option<DeepLinkIntent> {
        self.state().ledger.pending().cloned()
    }

    #[must_use]
    pub fn is_handled(&self, url: &str) -> bool {
        self.state().ledger.is_handled(url)
    }

    #[must_use]
    pub fn is_permanently_handled(&self, url: &str) -> bool {
        self.state().ledger.is_permanently_handled(url)
    }

    #[must_use]
    pub fn is_logging_out(&self) -> bool {
        self.state().ledger.is_logging_out()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().authenticated
    }

    fn spawn_resolution(&self, url: String) {
        let router = self.clone();
        tokio::spawn(async move {
            let resolution = router.handle_url(&url).await;
            tracing::debug!(url = %url, ?resolution, "Deep link resolved");
        });
    }

    async fn evaluate(&self, url: &str, trigger: Trigger) -> Resolution {
        let (handled, epoch) = {
            let state = self.state();
            (state.ledger.is_handled(url), state.epoch)
        };
        if handled {
            return self.duplicate(url, trigger);
        }

        if !self.inner.gateway.is_ready() {
            let ready = self
                .inner
                .gateway
                .wait_until_ready(|| self.still_wanted(url, trigger, epoch))
                .await;
            if !ready {
                return self.abandoned(url, trigger, epoch);
            }
        }

        let item_id = match match_item_path(&self.inner.config.origin, url) {
            Ok(raw) => raw,
            Err(rejection) => {
                tracing::debug!(url = %url, ?rejection, "Not a catalog link");
                return Resolution::Rejected(rejection);
            }
        };

        let item_id = match ItemId::try_from(item_id) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Malformed deep link");
                self.inner
                    .notifier
                    .notify(NoticeKind::Error, MALFORMED_LINK_NOTICE);
                return Resolution::Rejected(Rejection::MalformedId);
            }
        };

        {
            let mut state = self.state();

            if state.epoch != epoch {
                return Resolution::Cancelled;
            }

            // Another copy of this URL may have claimed it while we waited.
            if state.ledger.is_handled(url) {
                drop(state);
                return self.duplicate(url, trigger);
            }

            if trigger == Trigger::Pending && !state.ledger.is_pending_valid(Instant::now()) {
                state.ledger.clear_pending();
                tracing::debug!(url = %url, "Pending deep link expired before dispatch");
                return Resolution::Rejected(Rejection::Expired);
            }

            if !state.authenticated {
                let captured_at = match trigger {
                    Trigger::Delivered => Instant::now(),
                    // A replay going back to the slot keeps its original TTL.
                    Trigger::Pending => state
                        .ledger
                        .pending()
                        .filter(|p| p.raw_url == url)
                        .map_or_else(Instant::now, |p| p.created_at),
                };
                let resolution = Self::defer(&mut state, url, item_id, captured_at);
                drop(state);
                if let Resolution::Deferred { notified: true, .. } = resolution {
                    self.inner
                        .notifier
                        .notify(NoticeKind::Info, LOGIN_REQUIRED_NOTICE);
                }
                return resolution;
            }

            state.ledger.remember(url);
            state.ledger.mark_notified(url);
        }

        self.dispatch(url, item_id, epoch).await
    }

    /// Step 5, under the state lock. The caller sends the notice once the
    /// lock is released.
    fn defer(
        state: &mut RouterState,
        url: &str,
        item_id: ItemId,
        captured_at: Instant,
    ) -> Resolution {
        state.ledger.set_pending(url, item_id.clone(), captured_at);

        // Short-circuit: never mark a URL as notified while logging out.
        let notified = !state.ledger.is_logging_out() && state.ledger.mark_notified(url);

        tracing::info!(
            url = %url,
            item_id = %item_id,
            notified,
            "Deep link deferred until login"
        );
        Resolution::Deferred { item_id, notified }
    }

    async fn dispatch(&self, url: &str, item_id: ItemId, epoch: u64) -> Resolution {
        let params = RouteParams::new(item_id.clone());
        let route = self.inner.config.item_route.as_str();

        tracing::info!(url = %url, item_id = %item_id, route, "Dispatching deep link");

        let outcome = self
            .inner
            .gateway
            .dispatch(route, &params, || self.state().epoch == epoch)
            .await;

        let mut state = self.state();
        match outcome {
            DispatchOutcome::Confirmed => {
                if state.epoch == epoch {
                    state.ledger.clear_pending();
                }
                Resolution::Dispatched {
                    item_id,
                    confirmed: true,
                }
            }
            DispatchOutcome::Unconfirmed => {
                // Leave the intent retryable on the next login or redelivery.
                state.ledger.forget(url);
                Resolution::Dispatched {
                    item_id,
                    confirmed: false,
                }
            }
            DispatchOutcome::Failed => {
                state.ledger.forget(url);
                Resolution::Rejected(Rejection::DispatchFailure)
            }
            DispatchOutcome::Abandoned => Resolution::Cancelled,
        }
    }

    fn still_wanted(&self, url: &str, trigger: Trigger, epoch: u64) -> bool {
        let state = self.state();
        if state.epoch != epoch || state.ledger.is_handled(url) {
            return false;
        }
        match trigger {
            Trigger::Delivered => true,
            Trigger::Pending => {
                state.ledger.pending().is_some_and(|p| p.raw_url == url)
                    && state.ledger.is_pending_valid(Instant::now())
            }
        }
    }

    fn abandoned(&self, url: &str, trigger: Trigger, epoch: u64) -> Resolution {
        let mut state = self.state();
        if state.epoch != epoch {
            return Resolution::Cancelled;
        }
        if state.ledger.is_handled(url) {
            drop(state);
            return self.duplicate(url, trigger);
        }

        // Only a pending replay reaches here: the slot either expired or now
        // holds a newer link.
        if !state.ledger.pending().is_some_and(|p| p.raw_url == url) {
            tracing::debug!(url = %url, "Pending deep link superseded");
            return Resolution::Cancelled;
        }
        state.ledger.clear_pending();
        tracing::debug!(url = %url, "Pending deep link expired while navigator was not ready");
        Resolution::Rejected(Rejection::Expired)
    }

    fn duplicate(&self, url: &str, trigger: Trigger) -> Resolution {
        if trigger == Trigger::Pending {
            let mut state = self.state();
            if state.ledger.pending().is_some_and(|p| p.raw_url == url) {
                state.ledger.clear_pending();
            }
        }
        tracing::debug!(url = %url, "Deep link already handled");
        Resolution::Rejected(Rejection::Duplicate)
    }

    fn state(&self) -> MutexGuard<'_, RouterState> {
        match self.inner.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
