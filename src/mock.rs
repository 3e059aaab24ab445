//! In-memory collaborators for tests and demos.
//!
//! Every mock records what it was asked to do so scenarios can assert on
//! dispatches and notices without a UI.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;

use crate::error::Error;
use crate::traits::{LinkSource, Navigator, Notifier};
use crate::types::{NoticeKind, Route, RouteParams};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// A recorded call to [`MockNavigator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    IsReady,
    CurrentRoute,
    Navigate { route: String, params: RouteParams },
}

/// Navigator whose readiness and behavior are set by the test.
///
/// A successful `navigate` makes the target the current route unless a
/// sticky route was configured.
#[derive(Debug, Default)]
pub struct MockNavigator {
    ready: AtomicBool,
    current: Mutex<Option<Route>>,
    sticky_route: Option<String>,
    navigate_error: Mutex<Option<String>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockNavigator {
    pub fn ready() -> Self {
        let nav = Self::default();
        nav.set_ready(true);
        nav
    }

    pub fn not_ready() -> Self {
        Self::default()
    }

    /// Keep `route` on top no matter what is navigated to.
    pub fn with_sticky_route(mut self, route: impl Into<String>) -> Self {
        let route = route.into();
        *lock(&self.current) = Some(Route::new(route.clone()));
        self.sticky_route = Some(route);
        self
    }

    /// Make `navigate` fail with `message`.
    pub fn with_navigate_error(self, message: impl Into<String>) -> Self {
        self.set_navigate_error(Some(message.into()));
        self
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn set_navigate_error(&self, message: Option<String>) {
        *lock(&self.navigate_error) = message;
    }

    /// Return all recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Return every `navigate` call as `(route, params)`, including failed ones.
    pub fn navigations(&self) -> Vec<(String, RouteParams)> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                MockCall::Navigate { route, params } => Some((route.clone(), params.clone())),
                MockCall::IsReady | MockCall::CurrentRoute => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        lock(&self.calls).push(call);
    }
}

impl Navigator for MockNavigator {
    fn is_ready(&self) -> bool {
        self.record(MockCall::IsReady);
        self.ready.load(Ordering::SeqCst)
    }

    fn current_route(&self) -> Option<Route> {
        self.record(MockCall::CurrentRoute);
        lock(&self.current).clone()
    }

    fn navigate(
        &self,
        route: &str,
        params: &RouteParams,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.record(MockCall::Navigate {
            route: route.to_owned(),
            params: params.clone(),
        });

        if let Some(message) = lock(&self.navigate_error).clone() {
            return Err(Box::new(Error::Navigation(message)));
        }

        if self.sticky_route.is_none() {
            *lock(&self.current) = Some(Route::new(route));
        }
        Ok(())
    }
}

/// Notifier that keeps every notice.
#[derive(Debug, Default)]
pub struct MockNotifier {
    notices: Mutex<Vec<(NoticeKind, String)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        lock(&self.notices).clone()
    }

    pub fn count(&self) -> usize {
        lock(&self.notices).len()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        lock(&self.notices).push((kind, message.to_owned()));
    }
}

/// Link source backed by an unbounded channel.
///
/// Only the first `subscribe` gets the live receiver; later ones get a
/// closed stream.
#[derive(Debug)]
pub struct ChannelLinkSource {
    initial: Option<String>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
}

impl ChannelLinkSource {
    /// Returns the source and the sender used to deliver URLs.
    pub fn new(initial: Option<String>) -> (Self, mpsc::UnboundedSender<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            initial,
            receiver: Mutex::new(Some(rx)),
        };
        (source, tx)
    }
}

impl LinkSource for ChannelLinkSource {
    async fn initial_url(&self) -> Option<String> {
        self.initial.clone()
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<String> {
        lock(&self.receiver).take().unwrap_or_else(|| {
            let (_tx, rx) = mpsc::unbounded_channel();
            rx
        })
    }
}
