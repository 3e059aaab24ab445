//! Thin wrapper over the app navigator: wait for readiness, push, confirm.

use std::time::Duration;

use crate::traits::Navigator;
use crate::types::RouteParams;

/// Result of one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DispatchOutcome {
    /// Navigator shows the target route after the confirmation delay.
    Confirmed,
    /// Navigation was issued but another route is on top.
    Unconfirmed,
    /// The navigator returned an error.
    Failed,
    /// Readiness wait gave up because the caller no longer wants it.
    Abandoned,
}

pub(crate) struct NavigationGateway<N> {
    navigator: N,
    retry_interval: Duration,
    confirm_delay: Duration,
}

impl<N: Navigator> NavigationGateway<N> {
    pub(crate) fn new(navigator: N, retry_interval: Duration, confirm_delay: Duration) -> Self {
        Self {
            navigator,
            retry_interval,
            confirm_delay,
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.navigator.is_ready()
    }

    /// Polls the navigator every `retry_interval` until it is ready.
    ///
    /// There is no retry cap. `still_wanted` is checked before every probe;
    /// once it returns `false` the wait ends and this returns `false`.
    pub(crate) async fn wait_until_ready(&self, still_wanted: impl Fn() -> bool) -> bool {
        loop {
            if !still_wanted() {
                return false;
            }
            if self.navigator.is_ready() {
                return true;
            }
            tracing::debug!(
                retry_in = ?self.retry_interval,
                "Navigator not ready"
            );
            tokio::time::sleep(self.retry_interval).await;
        }
    }

    /// Waits for readiness, navigates, then checks the route after
    /// `confirm_delay`.
    pub(crate) async fn dispatch(
        &self,
        route: &str,
        params: &RouteParams,
        still_wanted: impl Fn() -> bool,
    ) -> DispatchOutcome {
        if !self.wait_until_ready(&still_wanted).await {
            return DispatchOutcome::Abandoned;
        }

        if let Err(e) = self.navigator.navigate(route, params) {
            tracing::warn!(error = %e, route, item_id = %params.item_id, "Navigation failed");
            return DispatchOutcome::Failed;
        }

        tokio::time::sleep(self.confirm_delay).await;

        match self.navigator.current_route() {
            Some(current) if current.name == route => DispatchOutcome::Confirmed,
            current => {
                tracing::debug!(
                    route,
                    current = current.as_ref().map(|r| r.name.as_str()),
                    "Navigation not confirmed"
                );
                DispatchOutcome::Unconfirmed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::mock::{MockCall, MockNavigator};

    const ROUTE: &str = "ProductDetails";

    fn gateway(nav: &Arc<MockNavigator>) -> NavigationGateway<Arc<MockNavigator>> {
        NavigationGateway::new(
            nav.clone(),
            Duration::from_millis(100),
            Duration::from_millis(100),
        )
    }

    fn params() -> RouteParams {
        RouteParams::new("ABC123".parse().unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_confirmed() {
        let nav = Arc::new(MockNavigator::ready());
        let outcome = gateway(&nav).dispatch(ROUTE, &params(), || true).await;

        assert_eq!(outcome, DispatchOutcome::Confirmed);
        assert_eq!(nav.navigations().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_waits_for_readiness() {
        let nav = Arc::new(MockNavigator::not_ready());
        let gw = gateway(&nav);

        let nav2 = nav.clone();
        let mount = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(350)).await;
            nav2.set_ready(true);
        });

        let start = tokio::time::Instant::now();
        let outcome = gw.dispatch(ROUTE, &params(), || true).await;
        mount.await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Confirmed);
        // 4 probes (0, 100, 200, 300 ms) fail, the 400 ms one succeeds
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(
            nav.calls()
                .iter()
                .filter(|c| matches!(c, MockCall::IsReady))
                .count(),
            5
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_abandoned_when_unwanted() {
        let nav = Arc::new(MockNavigator::not_ready());
        let wanted = AtomicBool::new(true);
        let gw = gateway(&nav);
        let params = params();

        let dispatch = gw.dispatch(ROUTE, &params, || wanted.load(Ordering::SeqCst));
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(250)).await;
            wanted.store(false, Ordering::SeqCst);
        };
        let (outcome, ()) = tokio::join!(dispatch, cancel);

        assert_eq!(outcome, DispatchOutcome::Abandoned);
        assert!(nav.navigations().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_failure_is_swallowed() {
        let nav = Arc::new(MockNavigator::ready().with_navigate_error("stack not mounted"));
        let outcome = gateway(&nav).dispatch(ROUTE, &params(), || true).await;

        assert_eq!(outcome, DispatchOutcome::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_unconfirmed_when_route_differs() {
        let nav = Arc::new(MockNavigator::ready().with_sticky_route("Home"));
        let outcome = gateway(&nav).dispatch(ROUTE, &params(), || true).await;

        assert_eq!(outcome, DispatchOutcome::Unconfirmed);
        assert_eq!(nav.navigations().len(), 1);
    }
}
