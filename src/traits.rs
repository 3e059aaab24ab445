use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::types::{NoticeKind, Route, RouteParams};

/// App-provided screen navigator.
///
/// Mirrors the navigation container of the UI layer. Calls are cheap and
/// synchronous; the router polls [`is_ready`](Self::is_ready) and reads
/// [`current_route`](Self::current_route) after each dispatch to confirm it
/// landed.
///
/// # Example
///
/// ```rust,ignore
/// impl Navigator for AppNavigation {
///     fn is_ready(&self) -> bool {
///         self.container.is_mounted()
///     }
///
///     fn current_route(&self) -> Option<Route> {
///         self.container.top().map(|screen| Route::new(screen.name()))
///     }
///
///     fn navigate(&self, route: &str, params: &RouteParams) -> Result<(), ...> {
///         self.container.push(route, params)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Navigator: Send + Sync + 'static {
    /// Whether the navigation tree is mounted and accepts commands.
    fn is_ready(&self) -> bool;

    /// Route currently on top, if any.
    fn current_route(&self) -> Option<Route>;

    /// Push `route` with `params`.
    ///
    /// Errors are logged by the router and never propagated.
    fn navigate(
        &self,
        route: &str,
        params: &RouteParams,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// App-provided toast/notice presenter. Fire-and-forget.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// Where deep links come from: the URL that launched the app, and a stream
/// of URLs opened while it runs.
pub trait LinkSource: Send + Sync + 'static {
    /// URL the process was launched with, if any. Queried once at startup.
    fn initial_url(&self) -> impl Future<Output = Option<String>> + Send;

    /// Subscribe to URLs delivered while the app runs.
    ///
    /// The stream ends when the sender side is dropped.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<String>;
}

impl<T: Navigator> Navigator for Arc<T> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn current_route(&self) -> Option<Route> {
        (**self).current_route()
    }

    fn navigate(
        &self,
        route: &str,
        params: &RouteParams,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).navigate(route, params)
    }
}

impl<T: Notifier> Notifier for Arc<T> {
    fn notify(&self, kind: NoticeKind, message: &str) {
        (**self).notify(kind, message);
    }
}
