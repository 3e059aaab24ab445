use std::time::Duration;

use url::Url;

use crate::error::Error;
use crate::ledger::PENDING_INTENT_TTL;

const DEFAULT_ITEM_ROUTE: &str = "ProductDetails";
const DEFAULT_APP_NAME: &str = "Market";
const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_CONFIRM_DELAY: Duration = Duration::from_millis(100);

/// Link namespace and timing for the deep-link router.
///
/// The required base URL is a constructor parameter; everything else has a
/// default and can be overridden with `with_*` methods.
///
/// ```rust,ignore
/// use market_links::LinkConfig;
///
/// let config = LinkConfig::new("https://shop.test".parse()?)?
///     .with_item_route("ItemDetails");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct LinkConfig {
    pub(crate) origin: String,
    pub(crate) item_route: String,
    pub(crate) app_name: String,
    pub(crate) retry_interval: Duration,
    pub(crate) confirm_delay: Duration,
    pub(crate) pending_ttl: Duration,
}

impl LinkConfig {
    /// Create a config rooted at `base_url`.
    ///
    /// Only the origin (scheme, host, port) is kept; any path is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is not `http`/`https` or has no host.
    pub fn new(base_url: Url) -> Result<Self, Error> {
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base URL must be http or https, got {}",
                base_url.scheme()
            )));
        }
        if base_url.host_str().is_none() {
            return Err(Error::Config("base URL has no host".into()));
        }

        Ok(Self {
            origin: base_url.origin().ascii_serialization(),
            item_route: DEFAULT_ITEM_ROUTE.into(),
            app_name: DEFAULT_APP_NAME.into(),
            retry_interval: DEFAULT_RETRY_INTERVAL,
            confirm_delay: DEFAULT_CONFIRM_DELAY,
            pending_ttl: PENDING_INTENT_TTL,
        })
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `LINK_BASE_URL`: origin that deep links are served from
    ///
    /// # Optional env vars
    /// - `LINK_ITEM_ROUTE`: navigator route for item details (default `ProductDetails`)
    /// - `LINK_APP_NAME`: name used in share messages (default `Market`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `LINK_BASE_URL` is missing or invalid.
    pub fn from_env() -> Result<Self, Error> {
        let base_url_str = std::env::var("LINK_BASE_URL")
            .map_err(|_| Error::Config("LINK_BASE_URL is required".into()))?;
        let base_url: Url = base_url_str
            .parse()
            .map_err(|e| Error::Config(format!("LINK_BASE_URL: {e}")))?;

        let mut config = Self::new(base_url)?;

        if let Ok(route) = std::env::var("LINK_ITEM_ROUTE") {
            config = config.with_item_route(route);
        }
        if let Ok(name) = std::env::var("LINK_APP_NAME") {
            config = config.with_app_name(name);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_item_route(mut self, route: impl Into<String>) -> Self {
        self.item_route = route.into();
        self
    }

    #[must_use]
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Delay between navigator readiness probes (default 100 ms).
    #[must_use]
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Delay before checking that a navigation landed (default 100 ms).
    #[must_use]
    pub fn with_confirm_delay(mut self, delay: Duration) -> Self {
        self.confirm_delay = delay;
        self
    }

    /// Lifetime of a deferred link (default 5 minutes).
    #[must_use]
    pub fn with_pending_ttl(mut self, ttl: Duration) -> Self {
        self.pending_ttl = ttl;
        self
    }

    /// Origin links must start with, without a trailing slash.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Navigator route that shows a catalog item.
    #[must_use]
    pub fn item_route(&self) -> &str {
        &self.item_route
    }

    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    #[must_use]
    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    #[must_use]
    pub fn confirm_delay(&self) -> Duration {
        self.confirm_delay
    }

    #[must_use]
    pub fn pending_ttl(&self) -> Duration {
        self.pending_ttl
    }
}
