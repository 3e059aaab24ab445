#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid item id: {0:?}")]
    InvalidItemId(String),
    #[error("Navigation error: {0}")]
    Navigation(String),
}

/// Why an incoming link did not produce a navigation.
///
/// None of these cross the public API as errors; the router reports them
/// through [`Resolution`](crate::Resolution) and only the user-visible ones
/// reach the [`Notifier`](crate::Notifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Rejection {
    /// URL does not start with the configured origin.
    NotThisApp,
    /// Right origin, but the path is not `api/products/:id`.
    WrongShape,
    /// Right shape, but the id failed the allow-list. Never cached.
    MalformedId,
    /// Valid link with no session. Classification only: the router reports
    /// this case as [`Resolution::Deferred`](crate::Resolution::Deferred).
    AuthRequired,
    /// Navigator not mounted yet. Classification only: the router retries
    /// and never returns it.
    NavigatorNotReady,
    /// Pending intent outlived its TTL.
    Expired,
    /// URL already dispatched in this session.
    Duplicate,
    /// Navigator call failed or did not land on the target route.
    DispatchFailure,
}

impl Rejection {
    /// Whether this outcome is ever shown to the user.
    #[must_use]
    pub fn is_user_visible(self) -> bool {
        matches!(self, Self::MalformedId | Self::AuthRequired)
    }
}
