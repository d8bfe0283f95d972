//! Client-side session cache.
//!
//! Each front-end keeps one [`SessionCache`]. Before a protected page renders,
//! [`SessionCache::intercept`] decides from token presence alone, so a
//! signed-out user never sees protected content. After render,
//! [`SessionCache::revalidate`] asks the API whether the token still holds.
//!
//! The server is the authority on whether a token is valid; the cache is
//! the authority on whether the UI shows the user as signed in.

use async_trait::async_trait;
use tradepost_core::{
    AccessDecision, NavigationDecision, Policy, Portal, RouteAccess, SessionDescriptor,
    SessionToken, Storage, StorageError,
};

use crate::api::{ApiClient, LoginResult, SessionCheck};
use crate::error::ClientError;

/// One portal's cached token over a [`Storage`] backend.
#[derive(Debug, Clone)]
pub struct TokenStore<S> {
    portal: Portal,
    storage: S,
}

impl<S: Storage> TokenStore<S> {
    #[must_use]
    pub const fn new(portal: Portal, storage: S) -> Self {
        Self { portal, storage }
    }

    #[must_use]
    pub const fn portal(&self) -> Portal {
        self.portal
    }

    /// The cached token. An unreadable entry reads as no token.
    #[must_use]
    pub fn load(&self) -> Option<SessionToken> {
        match self.storage.load(self.portal.token_storage_key()) {
            Ok(token) => token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .map(SessionToken::new),
            Err(e) => {
                tracing::warn!(portal = %self.portal, error = %e, "Failed to read cached token");
                None
            }
        }
    }

    /// Cache `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn save(&self, token: &SessionToken) -> Result<(), StorageError> {
        self.storage
            .save(self.portal.token_storage_key(), token.as_str())
    }

    /// Forget the cached token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.delete(self.portal.token_storage_key())
    }
}

/// The session endpoints the cache talks to.
#[async_trait]
pub trait SessionEndpoint: Send + Sync {
    /// Exchange credentials for a token.
    async fn login(
        &self,
        email: &str,
        password: &str,
        portal: Portal,
    ) -> Result<LoginResult, ClientError>;

    /// Check a token against the server.
    async fn validate_session(&self, token: &SessionToken) -> Result<SessionCheck, ClientError>;

    /// Revoke a token on the server.
    async fn logout(&self, token: &SessionToken) -> Result<(), ClientError>;
}

#[async_trait]
impl SessionEndpoint for ApiClient {
    async fn login(
        &self,
        email: &str,
        password: &str,
        portal: Portal,
    ) -> Result<LoginResult, ClientError> {
        Self::login(self, email, password, portal).await
    }

    async fn validate_session(&self, token: &SessionToken) -> Result<SessionCheck, ClientError> {
        Self::validate_session(self, token).await
    }

    async fn logout(&self, token: &SessionToken) -> Result<(), ClientError> {
        Self::logout(self, token).await
    }
}

/// Performs navigation on behalf of the cache.
pub trait Navigator: Send + Sync {
    /// Navigate to `path`.
    fn navigate(&self, path: &str);
}

/// Outcome of [`SessionCache::revalidate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revalidation {
    /// The server confirmed the token.
    Valid(SessionDescriptor),
    /// No token was cached; nothing to check.
    NoToken,
    /// The server refused the token; it was purged and the user sent to login.
    Rejected,
    /// The server could not be asked. The token is kept.
    Unreachable,
}

/// Per-portal token cache, route intercept and revalidation.
pub struct SessionCache<S, E, N> {
    tokens: TokenStore<S>,
    routes: RouteAccess,
    endpoint: E,
    navigator: N,
    session: Option<SessionDescriptor>,
}

impl<S, E, N> SessionCache<S, E, N>
where
    S: Storage,
    E: SessionEndpoint,
    N: Navigator,
{
    /// Create a cache with the portal's default route allow-list.
    pub fn new(portal: Portal, storage: S, endpoint: E, navigator: N) -> Self {
        Self {
            tokens: TokenStore::new(portal, storage),
            routes: RouteAccess::for_portal(portal),
            endpoint,
            navigator,
            session: None,
        }
    }

    /// Replace the route allow-list.
    #[must_use]
    pub fn with_routes(mut self, routes: RouteAccess) -> Self {
        self.routes = routes;
        self
    }

    #[must_use]
    pub const fn portal(&self) -> Portal {
        self.tokens.portal()
    }

    /// Whether a token is cached. Says nothing about its validity.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.tokens.load().is_some()
    }

    /// The cached token, for attaching to API calls.
    #[must_use]
    pub fn token(&self) -> Option<SessionToken> {
        self.tokens.load()
    }

    /// The last session the server confirmed.
    #[must_use]
    pub const fn session(&self) -> Option<&SessionDescriptor> {
        self.session.as_ref()
    }

    /// Route intercept: run before rendering `path`.
    ///
    /// Redirects to the login route when `path` is protected and no token is
    /// cached.
    pub fn intercept(&self, path: &str) -> NavigationDecision {
        let decision = self.routes.decide(path, self.has_token());
        if let NavigationDecision::RedirectToLogin { login, return_to } = &decision {
            tracing::debug!(portal = %self.portal(), return_to, "Redirecting to login");
            self.navigator.navigate(login);
        }
        decision
    }

    /// Evaluate `policy` against the last confirmed session.
    ///
    /// Unconfirmed sessions are unauthorized, same as on the server.
    #[must_use]
    pub fn access(&self, policy: Policy) -> AccessDecision<SessionDescriptor> {
        policy.evaluate(self.session.clone())
    }

    /// Text to show in place of a page `policy` refuses to the signed-in
    /// user. `None` when access is granted or nobody is signed in.
    #[must_use]
    pub fn denial_message(&self, policy: Policy) -> Option<&'static str> {
        match self.access(policy) {
            AccessDecision::Forbidden(reason) => Some(reason.user_message()),
            AccessDecision::Authorized(_) | AccessDecision::Unauthorized => None,
        }
    }

    /// Check the cached token with the server.
    ///
    /// Only a definitive 401 or 403 purges the token. A network failure or a
    /// server error keeps it, so a flaky connection does not sign anyone out.
    #[tracing::instrument(skip_all, fields(portal = %self.portal()))]
    pub async fn revalidate(&mut self) -> Revalidation {
        let Some(token) = self.tokens.load() else {
            self.session = None;
            return Revalidation::NoToken;
        };

        match self.endpoint.validate_session(&token).await {
            Ok(SessionCheck::Valid(descriptor)) => {
                self.session = Some(descriptor.clone());
                Revalidation::Valid(descriptor)
            }
            Ok(SessionCheck::Rejected(status)) => {
                tracing::info!(status, "Cached token rejected");
                self.purge();
                self.navigator.navigate(self.routes.login_route());
                Revalidation::Rejected
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session revalidation failed; keeping token");
                Revalidation::Unreachable
            }
        }
    }

    /// Sign in and cache the token.
    ///
    /// # Errors
    ///
    /// Returns the API error, or a storage error if the token cannot be
    /// cached.
    #[tracing::instrument(skip(self, password), fields(portal = %self.portal()))]
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<SessionDescriptor, ClientError> {
        let result = self.endpoint.login(email, password, self.portal()).await?;
        self.tokens.save(&result.token)?;
        self.session = Some(result.session.clone());
        Ok(result.session)
    }

    /// Sign out.
    ///
    /// The local token is purged and the user sent to login before the
    /// server is told. Server revocation failures are logged only.
    #[tracing::instrument(skip_all, fields(portal = %self.portal()))]
    pub async fn logout(&mut self) {
        let token = self.tokens.load();
        self.purge();
        self.navigator.navigate(self.routes.login_route());

        if let Some(token) = token {
            if let Err(e) = self.endpoint.logout(&token).await {
                tracing::warn!(error = %e, "Server-side logout failed");
            }
        }
    }

    fn purge(&mut self) {
        self.session = None;
        if let Err(e) = self.tokens.clear() {
            tracing::error!(error = %e, "Failed to purge cached token");
        }
    }
}

impl<S, E, N> std::fmt::Debug for SessionCache<S, E, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("portal", &self.tokens.portal)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
