//! Transport options carried alongside a request.
//!
//! These mirror the fetch `RequestInit` switches. Every field is optional so
//! that per-call overrides can be merged field by field over the client
//! defaults with [`RequestOptions::merge`].

use derive_more::Display;

/// Whether credentials (cookies, `Authorization`) are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Credentials {
    /// Never send credentials.
    #[display("omit")]
    Omit,
    /// Send credentials to the same origin only.
    #[display("same-origin")]
    SameOrigin,
    /// Always send credentials.
    #[display("include")]
    Include,
}

/// Cross-origin request mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum RequestMode {
    /// Cross-origin requests allowed under CORS rules.
    #[display("cors")]
    Cors,
    /// Opaque cross-origin requests.
    #[display("no-cors")]
    NoCors,
    /// Same-origin requests only.
    #[display("same-origin")]
    SameOrigin,
}

/// HTTP cache interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CacheMode {
    /// Use the cache as usual.
    #[display("default")]
    Default,
    /// Bypass the cache entirely.
    #[display("no-store")]
    NoStore,
    /// Always revalidate.
    #[display("no-cache")]
    NoCache,
    /// Fetch and update the cache.
    #[display("reload")]
    Reload,
}

/// Redirect handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Redirect {
    /// Follow redirects.
    #[display("follow")]
    Follow,
    /// Fail on redirect.
    #[display("error")]
    Error,
    /// Return the redirect response.
    #[display("manual")]
    Manual,
}

/// Transport options for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Credentials mode.
    pub credentials: Option<Credentials>,
    /// Cross-origin mode.
    pub mode: Option<RequestMode>,
    /// Cache mode.
    pub cache: Option<CacheMode>,
    /// Redirect handling.
    pub redirect: Option<Redirect>,
    /// Keep the connection alive past the request.
    pub keepalive: Option<bool>,
}

impl RequestOptions {
    /// Create empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the credentials mode.
    #[must_use]
    pub const fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the cross-origin mode.
    #[must_use]
    pub const fn mode(mut self, mode: RequestMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the cache mode.
    #[must_use]
    pub const fn cache(mut self, cache: CacheMode) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the redirect handling.
    #[must_use]
    pub const fn redirect(mut self, redirect: Redirect) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Set keep-alive.
    #[must_use]
    pub const fn keepalive(mut self, keepalive: bool) -> Self {
        self.keepalive = Some(keepalive);
        self
    }

    /// Shallow merge: every field set in `overrides` wins.
    #[must_use]
    pub fn merge(&self, overrides: &Self) -> Self {
        Self {
            credentials: overrides.credentials.or(self.credentials),
            mode: overrides.mode.or(self.mode),
            cache: overrides.cache.or(self.cache),
            redirect: overrides.redirect.or(self.redirect),
            keepalive: overrides.keepalive.or(self.keepalive),
        }
    }
}
