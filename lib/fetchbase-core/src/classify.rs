//! Response classification and error middlewares.
//!
//! [`classify`] turns a transport [`Response`] into decoded data, or into an
//! [`Error::Http`] once every middleware registered for the error kind has
//! seen the raw response.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::{Error, ErrorKind, Response, ResponseBody, Result};

/// Callback run on error responses of a given kind.
///
/// Middlewares observe the response (logging out on `Unauthorized`,
/// reporting `Server` errors); they cannot alter the error. Work that must
/// outlive the call should be spawned by the callback itself.
pub type ErrorMiddleware = Arc<dyn Fn(&Response) + Send + Sync>;

/// Error middlewares, grouped by kind, in registration order.
#[derive(Clone, Default)]
pub struct ErrorMiddlewares {
    by_kind: HashMap<ErrorKind, Vec<ErrorMiddleware>>,
}

impl std::fmt::Debug for ErrorMiddlewares {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self
            .by_kind
            .iter()
            .map(|(kind, callbacks)| (kind, callbacks.len()))
            .collect();
        f.debug_struct("ErrorMiddlewares")
            .field("by_kind", &counts)
            .finish()
    }
}

impl ErrorMiddlewares {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for `kind`, after the ones already registered.
    pub fn register<F>(&mut self, kind: ErrorKind, callback: F)
    where
        F: Fn(&Response) + Send + Sync + 'static,
    {
        self.by_kind.entry(kind).or_default().push(Arc::new(callback));
    }

    /// Number of callbacks registered for `kind`.
    #[must_use]
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.by_kind.get(&kind).map_or(0, Vec::len)
    }

    fn run(&self, kind: ErrorKind, response: &Response) {
        let Some(callbacks) = self.by_kind.get(&kind) else {
            return;
        };
        debug!(%kind, count = callbacks.len(), "running error middlewares");
        for callback in callbacks {
            callback(response);
        }
    }
}

/// Classify a response.
///
/// The body is decoded once. A status in `[100, 300)` returns it; any other
/// status runs the middlewares registered for its [`ErrorKind`] and fails
/// with [`Error::Http`].
///
/// # Errors
///
/// Returns [`Error::Http`] for error statuses, or a deserialization error
/// when a successful JSON response does not parse.
///
/// # Example
///
/// ```
/// use fetchbase_core::{classify, ErrorKind, ErrorMiddlewares, Response};
/// use http::HeaderMap;
///
/// let response = Response::new(404, HeaderMap::new(), "nope");
/// let err = classify(&response, &ErrorMiddlewares::new()).expect_err("404");
/// assert_eq!(err.kind(), Some(ErrorKind::NotFound));
/// ```
pub fn classify(response: &Response, middlewares: &ErrorMiddlewares) -> Result<ResponseBody> {
    if response.is_ok() {
        return response.decode();
    }

    let status = response.status();
    let kind = ErrorKind::from_status(status);
    // An unparsable error body must not hide the HTTP error itself.
    let body = response.decode().unwrap_or_else(|_| {
        ResponseBody::Text(String::from_utf8_lossy(response.body()).into_owned())
    });

    middlewares.run(kind, response);

    Err(Error::Http { kind, status, body })
}
