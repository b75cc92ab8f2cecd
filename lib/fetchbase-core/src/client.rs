//! Transport trait.

use std::future::Future;

use crate::{Request, Response, Result};

/// A fetch-like transport.
///
/// Implementations send a fully built [`Request`] and hand back the raw
/// [`Response`], whatever its status. Only failures that happen before a
/// response exists (connection, TLS, encoding) are errors here; status
/// classification is the caller's job.
///
/// # Example
///
/// ```
/// use fetchbase_core::{HeaderMap, HttpClient, Request, Response, Result};
///
/// /// Answers every request with `204 No Content`.
/// struct NoContent;
///
/// impl HttpClient for NoContent {
///     async fn execute(&self, _request: Request) -> Result<Response> {
///         Ok(Response::new(204, HeaderMap::new(), ""))
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Execute a request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be sent or the response
    /// could not be read:
    /// - Network errors
    /// - TLS errors
    /// - Invalid request
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

impl<C: HttpClient> HttpClient for &C {
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).execute(request)
    }
}

impl<C: HttpClient> HttpClient for std::sync::Arc<C> {
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).execute(request)
    }
}
