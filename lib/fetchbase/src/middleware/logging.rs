//! Request/response logging middleware.
//!
//! Logs every exchange with the `tracing` crate, inside an `http_request`
//! span carrying the method and URL.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use tower::{Layer, Service};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{Body, Error, Request, Response, Result};

/// Layer that adds request/response logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// Log level for the logging middleware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at debug level, including headers.
    Debug,
    /// Log at info level (summary only).
    #[default]
    Info,
}

impl LoggingLayer {
    /// Create a logging layer at info level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging layer that logs at debug level.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service that logs requests and responses.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

fn body_kind(request: &Request) -> &'static str {
    match request.body() {
        None => "none",
        Some(Body::Text(_)) => "text",
        Some(Body::Form(_)) => "multipart",
    }
}

impl<S> Service<Request> for Logging<S>
where
    S: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let method = request.method();
        let url = request.url().to_string();
        let level = self.level;

        let span = span!(Level::INFO, "http_request", %method, %url);

        match level {
            LogLevel::Debug => {
                let _entered = span.enter();
                debug!(
                    headers = ?request.headers(),
                    options = ?request.options(),
                    body = body_kind(&request),
                    "sending request"
                );
            }
            LogLevel::Info => {
                let _entered = span.enter();
                info!(body = body_kind(&request), "sending request");
            }
        }

        let mut inner = self.inner.clone();
        Box::pin(
            async move {
                let start = Instant::now();
                let result = inner.call(request).await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(response) if response.is_ok() => {
                        info!(status = response.status(), elapsed_ms, "request completed");
                    }
                    Ok(response) => {
                        warn!(
                            status = response.status(),
                            elapsed_ms, "request answered with an error status"
                        );
                    }
                    Err(err) => warn!(error = %err, elapsed_ms, "request failed"),
                }

                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use fetchbase_core::{Form, HeaderMap, Method};
    use tower::ServiceExt;
    use tower::service_fn;

    use super::*;

    #[test]
    fn logging_layer_levels() {
        assert_eq!(LoggingLayer::new().level, LogLevel::Info);
        assert_eq!(LoggingLayer::debug().level, LogLevel::Debug);
    }

    #[test]
    fn body_kinds() {
        let url = url::Url::parse("https://api.example.com").expect("url");
        let request = Request::new(Method::Get, url.clone());
        assert_eq!(body_kind(&request), "none");

        let request = Request::from_parts(
            Method::Post,
            url,
            HeaderMap::new(),
            Some(Body::Form(Form::new())),
            fetchbase_core::RequestOptions::new(),
        );
        assert_eq!(body_kind(&request), "multipart");
    }

    #[tokio::test]
    async fn logging_passes_the_response_through() {
        let inner = service_fn(|_request: Request| async {
            Ok::<_, Error>(Response::new(418, HeaderMap::new(), "teapot"))
        });
        let service = LoggingLayer::debug().layer(inner);

        let url = url::Url::parse("https://api.example.com/tea").expect("url");
        let response = service
            .oneshot(Request::new(Method::Get, url))
            .await
            .expect("response");

        assert_eq!(response.status(), 418);
    }
}
