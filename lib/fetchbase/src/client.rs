//! Default transport using hyper-util and rustls.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONNECTION, CONTENT_TYPE, COOKIE, PROXY_AUTHORIZATION};
use http::{HeaderMap, HeaderValue};
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;

use crate::middleware::LoggingLayer;
use crate::{Body, Credentials, Error, Request, RequestOptions, Response, Result};

/// Type-erased service for middleware composition.
pub type BoxedService = BoxCloneService<Request, Response, Error>;

/// Future type for Tower Service implementation.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

/// Makes a [`BoxedService`] shareable behind `&self`.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request) -> ServiceFuture {
        // Clone under the lock, call outside of it
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.call(request).await })
    }
}

// ============================================================================
// Wire encoding
// ============================================================================

fn https_connector() -> HttpsConnector<HttpConnector> {
    let roots: rustls::RootCertStore = webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();
    let tls = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build()
}

fn next_boundary() -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);

    format!("----FetchbaseBoundary{nanos:x}{sequence:04x}")
}

/// Apply the transport options that have a meaning outside a browser.
fn apply_options(headers: &mut HeaderMap, options: &RequestOptions) {
    if options.credentials == Some(Credentials::Omit) {
        headers.remove(AUTHORIZATION);
        headers.remove(PROXY_AUTHORIZATION);
        headers.remove(COOKIE);
    }
    if options.keepalive == Some(false) {
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
    }
}

/// Encode the request body; multipart bodies also set the `Content-Type`.
fn encode_body(headers: &mut HeaderMap, body: Option<Body>) -> Result<Full<Bytes>> {
    match body {
        None => Ok(Full::default()),
        Some(Body::Text(text)) => Ok(Full::new(Bytes::from(text))),
        Some(Body::Form(form)) => {
            let (content_type, bytes) = form.encode(&next_boundary());
            headers.insert(CONTENT_TYPE, HeaderValue::try_from(content_type)?);
            Ok(Full::new(bytes))
        }
    }
}

// ============================================================================
// Raw Client
// ============================================================================

#[derive(Clone)]
struct RawHyperClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl RawHyperClient {
    fn new() -> Self {
        let inner = Client::builder(TokioExecutor::new()).build(https_connector());
        Self { inner }
    }

    fn to_hyper_request(request: Request) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, mut headers, body, options) = request.into_parts();

        apply_options(&mut headers, &options);
        let body = encode_body(&mut headers, body)?;

        let mut hyper_request = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str())
            .body(body)
            .map_err(|e| Error::invalid_request(e.to_string()))?;
        *hyper_request.headers_mut() = headers;

        Ok(hyper_request)
    }

    async fn execute(&self, request: Request) -> Result<Response> {
        let hyper_request = Self::to_hyper_request(request)?;

        let response = self
            .inner
            .request(hyper_request)
            .await
            .map_err(Self::map_hyper_error)?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| Error::connection(e.to_string()))?
            .to_bytes();

        Ok(Response::new(parts.status.as_u16(), parts.headers, body))
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = err.to_string();
        let tls_related = ["ssl", "tls", "certificate"]
            .iter()
            .any(|needle| msg.contains(needle));

        if !err.is_connect() && tls_related {
            Error::tls(msg)
        } else {
            Error::connection(msg)
        }
    }
}

impl Service<Request> for RawHyperClient {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let client = self.clone();
        Box::pin(async move { client.execute(request).await })
    }
}

// ============================================================================
// Public Client
// ============================================================================

/// HTTP transport using hyper-util with rustls and tower middleware.
///
/// # Example
///
/// ```ignore
/// use fetchbase::HyperClient;
///
/// let client = HyperClient::builder().with_logging().build();
/// ```
#[derive(Clone)]
pub struct HyperClient {
    service: SyncService,
    layers: usize,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Create a client without middleware.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fetchbase_core::HttpClient for HyperClient {
    async fn execute(&self, request: Request) -> Result<Response> {
        self.service.call(request).await
    }
}

impl Service<Request> for HyperClient {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        self.service.call(request)
    }
}

/// Builder for [`HyperClient`].
///
/// Layers are applied in order: first added = outermost.
#[derive(Default)]
pub struct HyperClientBuilder {
    layers: Vec<Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl HyperClientBuilder {
    /// Add a Tower layer to the client.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use fetchbase::HyperClient;
    /// use fetchbase::middleware::LoggingLayer;
    ///
    /// let client = HyperClient::builder()
    ///     .layer(LoggingLayer::debug())
    ///     .build();
    /// ```
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
        <L::Service as Service<Request>>::Future: Send,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Add request/response logging at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Add debug-level logging (includes headers).
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let layers = self.layers.len();
        let mut service: BoxedService = BoxCloneService::new(RawHyperClient::new());

        // Wrap last-added first so the first added ends up outermost
        for layer_fn in self.layers.into_iter().rev() {
            service = layer_fn(service);
        }

        HyperClient {
            service: SyncService::new(service),
            layers,
        }
    }
}

#[cfg(test)]
mod tests {
    use fetchbase_core::{Form, Method};

    use super::*;

    fn request(body: Option<Body>, options: RequestOptions) -> Request {
        let url = url::Url::parse("https://api.example.com/items").expect("url");
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer X"));
        headers.insert(COOKIE, HeaderValue::from_static("session=1"));
        Request::from_parts(Method::Post, url, headers, body, options)
    }

    #[test]
    fn omitted_credentials_strip_auth_headers() {
        let options = RequestOptions::new().credentials(Credentials::Omit);
        let hyper_request =
            RawHyperClient::to_hyper_request(request(None, options)).expect("request");

        assert!(hyper_request.headers().get(AUTHORIZATION).is_none());
        assert!(hyper_request.headers().get(COOKIE).is_none());
    }

    #[test]
    fn included_credentials_keep_auth_headers() {
        let options = RequestOptions::new().credentials(Credentials::Include);
        let hyper_request =
            RawHyperClient::to_hyper_request(request(None, options)).expect("request");

        assert_eq!(hyper_request.headers()[AUTHORIZATION], "Bearer X");
        assert!(hyper_request.headers().get(CONNECTION).is_none());
    }

    #[test]
    fn keepalive_false_closes_the_connection() {
        let options = RequestOptions::new().keepalive(false);
        let hyper_request =
            RawHyperClient::to_hyper_request(request(None, options)).expect("request");

        assert_eq!(hyper_request.headers()[CONNECTION], "close");
    }

    #[test]
    fn form_body_sets_boundary_content_type() {
        let body = Body::Form(Form::new().text("name", "Tom"));
        let hyper_request =
            RawHyperClient::to_hyper_request(request(Some(body), RequestOptions::new()))
                .expect("request");

        let content_type = hyper_request.headers()[CONTENT_TYPE]
            .to_str()
            .expect("ascii");
        assert!(
            content_type.starts_with("multipart/form-data; boundary=----FetchbaseBoundary"),
            "{content_type}"
        );
    }

    #[test]
    fn boundaries_are_unique() {
        assert_ne!(next_boundary(), next_boundary());
    }

    #[test]
    fn client_is_debug() {
        let client = HyperClient::builder().with_logging().build();
        let debug = format!("{client:?}");
        assert!(debug.contains("HyperClient"));
        assert!(debug.contains("layers: 1"));
    }
}
