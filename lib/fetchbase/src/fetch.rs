//! The base client API-specific clients are built on.

use fetchbase_core::{
    ClientDefaults, ErrorKind, ErrorMiddlewares, HttpClient, Method, Payload, Request,
    RequestElements, RequestOptions, Response, ResponseBody, Result, classify, join_url,
};
use http::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{ContentType, Error, HyperClient};

/// What a call produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The unprocessed transport response, when [`RequestElements::raw`] was set.
    Raw(Response),
    /// The decoded body of a successful response.
    Body(ResponseBody),
}

impl Outcome {
    /// Deserialize the outcome into `T`.
    ///
    /// A raw response is decoded from its body without any status check.
    ///
    /// # Errors
    ///
    /// Returns an error if the body does not decode into `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Self::Raw(response) => response.decode()?.into_typed(),
            Self::Body(body) => body.into_typed(),
        }
    }
}

/// Base HTTP client for typed APIs.
///
/// `Fetch` owns a base URL, the defaults shared by every call (headers,
/// transport options, global payload) and the error middlewares. Wrap it in
/// an API-specific client and expose one method per endpoint:
///
/// ```ignore
/// use fetchbase::prelude::*;
///
/// pub struct CatApi(Fetch<HyperClient>);
///
/// impl CatApi {
///     pub async fn random(&self) -> Result<Vec<CatImage>> {
///         self.0.get("/v1/images/search", RequestElements::new()).await
///     }
/// }
/// ```
///
/// Setters return `&mut Self` so setup can be chained:
///
/// ```ignore
/// let mut fetch = Fetch::with_default_client("https://api.thecatapi.com")?;
/// fetch
///     .set_options(RequestOptions::new().credentials(Credentials::SameOrigin))
///     .add_header("x-api-key", "secret")?
///     .set_error_middleware(ErrorKind::Unauthorized, |_| logout());
/// ```
///
/// Setters take `&mut self` and calls take `&self`: the defaults cannot
/// change while a request is being built.
#[derive(Debug)]
pub struct Fetch<C> {
    client: C,
    base_url: String,
    defaults: ClientDefaults,
    middlewares: ErrorMiddlewares,
}

impl Fetch<HyperClient> {
    /// Create a client on top of a fresh [`HyperClient`].
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be parsed.
    pub fn with_default_client(base_url: impl Into<String>) -> Result<Self> {
        Self::new(HyperClient::new(), base_url)
    }
}

impl<C> Fetch<C> {
    /// Create a client with the given transport and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be parsed.
    pub fn new(client: C, base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url)?;

        Ok(Self {
            client,
            base_url,
            defaults: ClientDefaults::new(),
            middlewares: ErrorMiddlewares::new(),
        })
    }

    /// Base URL every path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current defaults.
    #[must_use]
    pub const fn defaults(&self) -> &ClientDefaults {
        &self.defaults
    }

    /// Registered error middlewares.
    #[must_use]
    pub const fn middlewares(&self) -> &ErrorMiddlewares {
        &self.middlewares
    }

    /// The transport.
    #[must_use]
    pub const fn inner(&self) -> &C {
        &self.client
    }

    // ========================================================================
    // Defaults
    // ========================================================================

    /// Add an entry sent with every payload-carrying call.
    ///
    /// Re-adding a key overwrites its value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn add_global_payload<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self> {
        let value = serde_json::to_value(value)?;
        self.defaults.insert_payload(key, value);
        Ok(self)
    }

    /// Remove a global payload entry.
    pub fn remove_global_payload(&mut self, key: &str) -> &mut Self {
        self.defaults.remove_payload(key);
        self
    }

    /// Set a default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or value is not a valid header.
    pub fn add_header(&mut self, key: &str, value: &str) -> Result<&mut Self> {
        self.defaults.insert_header(key, value)?;
        Ok(self)
    }

    /// Remove a default header.
    pub fn remove_header(&mut self, key: &str) -> &mut Self {
        self.defaults.remove_header(key);
        self
    }

    /// Replace the default transport options.
    pub fn set_options(&mut self, options: RequestOptions) -> &mut Self {
        self.defaults.set_options(options);
        self
    }

    /// Set the `Authorization` default header to `"{prefix} {token}"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is not a valid header value.
    pub fn set_auth_token(&mut self, prefix: &str, token: &str) -> Result<&mut Self> {
        self.add_header(AUTHORIZATION.as_str(), &format!("{prefix} {token}"))
    }

    /// Remove the `Authorization` default header.
    pub fn delete_auth_token(&mut self) -> &mut Self {
        self.remove_header(AUTHORIZATION.as_str())
    }

    /// Register a callback run on every error response of `kind`.
    ///
    /// Callbacks run in registration order, before the error is returned.
    pub fn set_error_middleware<F>(&mut self, kind: ErrorKind, callback: F) -> &mut Self
    where
        F: Fn(&Response) + Send + Sync + 'static,
    {
        self.middlewares.register(kind, callback);
        self
    }

    /// Build the request a call would send, without sending it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL, a header or the payload is invalid.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        elements: RequestElements,
    ) -> Result<Request> {
        let url = join_url(&self.base_url, path)?;
        self.defaults.build(method, url, elements)
    }
}

impl<C: HttpClient> Fetch<C> {
    /// Build, send and classify a request.
    ///
    /// # Errors
    ///
    /// Returns transport errors unchanged, and [`Error::Http`] for responses
    /// outside `[100, 300)` unless the raw response was requested.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        elements: RequestElements,
    ) -> Result<Outcome> {
        let raw = elements.is_raw();
        let request = self.build_request(method, path, elements)?;
        debug!(%method, url = %request.url(), raw, "sending request");

        let response = self.client.execute(request).await?;
        if raw {
            return Ok(Outcome::Raw(response));
        }

        match classify(&response, &self.middlewares) {
            Ok(body) => Ok(Outcome::Body(body)),
            Err(err) => {
                if let Error::Http { kind, status, .. } = &err {
                    warn!(%method, path, %kind, status, "request failed");
                }
                Err(err)
            }
        }
    }

    /// Send a classified request and deserialize its body.
    ///
    /// The raw flag is cleared: typed results never skip the status check.
    async fn typed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        elements: RequestElements,
    ) -> Result<T> {
        self.send(method, path, elements.raw(false))
            .await?
            .into_typed()
    }

    /// GET `path` and deserialize the response.
    ///
    /// # Errors
    ///
    /// See [`Fetch::send`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str, elements: RequestElements) -> Result<T> {
        self.typed(Method::Get, path, elements).await
    }

    /// GET `path` and return the unprocessed transport response.
    ///
    /// # Errors
    ///
    /// Returns transport errors only: error statuses are not classified.
    pub async fn get_raw(&self, path: &str, elements: RequestElements) -> Result<Response> {
        match self.send(Method::Get, path, elements.raw(true)).await? {
            Outcome::Raw(response) => Ok(response),
            Outcome::Body(_) => Err(Error::invalid_request("expected a raw response")),
        }
    }

    /// POST to `path` and deserialize the response.
    ///
    /// # Errors
    ///
    /// See [`Fetch::send`].
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        elements: RequestElements,
    ) -> Result<T> {
        self.typed(Method::Post, path, elements).await
    }

    /// POST the merged payload to `path` as multipart form data.
    ///
    /// # Errors
    ///
    /// See [`Fetch::send`].
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: Map<String, Value>,
    ) -> Result<T> {
        let elements = RequestElements::new()
            .header("Content-Type", ContentType::Multipart.as_str())
            .payload(Payload::Map(payload));
        self.post(path, elements).await
    }

    /// PUT to `path` and deserialize the response.
    ///
    /// # Errors
    ///
    /// See [`Fetch::send`].
    pub async fn put<T: DeserializeOwned>(&self, path: &str, elements: RequestElements) -> Result<T> {
        self.typed(Method::Put, path, elements).await
    }

    /// PATCH `path` and deserialize the response.
    ///
    /// # Errors
    ///
    /// See [`Fetch::send`].
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        elements: RequestElements,
    ) -> Result<T> {
        self.typed(Method::Patch, path, elements).await
    }

    /// DELETE `path` and deserialize the response.
    ///
    /// # Errors
    ///
    /// See [`Fetch::send`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        elements: RequestElements,
    ) -> Result<T> {
        self.typed(Method::Delete, path, elements).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use assert2::let_assert;
    use fetchbase_core::header::CONTENT_TYPE;
    use fetchbase_core::{Body, Credentials, HeaderMap, HeaderValue};
    use serde_json::json;

    use super::*;

    /// Records requests and answers with a canned response.
    #[derive(Debug)]
    struct Recorder {
        requests: Mutex<Vec<Request>>,
        status: u16,
        body: &'static str,
    }

    impl Recorder {
        fn answering(status: u16, body: &'static str) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                status,
                body,
            }
        }

        fn last(&self) -> Request {
            self.requests
                .lock()
                .expect("lock")
                .last()
                .cloned()
                .expect("a request was sent")
        }
    }

    impl HttpClient for Recorder {
        async fn execute(&self, request: Request) -> Result<Response> {
            self.requests.lock().expect("lock").push(request);
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Ok(Response::new(self.status, headers, self.body))
        }
    }

    fn fetch(recorder: &Recorder) -> Fetch<&Recorder> {
        let mut fetch = Fetch::new(recorder, "https://api.example.com").expect("fetch");
        fetch
            .add_header("Authorization", "Bearer X")
            .expect("header");
        fetch
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let_assert!(Err(Error::InvalidUrl(_)) = Fetch::new((), "api.example.com"));
    }

    #[test]
    fn setters_chain() {
        let mut fetch = Fetch::new((), "https://api.example.com").expect("fetch");
        fetch
            .set_options(RequestOptions::new().credentials(Credentials::SameOrigin))
            .add_header("X-Api-Key", "k")
            .expect("header")
            .add_global_payload("locale", "fr")
            .expect("payload")
            .set_error_middleware(ErrorKind::Unauthorized, |_| {});

        assert_eq!(
            fetch.defaults().options().credentials,
            Some(Credentials::SameOrigin)
        );
        assert_eq!(fetch.defaults().payload().get("locale"), Some(&json!("fr")));
        assert_eq!(fetch.middlewares().count(ErrorKind::Unauthorized), 1);

        fetch.remove_global_payload("locale");
        assert!(fetch.defaults().payload().is_empty());
    }

    #[test]
    fn auth_token_is_a_default_header() {
        let mut fetch = Fetch::new((), "https://api.example.com").expect("fetch");
        fetch.set_auth_token("JWT", "abc").expect("token");

        let request = fetch
            .build_request(Method::Get, "/me", RequestElements::new())
            .expect("request");
        assert_eq!(request.header("authorization"), Some("JWT abc"));

        fetch.delete_auth_token();
        let request = fetch
            .build_request(Method::Get, "/me", RequestElements::new())
            .expect("request");
        assert!(request.header("authorization").is_none());
    }

    #[tokio::test]
    async fn post_sends_merged_json() {
        let recorder = Recorder::answering(201, r#"{"id":7}"#);
        let mut fetch = fetch(&recorder);
        fetch.add_global_payload("locale", "fr").expect("payload");

        let elements = RequestElements::new()
            .json(&json!({ "name": "a" }))
            .expect("payload");
        let created: Value = fetch.post("/items", elements).await.expect("created");
        assert_eq!(created, json!({ "id": 7 }));

        let sent = recorder.last();
        assert_eq!(sent.method(), Method::Post);
        assert_eq!(sent.url().as_str(), "https://api.example.com/items");
        assert_eq!(sent.header("authorization"), Some("Bearer X"));
        assert_eq!(sent.header("content-type"), Some("application/json"));
        let text = sent.body().and_then(Body::as_text).expect("text body");
        assert_eq!(
            serde_json::from_str::<Value>(text).expect("json"),
            json!({ "locale": "fr", "name": "a" })
        );
    }

    #[tokio::test]
    async fn error_status_runs_middleware_then_fails() {
        let recorder = Recorder::answering(401, r#"{"msg":"expired"}"#);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut fetch = fetch(&recorder);
        let counter = Arc::clone(&calls);
        fetch.set_error_middleware(ErrorKind::Unauthorized, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let result = fetch.get::<Value>("/me", RequestElements::new()).await;

        let_assert!(Err(Error::Http { kind, status, body }) = result);
        assert_eq!(kind, ErrorKind::Unauthorized);
        assert_eq!(status, 401);
        assert_eq!(body, ResponseBody::Json(json!({ "msg": "expired" })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn raw_get_skips_classification() {
        let recorder = Recorder::answering(500, r#"{"msg":"boom"}"#);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut fetch = fetch(&recorder);
        let counter = Arc::clone(&calls);
        fetch.set_error_middleware(ErrorKind::Server, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let response = fetch
            .get_raw("/health", RequestElements::new())
            .await
            .expect("raw response");

        assert_eq!(response.status(), 500);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn typed_calls_ignore_the_raw_flag() {
        let recorder = Recorder::answering(500, r#"{"id":1}"#);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut fetch = fetch(&recorder);
        let counter = Arc::clone(&calls);
        fetch.set_error_middleware(ErrorKind::Server, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let result = fetch
            .post::<Value>("/items", RequestElements::new().raw(true))
            .await;
        let_assert!(Err(Error::Http { kind, status, .. }) = result);
        assert_eq!(kind, ErrorKind::Server);
        assert_eq!(status, 500);

        let result = fetch
            .get::<Value>("/items", RequestElements::new().raw(true))
            .await;
        let_assert!(Err(Error::Http { status: 500, .. }) = result);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn delete_without_payload_has_no_body() {
        let recorder = Recorder::answering(200, "null");
        let fetch = fetch(&recorder);

        let _: Option<Value> = fetch
            .delete("/items/1", RequestElements::new())
            .await
            .expect("deleted");

        let sent = recorder.last();
        assert_eq!(sent.method(), Method::Delete);
        assert!(sent.body().is_none());
    }

    #[tokio::test]
    async fn post_form_sends_multipart_with_global_payload() {
        let recorder = Recorder::answering(200, "{}");
        let mut fetch = fetch(&recorder);
        fetch.add_global_payload("sub_id", "user-1").expect("payload");

        let mut payload = Map::new();
        payload.insert("caption".to_string(), json!("Tom"));
        let _: Value = fetch.post_form("/upload", payload).await.expect("posted");

        let sent = recorder.last();
        assert!(sent.header("content-type").is_none());
        let_assert!(Some(Body::Form(form)) = sent.body());
        assert!(form.get("sub_id").is_some());
        assert!(form.get("caption").is_some());
    }
}
