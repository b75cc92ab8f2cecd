//! Outgoing request descriptors and per-call request elements.
//!
//! A [`Request`] is what the request builder hands to the transport. The
//! per-call side of the merge is described with [`RequestElements`]:
//!
//! ```
//! use fetchbase_core::{Credentials, RequestElements, RequestOptions};
//! use serde_json::json;
//!
//! let elements = RequestElements::new()
//!     .header("X-Request-Id", "42")
//!     .options(RequestOptions::new().credentials(Credentials::Include))
//!     .json(&json!({ "name": "Tom" }))
//!     .expect("payload");
//!
//! assert!(elements.payload_ref().is_some());
//! ```

use http::HeaderMap;
use url::Url;

use crate::{Form, Method, Payload, RequestOptions, Result};

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Already encoded text (JSON or URL-encoded).
    Text(String),
    /// Multipart form, encoded by the transport.
    Form(Form),
}

impl Body {
    /// The encoded text, for text bodies.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Form(_) => None,
        }
    }

    /// The form, for multipart bodies.
    #[must_use]
    pub const fn as_form(&self) -> Option<&Form> {
        match self {
            Self::Text(_) => None,
            Self::Form(form) => Some(form),
        }
    }
}

/// A fully merged request, ready for the transport.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Body>,
    options: RequestOptions,
}

impl Request {
    /// Creates a request without body.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            options: RequestOptions::default(),
        }
    }

    /// Reassemble a request from its parts.
    #[must_use]
    pub const fn from_parts(
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
            options,
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Single header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Transport options.
    #[must_use]
    pub const fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Consume into (method, url, headers, body, options).
    #[must_use]
    pub fn into_parts(self) -> (Method, Url, HeaderMap, Option<Body>, RequestOptions) {
        (self.method, self.url, self.headers, self.body, self.options)
    }
}

/// The per-call side of a request.
///
/// Header overrides are validated when the request is built.
#[derive(Debug, Clone, Default)]
pub struct RequestElements {
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) options: RequestOptions,
    pub(crate) payload: Option<Payload>,
    pub(crate) raw: bool,
}

impl RequestElements {
    /// Creates empty elements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override a header for this call.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override transport options for this call.
    #[must_use]
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the payload.
    #[must_use]
    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Set the payload from any serializable object or array.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot become a [`Payload`].
    pub fn json<T: serde::Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        Ok(self.payload(Payload::json(value)?))
    }

    /// Ask for the raw transport response instead of decoded data.
    #[must_use]
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Whether the raw transport response was requested.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.raw
    }

    /// The payload, if any.
    #[must_use]
    pub const fn payload_ref(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }
}
