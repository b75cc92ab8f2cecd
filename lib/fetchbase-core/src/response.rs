//! HTTP response types.

use bytes::Bytes;
use http::HeaderMap;
use http::header::CONTENT_TYPE;
use serde_json::Value;

use crate::{ContentType, Result};

// ============================================================================
// Raw Response
// ============================================================================

/// HTTP response as returned by the transport.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Single header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The `Content-Type` header, if present and readable.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }

    /// Status is in `[100, 300)`, the range handed back as data.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status >= 100 && self.status < 300
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Decode the body according to the `Content-Type` header.
    ///
    /// A content type containing `json` is parsed as JSON (an empty body
    /// becomes `null`); anything else is read as text.
    ///
    /// # Errors
    ///
    /// Returns an error if a JSON body does not parse.
    pub fn decode(&self) -> Result<ResponseBody> {
        let is_json = self
            .content_type()
            .and_then(ContentType::detect)
            .is_some_and(|content_type| content_type == ContentType::Json);

        if !is_json {
            return Ok(ResponseBody::Text(
                String::from_utf8_lossy(&self.body).into_owned(),
            ));
        }

        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(ResponseBody::Json(Value::Null));
        }

        crate::from_json(&self.body).map(ResponseBody::Json)
    }
}

// ============================================================================
// Decoded Body
// ============================================================================

/// A response body decoded once, either as JSON or as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// Body of a JSON response.
    Json(Value),
    /// Body of any other response.
    Text(String),
}

impl ResponseBody {
    /// The JSON value, for JSON bodies.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// The text, for text bodies.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    /// Deserialize into `T`.
    ///
    /// Text bodies deserialize as a JSON string, so `String` targets accept
    /// both kinds of body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body does not match `T`.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        self.clone().into_typed()
    }

    /// Deserialize into `T`, consuming the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body does not match `T`.
    pub fn into_typed<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        match self {
            Self::Json(value) => crate::from_value(value),
            Self::Text(text) => crate::from_value(Value::String(text)),
        }
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}
