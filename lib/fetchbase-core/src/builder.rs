//! Request building: client defaults merged with per-call elements.
//!
//! [`ClientDefaults`] holds what every request of a client shares (default
//! headers, default transport options, global payload entries). Building a
//! request never mutates it, so a descriptor is always an owned snapshot.
//!
//! Merge rules:
//! - headers: per-call overrides win, names compared case-insensitively;
//! - options: per-call fields win ([`RequestOptions::merge`]);
//! - payload: see [`Payload`].
//!
//! The body encoding follows the effective `Content-Type` header. A
//! body-bearing request without one is sent as JSON.

use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::HeaderMap;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::method::BodyPolicy;
use crate::{
    Body, ContentType, Error, Form, Method, Payload, Request, RequestElements, RequestOptions,
    Result,
};

/// Defaults shared by every request of a client.
#[derive(Debug, Clone, Default)]
pub struct ClientDefaults {
    headers: HeaderMap,
    options: RequestOptions,
    payload: Map<String, Value>,
}

/// Payload after the merge with the global entries.
enum Merged {
    Map(Map<String, Value>),
    Sequence(Vec<Value>),
}

impl ClientDefaults {
    /// Creates empty defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Default transport options.
    #[must_use]
    pub const fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Global payload entries.
    #[must_use]
    pub const fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Set a default header, replacing any value under the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or value is not a valid header.
    pub fn insert_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::try_from(name)?;
        let value = HeaderValue::try_from(value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Remove a default header.
    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(name);
    }

    /// Replace the default transport options.
    pub fn set_options(&mut self, options: RequestOptions) {
        self.options = options;
    }

    /// Add a global payload entry, overwriting an existing key.
    pub fn insert_payload(&mut self, key: impl Into<String>, value: Value) {
        self.payload.insert(key.into(), value);
    }

    /// Remove a global payload entry.
    pub fn remove_payload(&mut self, key: &str) {
        self.payload.remove(key);
    }

    /// Build the outgoing request for `method` on `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if a header override is invalid, if serialization
    /// fails, or if the payload cannot be encoded with the effective
    /// content type.
    pub fn build(&self, method: Method, url: Url, elements: RequestElements) -> Result<Request> {
        let RequestElements {
            headers: overrides,
            options,
            payload,
            raw: _,
        } = elements;

        let mut headers = self.headers.clone();
        for (name, value) in overrides {
            let name = HeaderName::try_from(name)?;
            let value = HeaderValue::try_from(value)?;
            headers.insert(name, value);
        }
        let options = self.options.merge(&options);

        let carries_body = match method.body_policy() {
            BodyPolicy::Never => false,
            BodyPolicy::WhenProvided => payload.is_some(),
            BodyPolicy::Always => true,
        };
        if !carries_body {
            return Ok(Request::from_parts(method, url, headers, None, options));
        }

        let merged = match payload {
            Some(Payload::Form(form)) => {
                headers.remove(CONTENT_TYPE);
                let body = Some(Body::Form(form));
                return Ok(Request::from_parts(method, url, headers, body, options));
            }
            Some(Payload::Sequence(items)) => Merged::Sequence(items),
            Some(Payload::Map(map)) => {
                let mut merged = self.payload.clone();
                merged.extend(map);
                Merged::Map(merged)
            }
            None => Merged::Map(self.payload.clone()),
        };

        let content_type = resolve_content_type(&mut headers)?;
        let body = match (content_type, merged) {
            (ContentType::Json, Merged::Map(map)) => Body::Text(crate::to_json(&map)?),
            (ContentType::Json, Merged::Sequence(items)) => Body::Text(crate::to_json(&items)?),
            (ContentType::Multipart, Merged::Map(map)) => {
                headers.remove(CONTENT_TYPE);
                Body::Form(Form::from_map(&map)?)
            }
            (ContentType::FormUrlEncoded, Merged::Map(map)) => Body::Text(crate::to_form(&map)?),
            (content_type, Merged::Sequence(_)) => {
                return Err(Error::invalid_request(format!(
                    "a sequence payload cannot be sent as {content_type}"
                )));
            }
        };

        Ok(Request::from_parts(method, url, headers, Some(body), options))
    }
}

/// Read the effective content type, inserting the JSON fallback when absent.
fn resolve_content_type(headers: &mut HeaderMap) -> Result<ContentType> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        debug!("no Content-Type for a body-bearing request, using JSON");
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(ContentType::Json.as_str()),
        );
        return Ok(ContentType::Json);
    };

    let value = value
        .to_str()
        .map_err(|_| Error::invalid_request("Content-Type header is not visible ASCII"))?;
    ContentType::detect(value)
        .ok_or_else(|| Error::invalid_request(format!("cannot encode a payload as `{value}`")))
}

/// Join a base URL and a path with exactly one `/` between them.
///
/// # Errors
///
/// Returns an error if the result is not a valid URL.
///
/// # Example
///
/// ```
/// use fetchbase_core::join_url;
///
/// let url = join_url("https://api.example.com/v1/", "/items?page=2").expect("url");
/// assert_eq!(url.as_str(), "https://api.example.com/v1/items?page=2");
/// ```
pub fn join_url(base: &str, path: &str) -> Result<Url> {
    let base = base.trim_end_matches('/');
    let url = if path.is_empty() || path.starts_with('?') {
        format!("{base}{path}")
    } else {
        format!("{base}/{}", path.trim_start_matches('/'))
    };
    Url::parse(&url).map_err(Into::into)
}
