//! Body serialization utilities.

use crate::Result;

/// Content types the request builder knows how to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// Multipart form content type (`multipart/form-data`).
    Multipart,
    /// Form URL-encoded content type (`application/x-www-form-urlencoded`).
    FormUrlEncoded,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Multipart => "multipart/form-data",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
        }
    }

    /// Detect the encoding from a `Content-Type` header value.
    ///
    /// Matching is substring based, so `application/vnd.api+json` and
    /// `application/json; charset=utf-8` are both JSON.
    #[must_use]
    pub fn detect(value: &str) -> Option<Self> {
        let value = value.to_ascii_lowercase();
        if value.contains("json") {
            Some(Self::Json)
        } else if value.contains("multipart/form-data") {
            Some(Self::Multipart)
        } else if value.contains("application/x-www-form-urlencoded") {
            Some(Self::FormUrlEncoded)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serialize a value to a JSON string.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use fetchbase_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Cat { name: String }
///
/// let cat = Cat { name: "Tom".to_string() };
/// assert_eq!(to_json(&cat).expect("serialize"), r#"{"name":"Tom"}"#);
/// ```
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

/// Serialize a value to a form URL-encoded string.
///
/// # Errors
///
/// Returns an error if form serialization fails.
pub fn to_form<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_html_form::to_string(value).map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// # Errors
///
/// Returns an error if JSON deserialization fails, with the error message
/// including the path to the problematic field (e.g., "user.address.city").
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

/// Deserialize an already decoded JSON value, keeping path context on failure.
///
/// # Errors
///
/// Returns an error if the value does not match `T`.
pub fn from_value<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
