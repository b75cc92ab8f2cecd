//! Error types for fetchbase.

use derive_more::{Display, Error, From};

use crate::ResponseBody;

// ============================================================================
// Error Kind
// ============================================================================

/// Classification of an HTTP error response.
///
/// Derived from the response status code with [`ErrorKind::from_status`]:
///
/// | Status | Kind |
/// |--------|------|
/// | 400 | [`BadRequest`](ErrorKind::BadRequest) |
/// | 401 | [`Unauthorized`](ErrorKind::Unauthorized) |
/// | 403 | [`Forbidden`](ErrorKind::Forbidden) |
/// | 404 | [`NotFound`](ErrorKind::NotFound) |
/// | 500 | [`Server`](ErrorKind::Server) |
/// | 503 | [`Maintenance`](ErrorKind::Maintenance) |
/// | anything else | [`Unknown`](ErrorKind::Unknown) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    /// 400 Bad Request.
    #[display("bad request")]
    BadRequest,
    /// 401 Unauthorized.
    #[display("unauthorized")]
    Unauthorized,
    /// 403 Forbidden.
    #[display("forbidden")]
    Forbidden,
    /// 404 Not Found.
    #[display("not found")]
    NotFound,
    /// 500 Internal Server Error.
    #[display("server error")]
    Server,
    /// 503 Service Unavailable.
    #[display("maintenance")]
    Maintenance,
    /// Any other status, including `0`.
    #[display("unknown error")]
    Unknown,
}

impl ErrorKind {
    /// Every error kind, in table order.
    pub const ALL: [Self; 7] = [
        Self::BadRequest,
        Self::Unauthorized,
        Self::Forbidden,
        Self::NotFound,
        Self::Server,
        Self::Maintenance,
        Self::Unknown,
    ];

    /// Look up the kind for a status code.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500 => Self::Server,
            503 => Self::Maintenance,
            _ => Self::Unknown,
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for fetchbase operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The server answered with a status outside `[100, 300)`.
    #[display("HTTP error {status} ({kind})")]
    #[from(skip)]
    Http {
        /// Kind derived from the status code.
        kind: ErrorKind,
        /// HTTP status code.
        status: u16,
        /// Decoded response body.
        #[error(not(source))]
        body: ResponseBody,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// Header name rejected by the `http` crate.
    #[display("invalid header name: {_0}")]
    #[from]
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Header value rejected by the `http` crate.
    #[display("invalid header value: {_0}")]
    #[from]
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// Form URL-encoded serialization error.
    #[display("form serialization error: {_0}")]
    #[from]
    FormSerialization(serde_html_form::ser::Error),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error, deriving the kind from the status code.
    #[must_use]
    pub const fn http(status: u16, body: ResponseBody) -> Self {
        Self::Http {
            kind: ErrorKind::from_status(status),
            status,
            body,
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns the error kind if this is an HTTP error.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Http { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ErrorKind::NotFound)
    }

    /// Returns `true` if this is a 401 Unauthorized error.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.kind() == Some(ErrorKind::Unauthorized)
    }

    /// Returns the decoded response body if this is an HTTP error.
    #[must_use]
    pub const fn body(&self) -> Option<&ResponseBody> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Try to deserialize the HTTP error body.
    ///
    /// Returns `None` if this is not an HTTP error.
    ///
    /// # Example
    ///
    /// ```ignore
    /// #[derive(Debug, Deserialize)]
    /// struct ApiError {
    ///     msg: String,
    /// }
    ///
    /// if let Err(err) = client.get_cat("nope").await {
    ///     if let Some(Ok(api_error)) = err.decode_body::<ApiError>() {
    ///         eprintln!("API error: {}", api_error.msg);
    ///     }
    /// }
    /// ```
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(ResponseBody::deserialize)
    }
}
