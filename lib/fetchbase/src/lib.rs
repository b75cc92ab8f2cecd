//! Base client for typed HTTP APIs.
//!
//! [`Fetch`] holds what every call to an API shares: a base URL, default
//! headers, fetch-style transport options, a global payload merged into
//! every body, and error middlewares keyed by [`ErrorKind`].
//!
//! # Example
//!
//! ```ignore
//! use fetchbase::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let mut fetch = Fetch::with_default_client("https://api.example.com")?;
//! fetch
//!     .set_auth_token("Bearer", "secret")?
//!     .set_error_middleware(ErrorKind::Unauthorized, |_| tracing::warn!("logged out"));
//!
//! let user: User = fetch.get("/users/42", RequestElements::new()).await?;
//! ```

mod client;
mod fetch;
pub mod middleware;
pub mod prelude;

pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use fetch::{Fetch, Outcome};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use fetchbase_core::{
    Body, BodyPolicy, CacheMode, ClientDefaults, ContentType, Credentials, Error, ErrorKind,
    ErrorMiddleware, ErrorMiddlewares, Form, HttpClient, Method, Part, Payload, Redirect, Request,
    RequestElements, RequestMode, RequestOptions, Response, ResponseBody, Result, classify,
    from_json, join_url, to_form, to_json,
};

// Re-export http types for status codes and headers
pub use fetchbase_core::{HeaderMap, HeaderValue, StatusCode, header};

pub use url;
