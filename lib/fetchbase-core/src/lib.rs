//! Core types for fetchbase API clients.
//!
//! This crate holds the two halves of every call, independent of any
//! transport:
//! - [`ClientDefaults::build`] - merges client defaults with per-call
//!   [`RequestElements`] into a [`Request`]
//! - [`classify`] - turns a [`Response`] into a [`ResponseBody`] or an
//!   [`Error::Http`], running the registered [`ErrorMiddlewares`]
//!
//! Supporting types:
//! - [`Method`] - HTTP method enum
//! - [`Payload`], [`Form`] and [`Part`] - per-call payloads
//! - [`RequestOptions`] - fetch-style transport options
//! - [`ErrorKind`], [`Error`] and [`Result`] - error handling
//! - [`HttpClient`] - the transport trait

mod body;
mod builder;
mod classify;
mod client;
mod error;
mod method;
mod multipart;
mod options;
mod payload;
pub mod prelude;
mod request;
mod response;

pub use body::{ContentType, from_json, from_value, to_form, to_json};
pub use builder::{ClientDefaults, join_url};
pub use classify::{ErrorMiddleware, ErrorMiddlewares, classify};
pub use client::HttpClient;
pub use error::{Error, ErrorKind, Result};
pub use method::{BodyPolicy, Method};
pub use multipart::{Form, Part};
pub use options::{CacheMode, Credentials, Redirect, RequestMode, RequestOptions};
pub use payload::Payload;
pub use request::{Body, Request, RequestElements};
pub use response::{Response, ResponseBody};

// Re-export http crate types for status codes and headers
pub use http::{HeaderMap, HeaderValue, StatusCode, header};
