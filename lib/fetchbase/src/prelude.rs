//! Prelude module for convenient imports.
//!
//! ```ignore
//! use fetchbase::prelude::*;
//! ```

pub use crate::{
    CacheMode, Credentials, Error, ErrorKind, Fetch, Form, HttpClient, HyperClient, Method,
    Outcome, Part, Payload, Redirect, RequestElements, RequestMode, RequestOptions, Response,
    ResponseBody, Result, StatusCode, header,
};
pub use serde::{Deserialize, Serialize};
