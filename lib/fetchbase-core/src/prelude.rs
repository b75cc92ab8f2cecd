//! Prelude module for convenient imports.
//!
//! ```ignore
//! use fetchbase_core::prelude::*;
//! ```

pub use crate::{
    Body, ClientDefaults, Credentials, Error, ErrorKind, ErrorMiddlewares, Form, HttpClient,
    Method, Part, Payload, Request, RequestElements, RequestMode, RequestOptions, Response,
    ResponseBody, Result, classify,
};
