//! Tower middleware for [`HyperClient`](crate::HyperClient).
//!
//! Transport middleware wraps the raw exchange, before any status
//! classification. Error middlewares, which react to classified error
//! kinds, are registered on [`Fetch`](crate::Fetch) instead.
//!
//! # Example
//!
//! ```ignore
//! use fetchbase::HyperClient;
//! use fetchbase::middleware::LoggingLayer;
//!
//! let client = HyperClient::builder()
//!     .layer(LoggingLayer::debug())
//!     .build();
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
