//! Fetching JSON documents from metrics endpoints.
//!
//! A [`Source`] produces one document per call. HTTP endpoints are served by
//! [`HttpSource`], newline-delimited JSON on stdin by [`LineSource`]. Each
//! endpoint is driven by its own worker thread (see [`worker`]) so a slow or
//! hung endpoint never blocks the others or the UI.

mod http;
mod lines;
pub mod mock;
mod path;
pub mod worker;

pub use http::HttpSource;
pub use lines::LineSource;
pub use path::{ExtractionError, FieldPath, PathSyntaxError, Segment, value_kind};
pub use worker::{FetchOutcome, Reading, WorkerPool, extract_readings};

use crate::config::{EndpointConfig, SourceKind};

/// Parsed JSON document returned by an endpoint.
pub type Document = serde_json::Value;

/// Failure to obtain a document. Never fatal: the next tick tries again.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection, DNS, TLS or I/O failure.
    Network(String),
    /// Non-2xx HTTP status.
    Status(u16),
    /// Request exceeded the endpoint timeout.
    Timeout,
    /// Response body is not valid JSON.
    Malformed(String),
    /// Source has no more documents.
    Closed,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "network error: {}", msg),
            FetchError::Status(code) => write!(f, "HTTP status {}", code),
            FetchError::Timeout => write!(f, "timed out"),
            FetchError::Malformed(msg) => write!(f, "malformed JSON: {}", msg),
            FetchError::Closed => write!(f, "source closed"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Producer of JSON documents.
pub trait Source: Send {
    /// Fetches the next document.
    fn fetch(&mut self) -> Result<Document, FetchError>;

    /// `true` when the source must be polled on the endpoint interval;
    /// `false` when `fetch` blocks until the next document arrives.
    fn is_periodic(&self) -> bool {
        true
    }
}

/// Opens the source described by an endpoint.
pub fn open_source(endpoint: &EndpointConfig) -> Result<Box<dyn Source>, FetchError> {
    match &endpoint.source {
        SourceKind::Http(url) => Ok(Box::new(HttpSource::new(url, endpoint)?)),
        SourceKind::Stdin => Ok(Box::new(LineSource::stdin())),
    }
}
