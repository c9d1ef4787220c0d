//! Transport port.
//!
//! The engine never opens sockets itself. Callers hand it something that
//! can POST a request document to the institution's URL and return the
//! response body.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The institution could not be reached at all.
    #[error("cannot reach the bank at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// The exchange started but did not complete (timeout, reset, non-2xx).
    #[error("exchange with {url} failed: {reason}")]
    Exchange { url: String, reason: String },
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request document and return the raw response document.
    async fn send(&self, url: &str, body: String) -> Result<String, TransportError>;
}
