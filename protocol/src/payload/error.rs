//! Error type for the payload pipeline.
//!
//! Every variant is fatal for the transaction that produced it: a payload
//! that fails to decode, unwrap, decrypt, or inflate is never partially
//! accepted.

use thiserror::Error;

use crate::crypto::{EncryptionError, EnvelopeError};

/// Failures while preparing or opening order data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// The transaction key could not be recovered.
    #[error("transaction key: {0}")]
    Envelope(#[from] EnvelopeError),

    /// AES-GCM rejected the reassembled ciphertext.
    #[error("order data: {0}")]
    Encryption(#[from] EncryptionError),

    /// The concatenated segments are not valid base64.
    #[error("order data is not valid base64: {0}")]
    Encoding(String),

    #[error("compression failed: {0}")]
    Compression(String),

    #[error("decompression failed: {0}")]
    Decompression(String),

    /// Inflated output crossed the configured bound.
    #[error("decompressed order data exceeds {limit} bytes")]
    OrderDataTooLarge {
        /// Configured bound in bytes.
        limit: usize,
    },

    /// A download produced no segments at all.
    #[error("no order data segments to reassemble")]
    NoSegments,
}
