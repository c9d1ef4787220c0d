//! # Protocol Configuration & Constants
//!
//! Every EBICS constant the engine relies on lives here, next to the
//! runtime [`ClientConfig`] that callers may tune. Return codes are not
//! here; they have their own closed enum in [`crate::ebics::return_code`].

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// EBICS schema version spoken by this client.
pub const EBICS_VERSION: &str = "H004";

/// Protocol revision paired with [`EBICS_VERSION`].
pub const EBICS_REVISION: u32 = 1;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Signature key algorithm used for order signatures (INI).
pub const SIGNATURE_ALGORITHM: &str = "Ed25519";

/// Authorization (identification and authentication) key algorithm (HIA).
pub const AUTHORIZATION_ALGORITHM: &str = "Ed25519";

/// Encryption key algorithm used to wrap transaction keys (HIA / HPB).
pub const ENCRYPTION_ALGORITHM: &str = "X25519";

/// Symmetric cipher for order data.
pub const SYMMETRIC_ALGORITHM: &str = "AES-256-GCM";

/// Length of every private key slot in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Length of every public key in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// AES-256-GCM key length in bytes. Also the transaction key length.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes.
pub const AES_NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const AES_TAG_LENGTH: usize = 16;

/// Ed25519 signature length.
pub const SIGNATURE_LENGTH: usize = 64;

/// BLAKE3 `derive_key` context for wrapping transaction keys.
pub const TRANSACTION_KEY_WRAP_CONTEXT: &str = "ebics-client 2026 transaction key wrap v1";

// ---------------------------------------------------------------------------
// Transport Limits
// ---------------------------------------------------------------------------

/// Maximum size of one order data segment, measured in base64 characters.
///
/// EBICS caps a segment at 1 MiB of encoded order data.
pub const DEFAULT_SEGMENT_SIZE: usize = 1024 * 1024;

/// Upper bound for decompressed order data. Anything larger is treated as
/// a decompression bomb and rejected.
pub const DEFAULT_MAX_ORDER_DATA_SIZE: usize = 256 * 1024 * 1024;

/// Maximum number of segments a single download may announce.
pub const MAX_DOWNLOAD_SEGMENTS: u32 = 10_000;

// ---------------------------------------------------------------------------
// Runtime Configuration
// ---------------------------------------------------------------------------

/// Tunables for a running client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Maximum base64 characters per upload segment.
    pub segment_size: usize,
    /// Upper bound for decompressed download payloads.
    pub max_order_data_size: usize,
    /// Upper bound for the segment count a download may announce.
    pub max_download_segments: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            segment_size: DEFAULT_SEGMENT_SIZE,
            max_order_data_size: DEFAULT_MAX_ORDER_DATA_SIZE,
            max_download_segments: MAX_DOWNLOAD_SEGMENTS,
        }
    }
}

impl ClientConfig {
    /// Override the upload segment size. A size of zero is clamped to one
    /// character so segmentation always makes progress.
    pub fn with_segment_size(mut self, segment_size: usize) -> Self {
        self.segment_size = segment_size.max(1);
        self
    }

    /// Override the decompression bound.
    pub fn with_max_order_data_size(mut self, max: usize) -> Self {
        self.max_order_data_size = max;
        self
    }
}
