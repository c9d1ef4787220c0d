//! # Order Data Pipeline
//!
//! ```text
//! upload:   plaintext ─► zlib ─► AES-GCM(tk) ─► base64 ─► segments[0..n]
//!                                   │
//!                         tk wrapped for bank encryption key ─► EncryptionInfo
//!
//! download: segments (in order) ─► join ─► base64⁻¹ ─► AES-GCM⁻¹(tk) ─► zlib⁻¹
//!                                                   ▲
//!                     EncryptionInfo unwrapped with subscriber key
//! ```
//!
//! Uploads additionally carry the subscriber's order signature: an Ed25519
//! signature over the SHA-256 of the plaintext, compressed and sealed under
//! the same transaction key.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use x25519_dalek::StaticSecret;

use crate::crypto::encryption::{self, TransactionKey};
use crate::crypto::envelope::{unwrap_transaction_key, wrap_transaction_key, EncryptionInfo};
use crate::crypto::hash::sha256_array;
use crate::crypto::keys::{BankPublicKeys, KeyMaterial};

use super::compression::{compress, decompress};
use super::error::PayloadError;
use super::segment::{join_segments, split_segments};

/// Upper bound for an inflated signature blob.
const MAX_SIGNATURE_DATA_SIZE: usize = 64 * 1024;

/// Everything an upload transaction needs to put on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedUploadData {
    /// Transaction key wrapped for the institution.
    pub encryption_info: EncryptionInfo,
    /// Base64 of the sealed, compressed order signature.
    pub encrypted_signature_data: String,
    /// SHA-256 of the plaintext order data.
    pub data_digest: [u8; 32],
    /// Base64 order data segments, transmitted with chunk index 0..n.
    pub segments: Vec<String>,
}

impl PreparedUploadData {
    /// Number of transfer phases the upload needs.
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Segment for a given chunk index.
    pub fn segment(&self, chunk_index: usize) -> Option<&str> {
        self.segments.get(chunk_index).map(String::as_str)
    }
}

/// Compress, sign, encrypt, and segment `payload` for the institution.
pub fn prepare_upload_payload(
    signature_key: &KeyMaterial,
    bank_keys: &BankPublicKeys,
    payload: &[u8],
    segment_size: usize,
) -> Result<PreparedUploadData, PayloadError> {
    let transaction_key = TransactionKey::generate();
    let encryption_info = wrap_transaction_key(&transaction_key, &bank_keys.encryption)?;

    let data_digest = sha256_array(payload);
    let signature = signature_key.sign(&data_digest);
    let sealed_signature = encryption::seal(&transaction_key, &compress(&signature)?)?;

    let sealed_order_data = encryption::seal(&transaction_key, &compress(payload)?)?;
    let encoded = BASE64_STANDARD.encode(sealed_order_data);

    Ok(PreparedUploadData {
        encryption_info,
        encrypted_signature_data: BASE64_STANDARD.encode(sealed_signature),
        data_digest,
        segments: split_segments(&encoded, segment_size),
    })
}

/// Reassemble, decrypt, and inflate downloaded order data.
///
/// `segments` must be in the order the institution sent them.
pub fn decrypt_and_decompress<S: AsRef<str>>(
    encryption_secret: &StaticSecret,
    encryption_info: &EncryptionInfo,
    segments: &[S],
    max_order_data_size: usize,
) -> Result<Vec<u8>, PayloadError> {
    let transaction_key = unwrap_transaction_key(encryption_secret, encryption_info)?;
    let sealed = decode_segments(segments)?;
    let compressed = encryption::open(&transaction_key, &sealed)?;
    decompress(&compressed, max_order_data_size)
}

/// Recover the order signature from a prepared upload, as the institution
/// would. Returns the raw Ed25519 signature bytes.
pub fn open_signature_data(
    recipient_secret: &StaticSecret,
    prepared: &PreparedUploadData,
) -> Result<Vec<u8>, PayloadError> {
    let transaction_key = unwrap_transaction_key(recipient_secret, &prepared.encryption_info)?;
    let sealed = BASE64_STANDARD
        .decode(prepared.encrypted_signature_data.as_bytes())
        .map_err(|e| PayloadError::Encoding(e.to_string()))?;
    let compressed = encryption::open(&transaction_key, &sealed)?;
    decompress(&compressed, MAX_SIGNATURE_DATA_SIZE)
}

fn decode_segments<S: AsRef<str>>(segments: &[S]) -> Result<Vec<u8>, PayloadError> {
    let joined = join_segments(segments)?;
    BASE64_STANDARD
        .decode(joined.as_bytes())
        .map_err(|e| PayloadError::Encoding(e.to_string()))
}
