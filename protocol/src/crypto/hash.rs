//! # Hashing Utilities
//!
//! SHA-256 is the only digest EBICS itself needs: public key digests
//! (printed on the initialisation letter and echoed in `EncryptionInfo`)
//! and password hashes for local API users. BLAKE3 is used internally as a
//! KDF by the envelope layer and never leaves the process.

use sha2::{Digest, Sha256};

/// SHA-256 of `data` as a `Vec<u8>`.
pub fn sha256(data: &[u8]) -> Vec<u8> {
    sha256_array(data).to_vec()
}

/// SHA-256 of `data` as a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Digest that identifies a public key on the wire and on the
/// initialisation letter.
pub fn public_key_digest(public_key: &[u8]) -> [u8; 32] {
    sha256_array(public_key)
}

/// Hash a UTF-8 string, e.g. a password.
pub fn hash_string_sha256(input: &str) -> [u8; 32] {
    sha256_array(input.as_bytes())
}

/// Render a digest the way the initialisation letter prints it: upper-case
/// hex in space-separated byte pairs.
pub fn letter_fingerprint(digest: &[u8]) -> String {
    digest
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
