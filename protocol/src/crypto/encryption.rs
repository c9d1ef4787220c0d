//! # AES-256-GCM Order Data Encryption
//!
//! Order data travels encrypted under a per-transaction symmetric key (the
//! "transaction key"). The key is generated fresh for every upload and is
//! delivered by the institution, wrapped, for every download.
//!
//! ## Wire format
//!
//! [`seal`] returns `nonce || ciphertext || tag`. The first 12 bytes are the
//! random nonce. [`open`] expects exactly that layout. Because GCM
//! authenticates the whole buffer, any reordering, truncation, or bit flip
//! of the sealed bytes is rejected instead of producing garbage plaintext.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use thiserror::Error;

use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH, AES_TAG_LENGTH};

/// Errors raised by the symmetric layer.
///
/// Deliberately coarse: "wrong key" and "tampered ciphertext" look the same.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("invalid key length: expected {AES_KEY_LENGTH} bytes")]
    InvalidKeyLength,

    #[error("ciphertext too short: must be at least {} bytes", AES_NONCE_LENGTH + AES_TAG_LENGTH)]
    CiphertextTooShort,
}

/// A 256-bit symmetric transaction key.
///
/// Never printed: the `Debug` impl redacts the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct TransactionKey([u8; AES_KEY_LENGTH]);

impl TransactionKey {
    /// Draw a fresh key from the OS RNG.
    pub fn generate() -> Self {
        let mut key = [0u8; AES_KEY_LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut key);
        Self(key)
    }

    /// Wrap raw key bytes, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EncryptionError> {
        let key: [u8; AES_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| EncryptionError::InvalidKeyLength)?;
        Ok(Self(key))
    }

    /// Raw key bytes. Only the envelope layer should need these.
    pub fn as_bytes(&self) -> &[u8; AES_KEY_LENGTH] {
        &self.0
    }
}

impl From<[u8; AES_KEY_LENGTH]> for TransactionKey {
    fn from(bytes: [u8; AES_KEY_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for TransactionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TransactionKey(<redacted>)")
    }
}

/// Encrypt `plaintext` under `key` with a random nonce.
pub fn seal(key: &TransactionKey, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    seal_with_aad(key, plaintext, &[])
}

/// Encrypt with additional authenticated data bound to the ciphertext.
///
/// The AAD is not part of the output; the caller must supply the same bytes
/// to [`open_with_aad`].
pub fn seal_with_aad(
    key: &TransactionKey,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| EncryptionError::EncryptFailed)?;

    let mut nonce_bytes = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| EncryptionError::EncryptFailed)?;

    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a buffer produced by [`seal`].
pub fn open(key: &TransactionKey, sealed: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    open_with_aad(key, sealed, &[])
}

/// Decrypt a buffer produced by [`seal_with_aad`].
pub fn open_with_aad(
    key: &TransactionKey,
    sealed: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, EncryptionError> {
    if sealed.len() < AES_NONCE_LENGTH + AES_TAG_LENGTH {
        return Err(EncryptionError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(AES_NONCE_LENGTH);
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| EncryptionError::DecryptFailed)?;

    cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| EncryptionError::DecryptFailed)
}
