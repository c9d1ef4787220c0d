//! # Transaction Key Envelope
//!
//! Order data is encrypted under a random transaction key. That key then
//! travels inside an envelope addressed to the recipient's long-term X25519
//! encryption key: the institution's key for uploads, the subscriber's key
//! for downloads.
//!
//! ## Construction
//!
//! ```text
//! eph            = fresh X25519 secret
//! shared         = X25519(eph, recipient_pub)
//! kek            = BLAKE3-derive-key(context, shared || eph_pub || recipient_pub)
//! wrapped_key    = AES-256-GCM(kek, transaction_key, aad = SHA-256(recipient_pub))
//! ```
//!
//! The recipient recomputes `shared` from its static secret and `eph_pub`.
//! The SHA-256 digest of the recipient key is carried in the clear so that
//! an envelope addressed to someone else is rejected before any decryption
//! is attempted, and it is bound into the AEAD so it cannot be swapped.

use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

use crate::config::{AES_KEY_LENGTH, PUBLIC_KEY_LENGTH, TRANSACTION_KEY_WRAP_CONTEXT};

use super::encryption::{self, EncryptionError, TransactionKey};
use super::hash::public_key_digest;

/// Errors raised while wrapping or unwrapping a transaction key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("envelope is addressed to a different encryption key")]
    RecipientMismatch,

    #[error("transaction key unwrap failed: {0}")]
    Unwrap(EncryptionError),

    #[error("transaction key wrap failed: {0}")]
    Wrap(EncryptionError),
}

/// The wrapped transaction key plus everything the recipient needs to
/// unwrap it. Sent once per transaction, in the initialisation phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionInfo {
    /// Sender's one-time X25519 public key.
    pub ephemeral_public_key: [u8; PUBLIC_KEY_LENGTH],
    /// `nonce || ciphertext || tag` of the transaction key.
    pub wrapped_key: Vec<u8>,
    /// SHA-256 of the recipient's encryption public key.
    pub recipient_key_digest: [u8; 32],
}

/// Wrap `key` for the holder of `recipient_public`.
pub fn wrap_transaction_key(
    key: &TransactionKey,
    recipient_public: &[u8; PUBLIC_KEY_LENGTH],
) -> Result<EncryptionInfo, EnvelopeError> {
    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = PublicKey::from(&ephemeral).to_bytes();
    let shared = ephemeral.diffie_hellman(&PublicKey::from(*recipient_public));

    let kek = derive_key_encryption_key(shared.as_bytes(), &ephemeral_public, recipient_public);
    let digest = public_key_digest(recipient_public);
    let wrapped_key = encryption::seal_with_aad(&kek, key.as_bytes(), &digest)
        .map_err(EnvelopeError::Wrap)?;

    Ok(EncryptionInfo {
        ephemeral_public_key: ephemeral_public,
        wrapped_key,
        recipient_key_digest: digest,
    })
}

/// Recover the transaction key from `info` with the recipient's secret.
pub fn unwrap_transaction_key(
    recipient_secret: &StaticSecret,
    info: &EncryptionInfo,
) -> Result<TransactionKey, EnvelopeError> {
    let recipient_public = PublicKey::from(recipient_secret).to_bytes();
    if public_key_digest(&recipient_public) != info.recipient_key_digest {
        return Err(EnvelopeError::RecipientMismatch);
    }

    let shared = recipient_secret.diffie_hellman(&PublicKey::from(info.ephemeral_public_key));
    let kek = derive_key_encryption_key(
        shared.as_bytes(),
        &info.ephemeral_public_key,
        &recipient_public,
    );
    let raw = encryption::open_with_aad(&kek, &info.wrapped_key, &info.recipient_key_digest)
        .map_err(EnvelopeError::Unwrap)?;
    TransactionKey::from_slice(&raw).map_err(EnvelopeError::Unwrap)
}

fn derive_key_encryption_key(
    shared_secret: &[u8; 32],
    ephemeral_public: &[u8; PUBLIC_KEY_LENGTH],
    recipient_public: &[u8; PUBLIC_KEY_LENGTH],
) -> TransactionKey {
    let mut hasher = blake3::Hasher::new_derive_key(TRANSACTION_KEY_WRAP_CONTEXT);
    hasher.update(shared_secret);
    hasher.update(ephemeral_public);
    hasher.update(recipient_public);

    let mut kek = [0u8; AES_KEY_LENGTH];
    hasher.finalize_xof().fill(&mut kek);
    TransactionKey::from(kek)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyMaterial;

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let recipient = KeyMaterial::generate();
        let key = TransactionKey::generate();

        let info = wrap_transaction_key(&key, &recipient.encryption_public_key()).unwrap();
        let recovered = unwrap_transaction_key(&recipient.encryption_secret(), &info).unwrap();
        assert_eq!(recovered, key);
    }

    #[test]
    fn test_each_wrap_uses_fresh_ephemeral_key() {
        let recipient = KeyMaterial::generate();
        let key = TransactionKey::generate();
        let a = wrap_transaction_key(&key, &recipient.encryption_public_key()).unwrap();
        let b = wrap_transaction_key(&key, &recipient.encryption_public_key()).unwrap();
        assert_ne!(a.ephemeral_public_key, b.ephemeral_public_key);
        assert_ne!(a.wrapped_key, b.wrapped_key);
    }

    #[test]
    fn test_wrong_recipient_rejected_by_digest() {
        let recipient = KeyMaterial::generate();
        let stranger = KeyMaterial::generate();
        let info =
            wrap_transaction_key(&TransactionKey::generate(), &recipient.encryption_public_key())
                .unwrap();

        assert_eq!(
            unwrap_transaction_key(&stranger.encryption_secret(), &info),
            Err(EnvelopeError::RecipientMismatch)
        );
    }

    #[test]
    fn test_tampered_wrapped_key_rejected() {
        let recipient = KeyMaterial::generate();
        let mut info =
            wrap_transaction_key(&TransactionKey::generate(), &recipient.encryption_public_key())
                .unwrap();
        let last = info.wrapped_key.len() - 1;
        info.wrapped_key[last] ^= 0x80;

        assert!(matches!(
            unwrap_transaction_key(&recipient.encryption_secret(), &info),
            Err(EnvelopeError::Unwrap(_))
        ));
    }

    #[test]
    fn test_swapped_ephemeral_key_rejected() {
        let recipient = KeyMaterial::generate();
        let mut info =
            wrap_transaction_key(&TransactionKey::generate(), &recipient.encryption_public_key())
                .unwrap();
        info.ephemeral_public_key = KeyMaterial::generate().encryption_public_key();

        assert!(unwrap_transaction_key(&recipient.encryption_secret(), &info).is_err());
    }
}
