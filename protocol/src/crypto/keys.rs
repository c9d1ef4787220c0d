//! # Key Material
//!
//! Every EBICS subscriber holds three private keys:
//!
//! | Slot           | Order type | Algorithm | Purpose                              |
//! |----------------|------------|-----------|--------------------------------------|
//! | signature      | INI        | Ed25519   | electronic signature over order data |
//! | authorization  | HIA        | Ed25519   | request identification/authentication|
//! | encryption     | HIA        | X25519    | unwrapping download transaction keys |
//!
//! The institution publishes its own encryption and authentication public
//! keys through HPB; they are stored as [`BankPublicKeys`].
//!
//! Raw key bytes are never logged. Both key types redact themselves in
//! `Debug` output.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use crate::config::{PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, SIGNATURE_LENGTH};

use super::hash::public_key_digest;

/// Errors that can occur while decoding keys.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret key bytes: expected {SECRET_KEY_LENGTH} bytes")]
    InvalidSecretKey,

    #[error("invalid public key bytes: expected {PUBLIC_KEY_LENGTH} bytes")]
    InvalidPublicKey,
}

/// 32 bytes of private key material for one slot of the key set.
///
/// The same byte layout serves both algorithms: an Ed25519 seed or an
/// X25519 scalar. The accessor chosen by the slot decides how the bytes are
/// interpreted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMaterial([u8; SECRET_KEY_LENGTH]);

impl KeyMaterial {
    /// Fresh random key material from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_KEY_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wrap existing key bytes.
    pub fn from_bytes(bytes: [u8; SECRET_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse hex-encoded key bytes (e.g. from an import file).
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSecretKey)?;
        let bytes: [u8; SECRET_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self(bytes))
    }

    /// Raw bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_LENGTH] {
        &self.0
    }

    /// Interpret the material as an Ed25519 signing key.
    pub fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.0)
    }

    /// Interpret the material as an X25519 static secret.
    pub fn encryption_secret(&self) -> StaticSecret {
        StaticSecret::from(self.0)
    }

    /// Ed25519 public key for this material.
    pub fn signing_public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.signing_key().verifying_key().to_bytes()
    }

    /// X25519 public key for this material.
    pub fn encryption_public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        X25519PublicKey::from(&self.encryption_secret()).to_bytes()
    }

    /// Sign `message` with the material as an Ed25519 key.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key().sign(message).to_bytes()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial(<redacted>)")
    }
}

/// Verify an Ed25519 signature against a raw public key.
///
/// Returns `false` for malformed keys or signatures instead of erroring;
/// callers only ever need a yes/no.
pub fn verify_signature(public_key: &[u8; PUBLIC_KEY_LENGTH], message: &[u8], signature: &[u8]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    verifying_key.verify(message, &signature).is_ok()
}

/// The institution's public keys, learned through HPB.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankPublicKeys {
    /// X25519 key that upload transaction keys are wrapped for.
    pub encryption: [u8; PUBLIC_KEY_LENGTH],
    /// Ed25519 key the institution signs responses with.
    pub authentication: [u8; PUBLIC_KEY_LENGTH],
}

impl BankPublicKeys {
    /// Build from byte slices, checking lengths.
    pub fn from_slices(encryption: &[u8], authentication: &[u8]) -> Result<Self, KeyError> {
        Ok(Self {
            encryption: encryption
                .try_into()
                .map_err(|_| KeyError::InvalidPublicKey)?,
            authentication: authentication
                .try_into()
                .map_err(|_| KeyError::InvalidPublicKey)?,
        })
    }

    /// Digest of the encryption key, used to address wrapped keys.
    pub fn encryption_digest(&self) -> [u8; 32] {
        public_key_digest(&self.encryption)
    }
}
