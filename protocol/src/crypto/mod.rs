//! # Cryptographic Primitives
//!
//! Thin, typed wrappers around audited implementations:
//!
//! - **AES-256-GCM** for order data (`encryption`).
//! - **X25519 + BLAKE3 KDF** for wrapping transaction keys (`envelope`).
//! - **Ed25519** for order signatures and request authentication (`keys`).
//! - **SHA-256** for key digests and password hashes (`hash`).
//!
//! Nothing in here knows about EBICS phases or return codes; the payload
//! pipeline composes these pieces.

pub mod encryption;
pub mod envelope;
pub mod hash;
pub mod keys;

pub use encryption::{EncryptionError, TransactionKey};
pub use envelope::{unwrap_transaction_key, wrap_transaction_key, EncryptionInfo, EnvelopeError};
pub use hash::{hash_string_sha256, public_key_digest, sha256};
pub use keys::{verify_signature, BankPublicKeys, KeyError, KeyMaterial};
