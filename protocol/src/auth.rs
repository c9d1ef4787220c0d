//! # Local API Users
//!
//! The nexus exposes a local API guarded by HTTP basic auth. Users are
//! stored with the SHA-256 of their password; the header's password is
//! hashed the same way and compared.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::hash::hash_string_sha256;
use crate::storage::{DbError, EbicsDb};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header is not basic auth")]
    NotBasicAuth,

    #[error("malformed basic auth credentials: {0}")]
    MalformedCredentials(String),

    #[error("unknown user or wrong password")]
    BadCredentials,

    #[error("user store failure: {0}")]
    Storage(#[from] DbError),
}

/// A user of the local API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NexusUser {
    pub username: String,
    pub password_hash: [u8; 32],
    pub superuser: bool,
}

impl NexusUser {
    pub fn new(username: impl Into<String>, password: &str, superuser: bool) -> Self {
        Self {
            username: username.into(),
            password_hash: hash_string_sha256(password),
            superuser,
        }
    }
}

/// Split `Basic base64(user:password)` into the username and the SHA-256
/// of the password.
pub fn extract_user_and_hashed_password(
    authorization_header: &str,
) -> Result<(String, [u8; 32]), AuthError> {
    let encoded = authorization_header
        .trim()
        .strip_prefix("Basic ")
        .ok_or(AuthError::NotBasicAuth)?;
    let decoded = BASE64_STANDARD
        .decode(encoded.trim())
        .map_err(|e| AuthError::MalformedCredentials(e.to_string()))?;
    let credentials = String::from_utf8(decoded)
        .map_err(|_| AuthError::MalformedCredentials("not UTF-8".into()))?;
    let (username, password) = credentials
        .split_once(':')
        .ok_or_else(|| AuthError::MalformedCredentials("missing ':' separator".into()))?;
    Ok((username.to_string(), hash_string_sha256(password)))
}

/// Check a basic auth header against the stored users.
pub fn authenticate(db: &EbicsDb, authorization_header: &str) -> Result<NexusUser, AuthError> {
    let (username, password_hash) = extract_user_and_hashed_password(authorization_header)?;
    match db.get_user(&username)? {
        Some(user) if user.password_hash == password_hash => Ok(user),
        _ => Err(AuthError::BadCredentials),
    }
}
