//! Error type for EBICS transactions.
//!
//! Bank rejections are not errors; they come back as the `BankError`
//! variant of an outcome. Everything here means the attempt failed for a
//! reason the institution did not decide.

use thiserror::Error;

use crate::payload::PayloadError;
use crate::storage::DbError;
use crate::subscriber::LifecycleError;

use super::classifier::Phase;
use super::codec::CodecError;
use super::transport::TransportError;

/// Coarse classification for callers that branch on failure type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    ProtocolViolation,
    Configuration,
    Crypto,
    Storage,
}

#[derive(Debug, Error)]
pub enum EbicsError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// Unexpected technical code, missing field, or unauthenticated response.
    #[error("protocol violation in {phase} phase: {detail}")]
    ProtocolViolation { phase: Phase, detail: String },

    /// Local data makes the request impossible (unknown subscriber, missing
    /// bank keys, unbuildable request).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The subscriber's key states do not permit the operation.
    #[error("lifecycle precondition failed: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("payload crypto failure: {0}")]
    Crypto(#[from] PayloadError),

    #[error("storage failure: {0}")]
    Storage(#[from] DbError),
}

impl EbicsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EbicsError::Transport(_) => ErrorKind::Transport,
            EbicsError::ProtocolViolation { .. } => ErrorKind::ProtocolViolation,
            EbicsError::Configuration(_) | EbicsError::Lifecycle(_) => ErrorKind::Configuration,
            EbicsError::Crypto(_) => ErrorKind::Crypto,
            EbicsError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Whether an API layer should surface this as a server-side failure.
    ///
    /// Configuration errors are the caller's to fix (e.g. "request HPB
    /// first") and are not internal.
    pub fn is_internal(&self) -> bool {
        self.kind() != ErrorKind::Configuration
    }

    pub(crate) fn violation(phase: Phase, detail: impl Into<String>) -> Self {
        EbicsError::ProtocolViolation {
            phase,
            detail: detail.into(),
        }
    }

    /// Map a codec failure: build errors are local, parse and
    /// authentication errors are the response's fault.
    pub(crate) fn from_codec(phase: Phase, err: CodecError) -> Self {
        match err {
            CodecError::Build(reason) => EbicsError::Configuration(reason),
            other => EbicsError::violation(phase, other.to_string()),
        }
    }
}
