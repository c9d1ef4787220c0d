//! # Transaction Engine
//!
//! Drives one EBICS transaction at a time through its phases. The engine
//! is stateless between calls: a transaction lives on the stack of the
//! `download`/`upload` future and leaves nothing behind if dropped.
//!
//! Phases inside a transaction are strictly sequential. Nothing is retried;
//! EBICS transactions are not idempotent once the institution has assigned
//! a transaction ID.
//!
//! Lifecycle gating and persistence are the caller's concern (see
//! [`crate::client::EbicsClient`]). The engine only reads the subscriber.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::subscriber::{Subscriber, SubscriberState};

use super::classifier::{classify, Outcome, Phase};
use super::codec::{EbicsResponse, MessageCodec};
use super::error::EbicsError;
use super::return_code::ReturnCode;
use super::transport::Transport;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a completed download transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Decrypted, decompressed order data.
    Success(Vec<u8>),
    /// The institution rejected the order at some phase.
    BankError(ReturnCode),
}

/// Result of a completed upload transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadOutcome {
    Success { transaction_id: String },
    BankError(ReturnCode),
}

/// Result of a key management order (INI, HIA, HPB).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyManagementOutcome {
    /// Accepted; carries the subscriber state after recording it.
    Accepted(SubscriberState),
    BankError(ReturnCode),
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct TransactionEngine {
    pub(super) codec: Arc<dyn MessageCodec>,
    pub(super) transport: Arc<dyn Transport>,
    pub(super) config: ClientConfig,
}

impl TransactionEngine {
    pub fn new(
        codec: Arc<dyn MessageCodec>,
        transport: Arc<dyn Transport>,
        config: ClientConfig,
    ) -> Self {
        Self {
            codec,
            transport,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn codec(&self) -> &dyn MessageCodec {
        self.codec.as_ref()
    }

    /// Post `request` and hand back the authenticated response.
    pub(super) async fn exchange(
        &self,
        subscriber: &Subscriber,
        phase: Phase,
        request: String,
    ) -> Result<EbicsResponse, EbicsError> {
        debug!(subscriber = %subscriber.id, %phase, bytes = request.len(), "sending request");
        let body = self.transport.send(&subscriber.ebics_url, request).await?;
        let response = self
            .codec
            .parse_response(subscriber, &body)
            .map_err(|e| EbicsError::from_codec(phase, e))?;
        debug!(
            subscriber = %subscriber.id,
            %phase,
            technical = %response.technical_return_code,
            bank = %response.bank_return_code,
            "response received"
        );
        Ok(response)
    }
}

/// Classify a response. `Ok(Some(code))` is a bank rejection.
pub(super) fn check_codes(
    phase: Phase,
    response: &EbicsResponse,
) -> Result<Option<ReturnCode>, EbicsError> {
    match classify(
        phase,
        &response.technical_return_code,
        &response.bank_return_code,
    ) {
        Outcome::Continue => Ok(None),
        Outcome::BankRejected(code) => {
            warn!(%phase, %code, "order rejected by bank");
            Ok(Some(code))
        }
        Outcome::ProtocolViolation(detail) => Err(EbicsError::violation(phase, detail)),
    }
}

/// Take a field the phase requires, or fail with a protocol violation.
pub(super) fn require<T>(phase: Phase, field: Option<T>, name: &str) -> Result<T, EbicsError> {
    field.ok_or_else(|| EbicsError::violation(phase, format!("response is missing {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_codes_maps_classifier_outcomes() {
        let ok = EbicsResponse::with_codes(ReturnCode::Ok, ReturnCode::Ok);
        assert_eq!(check_codes(Phase::Initialisation, &ok).unwrap(), None);

        let rejected = EbicsResponse::with_codes(ReturnCode::Ok, ReturnCode::AmountCheckFailed);
        assert_eq!(
            check_codes(Phase::Transfer, &rejected).unwrap(),
            Some(ReturnCode::AmountCheckFailed)
        );

        assert!(matches!(
            check_codes(Phase::Receipt, &ok),
            Err(EbicsError::ProtocolViolation {
                phase: Phase::Receipt,
                ..
            })
        ));
    }

    #[test]
    fn test_require_names_missing_field() {
        let err = require::<String>(Phase::Initialisation, None, "transaction ID").unwrap_err();
        assert!(err.to_string().contains("transaction ID"));
        assert_eq!(require(Phase::Transfer, Some(3), "x").unwrap(), 3);
    }
}
