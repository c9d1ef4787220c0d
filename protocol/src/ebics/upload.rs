//! # Upload Transactions
//!
//! ```text
//!   prepare_upload_payload ──► EncryptionInfo + signature data + segments[0..n]
//!   INIT ──► transaction ID
//!   TRANSFER(chunk 0) … TRANSFER(chunk n-1)
//! ```
//!
//! Uploads have no receipt phase. A failure at any point abandons the
//! transaction; there is no partial success.

use tracing::info;

use crate::payload::prepare_upload_payload;
use crate::subscriber::{OrderType, Subscriber};

use super::classifier::Phase;
use super::codec::OrderParams;
use super::engine::{check_codes, require, TransactionEngine, UploadOutcome};
use super::error::EbicsError;

impl TransactionEngine {
    /// Run a complete upload transaction carrying `payload`.
    ///
    /// The institution's encryption key must be known (HPB); otherwise this
    /// fails with a configuration error before anything is sent.
    pub async fn upload(
        &self,
        subscriber: &Subscriber,
        order_type: &OrderType,
        params: &OrderParams,
        payload: &[u8],
    ) -> Result<UploadOutcome, EbicsError> {
        let bank_keys = subscriber.bank_keys.as_ref().ok_or_else(|| {
            EbicsError::Configuration("bank encryption key unknown, request HPB first".into())
        })?;

        let prepared = prepare_upload_payload(
            subscriber.keys.signature_key(),
            bank_keys,
            payload,
            self.config.segment_size,
        )?;
        info!(
            subscriber = %subscriber.id,
            %order_type,
            segments = prepared.num_segments(),
            "starting upload transaction"
        );

        // -- Initialisation ---------------------------------------------------
        let phase = Phase::Initialisation;
        let request = self
            .codec
            .build_upload_init(subscriber, order_type, params, &prepared)
            .map_err(|e| EbicsError::from_codec(phase, e))?;
        let init = self.exchange(subscriber, phase, request).await?;
        if let Some(code) = check_codes(phase, &init)? {
            return Ok(UploadOutcome::BankError(code));
        }
        let transaction_id = require(phase, init.transaction_id, "transaction ID")?;

        // -- Transfer -----------------------------------------------------------
        let phase = Phase::Transfer;
        for chunk_index in 0..prepared.num_segments() {
            let request = self
                .codec
                .build_upload_transfer(subscriber, &transaction_id, &prepared, chunk_index)
                .map_err(|e| EbicsError::from_codec(phase, e))?;
            let transfer = self.exchange(subscriber, phase, request).await?;
            if let Some(code) = check_codes(phase, &transfer)? {
                return Ok(UploadOutcome::BankError(code));
            }
        }

        info!(%transaction_id, "upload complete");
        Ok(UploadOutcome::Success { transaction_id })
    }
}
