//! # Download Transactions
//!
//! ```text
//!   INIT ──► segment 1 + EncryptionInfo + transaction ID + segment count n
//!   TRANSFER(2) … TRANSFER(n) ──► segments 2..n
//!   decrypt_and_decompress(segments in order)
//!   RECEIPT ──► must answer EBICS_DOWNLOAD_POSTPROCESS_DONE
//! ```
//!
//! The receipt is only sent once the payload decrypted, so the institution
//! never marks data as fetched that the subscriber could not read.

use tracing::info;

use crate::payload::decrypt_and_decompress;
use crate::subscriber::{OrderType, Subscriber};

use super::classifier::Phase;
use super::codec::OrderParams;
use super::engine::{check_codes, require, DownloadOutcome, TransactionEngine};
use super::error::EbicsError;

impl TransactionEngine {
    /// Run a complete download transaction for `order_type`.
    pub async fn download(
        &self,
        subscriber: &Subscriber,
        order_type: &OrderType,
        params: &OrderParams,
    ) -> Result<DownloadOutcome, EbicsError> {
        info!(subscriber = %subscriber.id, %order_type, "starting download transaction");

        // -- Initialisation ---------------------------------------------------
        let phase = Phase::Initialisation;
        let request = self
            .codec
            .build_download_init(subscriber, order_type, params)
            .map_err(|e| EbicsError::from_codec(phase, e))?;
        let init = self.exchange(subscriber, phase, request).await?;
        if let Some(code) = check_codes(phase, &init)? {
            return Ok(DownloadOutcome::BankError(code));
        }

        let transaction_id = require(phase, init.transaction_id, "transaction ID")?;
        let encryption_info = require(phase, init.encryption_info, "encryption info")?;
        let first_segment = require(phase, init.order_data_chunk, "order data")?;
        let num_segments = init.num_segments.unwrap_or(1);
        if num_segments == 0 || num_segments > self.config.max_download_segments {
            return Err(EbicsError::violation(
                phase,
                format!(
                    "announced segment count {} outside 1..={}",
                    num_segments, self.config.max_download_segments
                ),
            ));
        }
        info!(%transaction_id, num_segments, "download initialised");

        // -- Transfer -----------------------------------------------------------
        let mut segments = Vec::with_capacity(num_segments as usize);
        segments.push(first_segment);
        for segment_number in 2..=num_segments {
            let phase = Phase::Transfer;
            let request = self
                .codec
                .build_download_transfer(subscriber, &transaction_id, segment_number)
                .map_err(|e| EbicsError::from_codec(phase, e))?;
            let transfer = self.exchange(subscriber, phase, request).await?;
            if let Some(code) = check_codes(phase, &transfer)? {
                return Ok(DownloadOutcome::BankError(code));
            }

            if let Some(echoed) = transfer.segment_number {
                if echoed != segment_number {
                    return Err(EbicsError::violation(
                        phase,
                        format!("requested segment {} but got {}", segment_number, echoed),
                    ));
                }
            }
            if let Some(last) = transfer.last_segment {
                if last != (segment_number == num_segments) {
                    return Err(EbicsError::violation(
                        phase,
                        format!(
                            "last-segment flag {} on segment {} of {}",
                            last, segment_number, num_segments
                        ),
                    ));
                }
            }
            segments.push(require(phase, transfer.order_data_chunk, "order data")?);
        }

        // -- Decryption ---------------------------------------------------------
        let payload = decrypt_and_decompress(
            &subscriber.keys.encryption_key().encryption_secret(),
            &encryption_info,
            &segments,
            self.config.max_order_data_size,
        )?;

        // -- Receipt ------------------------------------------------------------
        let phase = Phase::Receipt;
        let request = self
            .codec
            .build_download_receipt(subscriber, &transaction_id)
            .map_err(|e| EbicsError::from_codec(phase, e))?;
        let receipt = self.exchange(subscriber, phase, request).await?;
        if let Some(code) = check_codes(phase, &receipt)? {
            return Ok(DownloadOutcome::BankError(code));
        }

        info!(%transaction_id, bytes = payload.len(), "download complete");
        Ok(DownloadOutcome::Success(payload))
    }
}
