//! Key management exchanges.
//!
//! INI and HIA are single unencrypted request/response pairs. HPB returns
//! the institution's public keys as encrypted order data in one response;
//! there is no transfer or receipt phase.

use tracing::info;

use crate::crypto::keys::BankPublicKeys;
use crate::payload::decrypt_and_decompress;
use crate::subscriber::{OrderType, Subscriber};

use super::classifier::Phase;
use super::engine::{check_codes, require, TransactionEngine};
use super::error::EbicsError;
use super::return_code::ReturnCode;

impl TransactionEngine {
    /// Send an INI or HIA order carrying the subscriber's public keys.
    ///
    /// `Err(code)` inside the `Ok` is a bank rejection.
    pub async fn send_key_order(
        &self,
        subscriber: &Subscriber,
        order_type: &OrderType,
    ) -> Result<Result<(), ReturnCode>, EbicsError> {
        let phase = Phase::Initialisation;
        let request = self
            .codec
            .build_key_management(subscriber, order_type)
            .map_err(|e| EbicsError::from_codec(phase, e))?;
        let response = self.exchange(subscriber, phase, request).await?;
        if let Some(code) = check_codes(phase, &response)? {
            return Ok(Err(code));
        }
        info!(subscriber = %subscriber.id, %order_type, "key order accepted");
        Ok(Ok(()))
    }

    /// Download the institution's public keys with HPB.
    ///
    /// `Err(code)` inside the `Ok` is a bank rejection.
    pub async fn download_bank_keys(
        &self,
        subscriber: &Subscriber,
    ) -> Result<Result<BankPublicKeys, ReturnCode>, EbicsError> {
        let phase = Phase::Initialisation;
        let request = self
            .codec
            .build_key_management(subscriber, &OrderType::Hpb)
            .map_err(|e| EbicsError::from_codec(phase, e))?;
        let response = self.exchange(subscriber, phase, request).await?;
        if let Some(code) = check_codes(phase, &response)? {
            return Ok(Err(code));
        }

        let encryption_info = require(phase, response.encryption_info, "encryption info")?;
        let order_data = require(phase, response.order_data_chunk, "order data")?;
        let plain = decrypt_and_decompress(
            &subscriber.keys.encryption_key().encryption_secret(),
            &encryption_info,
            &[order_data],
            self.config.max_order_data_size,
        )?;
        let keys = self
            .codec
            .parse_bank_keys(&plain)
            .map_err(|e| EbicsError::violation(phase, e.to_string()))?;
        info!(subscriber = %subscriber.id, "bank keys received");
        Ok(Ok(keys))
    }
}
