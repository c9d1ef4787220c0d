//! # Message Codec Port
//!
//! EBICS request documents are signed XML; building and parsing them is
//! delegated to a [`MessageCodec`]. The engine only ever sees the typed
//! [`EbicsResponse`] a codec returns.
//!
//! A codec's `parse_response` is responsible for authenticating the
//! document (institution signature) before returning any fields. A forged
//! or unsigned response must come back as [`CodecError::Authentication`].
//!
//! ## Segment numbering
//!
//! Download segments are numbered from 1, as on the wire: the init
//! response carries segment 1, transfer requests ask for 2..=n. Upload
//! chunks are addressed by a 0-based chunk index into
//! [`PreparedUploadData::segments`]; the codec maps that to whatever
//! numbering its wire format uses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::envelope::EncryptionInfo;
use crate::crypto::keys::BankPublicKeys;
use crate::payload::PreparedUploadData;
use crate::subscriber::{OrderType, Subscriber};

use super::return_code::ReturnCode;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A request document could not be produced from local data.
    #[error("cannot build request: {0}")]
    Build(String),

    /// The response document is malformed.
    #[error("malformed response: {0}")]
    Parse(String),

    /// The response failed signature or authenticity checks.
    #[error("response authentication failed: {0}")]
    Authentication(String),
}

// ---------------------------------------------------------------------------
// Order parameters
// ---------------------------------------------------------------------------

/// Inclusive date range for statement and report downloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// `None` if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Order-type specific parameters placed in the init request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderParams {
    pub date_range: Option<DateRange>,
}

impl OrderParams {
    pub fn with_date_range(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        DateRange::new(start, end).map(|range| Self {
            date_range: Some(range),
        })
    }
}

// ---------------------------------------------------------------------------
// Response record
// ---------------------------------------------------------------------------

/// Fields of an authenticated response, as extracted by the codec.
///
/// Which optional fields are required depends on the phase; the engine
/// checks that, not the codec.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbicsResponse {
    pub technical_return_code: ReturnCode,
    pub bank_return_code: ReturnCode,
    pub transaction_id: Option<String>,
    pub encryption_info: Option<EncryptionInfo>,
    /// Base64 order data segment.
    pub order_data_chunk: Option<String>,
    /// Total segment count, announced in the init response.
    pub num_segments: Option<u32>,
    /// Segment number echoed in a transfer response.
    pub segment_number: Option<u32>,
    pub last_segment: Option<bool>,
}

impl EbicsResponse {
    /// A response carrying only return codes.
    pub fn with_codes(technical: ReturnCode, bank: ReturnCode) -> Self {
        Self {
            technical_return_code: technical,
            bank_return_code: bank,
            transaction_id: None,
            encryption_info: None,
            order_data_chunk: None,
            num_segments: None,
            segment_number: None,
            last_segment: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Codec trait
// ---------------------------------------------------------------------------

pub trait MessageCodec: Send + Sync {
    fn build_download_init(
        &self,
        subscriber: &Subscriber,
        order_type: &OrderType,
        params: &OrderParams,
    ) -> Result<String, CodecError>;

    /// Request segment `segment_number` (2..=n) of a running download.
    fn build_download_transfer(
        &self,
        subscriber: &Subscriber,
        transaction_id: &str,
        segment_number: u32,
    ) -> Result<String, CodecError>;

    /// Positive receipt for a download that was decrypted successfully.
    fn build_download_receipt(
        &self,
        subscriber: &Subscriber,
        transaction_id: &str,
    ) -> Result<String, CodecError>;

    fn build_upload_init(
        &self,
        subscriber: &Subscriber,
        order_type: &OrderType,
        params: &OrderParams,
        prepared: &PreparedUploadData,
    ) -> Result<String, CodecError>;

    fn build_upload_transfer(
        &self,
        subscriber: &Subscriber,
        transaction_id: &str,
        prepared: &PreparedUploadData,
        chunk_index: usize,
    ) -> Result<String, CodecError>;

    /// Single-request key management order (INI, HIA, HPB).
    fn build_key_management(
        &self,
        subscriber: &Subscriber,
        order_type: &OrderType,
    ) -> Result<String, CodecError>;

    /// Authenticate and parse a response document.
    fn parse_response(&self, subscriber: &Subscriber, body: &str)
        -> Result<EbicsResponse, CodecError>;

    /// Extract the institution's public keys from decrypted HPB order data.
    fn parse_bank_keys(&self, order_data: &[u8]) -> Result<BankPublicKeys, CodecError>;
}
