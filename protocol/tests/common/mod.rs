//! Shared fixtures: a JSON codec standing in for the XML one, a scripted
//! transport that plays the bank, and helpers to build subscribers in a
//! given lifecycle state.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use ebics_protocol::config::ClientConfig;
use ebics_protocol::crypto::keys::{BankPublicKeys, KeyMaterial};
use ebics_protocol::crypto::EncryptionInfo;
use ebics_protocol::ebics::{
    CodecError, EbicsResponse, MessageCodec, OrderParams, ReturnCode, Transport, TransportError,
};
use ebics_protocol::payload::{prepare_upload_payload, PreparedUploadData};
use ebics_protocol::storage::{MemoryStore, SubscriberStore};
use ebics_protocol::subscriber::{KeySlot, OrderType, Subscriber, SubscriberId};
use ebics_protocol::EbicsClient;

pub const BANK_URL: &str = "https://bank.example/ebicsweb";

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// What the test codec puts on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    DownloadInit {
        order_type: String,
        params: OrderParams,
    },
    DownloadTransfer {
        transaction_id: String,
        segment_number: u32,
    },
    DownloadReceipt {
        transaction_id: String,
    },
    UploadInit {
        order_type: String,
        num_segments: usize,
        encryption_info: EncryptionInfo,
    },
    UploadTransfer {
        transaction_id: String,
        chunk_index: usize,
        chunk: String,
    },
    KeyManagement {
        order_type: String,
        public_keys: Vec<[u8; 32]>,
    },
}

/// Response envelope; `authentic: false` simulates a bad bank signature.
#[derive(Serialize, Deserialize)]
struct Envelope {
    authentic: bool,
    response: EbicsResponse,
}

pub struct JsonCodec;

impl JsonCodec {
    fn encode(request: Request) -> Result<String, CodecError> {
        serde_json::to_string(&request).map_err(|e| CodecError::Build(e.to_string()))
    }
}

impl MessageCodec for JsonCodec {
    fn build_download_init(
        &self,
        _subscriber: &Subscriber,
        order_type: &OrderType,
        params: &OrderParams,
    ) -> Result<String, CodecError> {
        Self::encode(Request::DownloadInit {
            order_type: order_type.to_string(),
            params: params.clone(),
        })
    }

    fn build_download_transfer(
        &self,
        _subscriber: &Subscriber,
        transaction_id: &str,
        segment_number: u32,
    ) -> Result<String, CodecError> {
        Self::encode(Request::DownloadTransfer {
            transaction_id: transaction_id.to_string(),
            segment_number,
        })
    }

    fn build_download_receipt(
        &self,
        _subscriber: &Subscriber,
        transaction_id: &str,
    ) -> Result<String, CodecError> {
        Self::encode(Request::DownloadReceipt {
            transaction_id: transaction_id.to_string(),
        })
    }

    fn build_upload_init(
        &self,
        _subscriber: &Subscriber,
        order_type: &OrderType,
        _params: &OrderParams,
        prepared: &PreparedUploadData,
    ) -> Result<String, CodecError> {
        Self::encode(Request::UploadInit {
            order_type: order_type.to_string(),
            num_segments: prepared.num_segments(),
            encryption_info: prepared.encryption_info.clone(),
        })
    }

    fn build_upload_transfer(
        &self,
        _subscriber: &Subscriber,
        transaction_id: &str,
        prepared: &PreparedUploadData,
        chunk_index: usize,
    ) -> Result<String, CodecError> {
        let chunk = prepared
            .segment(chunk_index)
            .ok_or_else(|| CodecError::Build(format!("no chunk {}", chunk_index)))?;
        Self::encode(Request::UploadTransfer {
            transaction_id: transaction_id.to_string(),
            chunk_index,
            chunk: chunk.to_string(),
        })
    }

    fn build_key_management(
        &self,
        subscriber: &Subscriber,
        order_type: &OrderType,
    ) -> Result<String, CodecError> {
        Self::encode(Request::KeyManagement {
            order_type: order_type.to_string(),
            public_keys: order_type
                .submitted_slots()
                .iter()
                .map(|slot| subscriber.keys.public_key(*slot))
                .collect(),
        })
    }

    fn parse_response(
        &self,
        _subscriber: &Subscriber,
        body: &str,
    ) -> Result<EbicsResponse, CodecError> {
        let envelope: Envelope =
            serde_json::from_str(body).map_err(|e| CodecError::Parse(e.to_string()))?;
        if !envelope.authentic {
            return Err(CodecError::Authentication("bank signature invalid".into()));
        }
        Ok(envelope.response)
    }

    fn parse_bank_keys(&self, order_data: &[u8]) -> Result<BankPublicKeys, CodecError> {
        serde_json::from_slice(order_data).map_err(|e| CodecError::Parse(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Response builders
// ---------------------------------------------------------------------------

pub fn respond(response: EbicsResponse) -> Result<String, TransportError> {
    Ok(serde_json::to_string(&Envelope {
        authentic: true,
        response,
    })
    .expect("serialize response"))
}

pub fn forged(response: EbicsResponse) -> Result<String, TransportError> {
    Ok(serde_json::to_string(&Envelope {
        authentic: false,
        response,
    })
    .expect("serialize response"))
}

pub fn codes(technical: ReturnCode, bank: ReturnCode) -> EbicsResponse {
    EbicsResponse::with_codes(technical, bank)
}

pub fn ok() -> EbicsResponse {
    codes(ReturnCode::Ok, ReturnCode::Ok)
}

pub fn receipt_done() -> EbicsResponse {
    codes(ReturnCode::DownloadPostprocessDone, ReturnCode::Ok)
}

pub fn upload_init_ok(transaction_id: &str) -> EbicsResponse {
    EbicsResponse {
        transaction_id: Some(transaction_id.to_string()),
        ..ok()
    }
}

/// Order data as the bank would send it to `subscriber`: encrypted for the
/// subscriber's encryption key and split into base64 segments.
pub struct BankDownload {
    pub encryption_info: EncryptionInfo,
    pub segments: Vec<String>,
}

impl BankDownload {
    pub fn for_subscriber(subscriber: &Subscriber, plaintext: &[u8], segment_size: usize) -> Self {
        let recipient = BankPublicKeys {
            encryption: subscriber.keys.encryption_key().encryption_public_key(),
            authentication: [0u8; 32],
        };
        let prepared = prepare_upload_payload(
            &KeyMaterial::generate(),
            &recipient,
            plaintext,
            segment_size,
        )
        .expect("encrypt download");
        Self {
            encryption_info: prepared.encryption_info,
            segments: prepared.segments,
        }
    }

    pub fn init_response(&self, transaction_id: &str) -> EbicsResponse {
        EbicsResponse {
            transaction_id: Some(transaction_id.to_string()),
            encryption_info: Some(self.encryption_info.clone()),
            order_data_chunk: Some(self.segments[0].clone()),
            num_segments: Some(self.segments.len() as u32),
            ..ok()
        }
    }

    /// Transfer response for 1-based `segment_number`.
    pub fn transfer_response(&self, segment_number: u32) -> EbicsResponse {
        EbicsResponse {
            order_data_chunk: Some(self.segments[segment_number as usize - 1].clone()),
            segment_number: Some(segment_number),
            last_segment: Some(segment_number as usize == self.segments.len()),
            ..ok()
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Plays back canned responses in order and records every request.
pub struct ScriptedBank {
    responses: Mutex<VecDeque<Result<String, TransportError>>>,
    requests: Mutex<Vec<(String, Request)>>,
    latency: Option<Duration>,
}

impl ScriptedBank {
    pub fn new(responses: Vec<Result<String, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            latency: None,
        })
    }

    pub fn with_latency(
        responses: Vec<Result<String, TransportError>>,
        latency: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            latency: Some(latency),
        })
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests.lock().iter().map(|(u, _)| u.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

#[async_trait]
impl Transport for ScriptedBank {
    async fn send(&self, url: &str, body: String) -> Result<String, TransportError> {
        let request: Request = serde_json::from_str(&body).expect("test codec request");
        self.requests.lock().push((url.to_string(), request));
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.responses
            .lock()
            .pop_front()
            .expect("bank script exhausted")
    }
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

pub fn subscriber_id() -> SubscriberId {
    SubscriberId::new("HOST01", "PARTNER1", "USER1")
}

/// A bank encryption key pair for upload tests.
pub fn bank_keys() -> (KeyMaterial, BankPublicKeys) {
    let encryption = KeyMaterial::generate();
    let keys = BankPublicKeys {
        encryption: encryption.encryption_public_key(),
        authentication: KeyMaterial::generate().signing_public_key(),
    };
    (encryption, keys)
}

/// A subscriber with every key released.
pub fn ready_subscriber(bank: Option<BankPublicKeys>) -> Subscriber {
    let mut subscriber = Subscriber::new(subscriber_id(), BANK_URL);
    subscriber
        .keys
        .record_order_submission(&OrderType::Ini)
        .unwrap();
    subscriber
        .keys
        .record_order_submission(&OrderType::Hia)
        .unwrap();
    for slot in KeySlot::ALL {
        subscriber.keys.record_key_confirmation(slot).unwrap();
    }
    subscriber.bank_keys = bank;
    subscriber
}

pub fn client_with(
    store: Arc<MemoryStore>,
    bank: Arc<ScriptedBank>,
    config: ClientConfig,
) -> EbicsClient {
    EbicsClient::new(store, Arc::new(JsonCodec), bank, config)
}

pub fn store_with(subscriber: &Subscriber) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.save(subscriber).unwrap();
    store
}
