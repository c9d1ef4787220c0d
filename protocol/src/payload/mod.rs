//! # Payload Crypto Pipeline
//!
//! Turns plaintext order data into wire segments and back. The pipeline is
//! pure: no I/O, no phase logic, no return codes. The transaction
//! orchestrator feeds it collected segments and hands its output to the
//! codec.
//!
//! - `compression` — bounded zlib.
//! - `segment` — base64 segmentation and in-order reassembly.
//! - `pipeline` — the upload and download compositions.

pub mod compression;
pub mod pipeline;
pub mod segment;

mod error;

pub use error::PayloadError;
pub use pipeline::{
    decrypt_and_decompress, open_signature_data, prepare_upload_payload, PreparedUploadData,
};
