//! # EBICS Transaction Layer
//!
//! ```text
//!   caller ──► TransactionEngine ──► MessageCodec::build_* ──► Transport::send
//!                     ▲                                              │
//!                     └── classify(phase, technical, bank) ◄── parse_response
//! ```
//!
//! - `return_code` — closed enum of known EBICS codes plus `Other`.
//! - `classifier` — `(phase, technical, bank)` → continue / bank rejection /
//!   protocol violation.
//! - `codec`, `transport` — the two ports a caller plugs in.
//! - `engine`, `download`, `upload`, `key_management` — the orchestration.
//!
//! Bank rejections come back as data (`DownloadOutcome::BankError` etc.),
//! never as an [`EbicsError`].

pub mod classifier;
pub mod codec;
pub mod engine;
pub mod return_code;
pub mod transport;

mod download;
mod error;
mod key_management;
mod upload;

pub use classifier::{classify, Outcome, Phase};
pub use codec::{CodecError, DateRange, EbicsResponse, MessageCodec, OrderParams};
pub use engine::{DownloadOutcome, KeyManagementOutcome, TransactionEngine, UploadOutcome};
pub use error::{EbicsError, ErrorKind};
pub use return_code::{ReturnCode, Severity};
pub use transport::{Transport, TransportError};
