// Copyright (c) 2026 LibEuFin Rust Port Contributors. MIT License.
// See LICENSE for details.

//! # EBICS Protocol: Client Transaction Engine
//!
//! A client for EBICS, the signed request/response protocol European
//! businesses use to exchange payment orders and account statements with
//! their banks.
//!
//! ## Architecture
//!
//! - **ebics** — return codes, the phase classifier, and the download /
//!   upload / key-management orchestration over two ports: a
//!   `MessageCodec` (document building and parsing) and a `Transport`.
//! - **payload** — compression, encryption, and segmentation of order data.
//! - **subscriber** — identities, key slots, and the key lifecycle state
//!   machine that gates which orders a subscriber may send.
//! - **crypto** — AES-256-GCM, X25519 key wrapping, Ed25519, SHA-256.
//! - **client** — `EbicsClient`: engine + persisted subscribers +
//!   per-subscriber locking.
//! - **storage** — the `SubscriberStore` port, an in-memory store, and a
//!   sled database.
//! - **auth** — basic-auth users for the local API.
//! - **config** — protocol constants and `ClientConfig`.
//!
//! ## Ground Rules
//!
//! 1. A bank rejection is a result, not an error.
//! 2. Key states only move forward: MISSING → NEW → RELEASED.
//! 3. Nothing retries on its own. EBICS transactions are not idempotent.
//! 4. Key material never reaches a log line.

pub mod auth;
pub mod client;
pub mod config;
pub mod crypto;
pub mod ebics;
pub mod payload;
pub mod storage;
pub mod subscriber;

pub use client::{EbicsClient, KeyLifecycle};
pub use ebics::{DownloadOutcome, EbicsError, KeyManagementOutcome, UploadOutcome};
