//! # Storage Module
//!
//! Persistence for subscriber records and local API users.
//!
//! ```text
//! mod.rs    — SubscriberStore port
//! memory.rs — MemoryStore, for tests and short-lived tools
//! db.rs     — EbicsDb, sled-backed with bincode values
//! ```
//!
//! Only subscriber identity, URL, key material with key states, and the
//! institution's public keys are stored. The derived subscriber state and
//! in-flight transactions are never persisted.

pub mod db;
pub mod memory;

pub use db::{DbError, DbResult, EbicsDb};
pub use memory::MemoryStore;

use crate::subscriber::{Subscriber, SubscriberId};

/// Load and save subscriber records by identity.
///
/// Implementations must be safe to share between tasks. Read-modify-write
/// sequences are serialised by the caller, not by the store.
pub trait SubscriberStore: Send + Sync {
    fn load(&self, id: &SubscriberId) -> DbResult<Option<Subscriber>>;

    /// Insert or replace the record for `subscriber.id`.
    fn save(&self, subscriber: &Subscriber) -> DbResult<()>;

    /// Every stored identity, in storage-key order.
    fn list(&self) -> DbResult<Vec<SubscriberId>>;
}
