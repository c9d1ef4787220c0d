//! # EBICS Client
//!
//! Ties the transaction engine to persisted subscribers.
//!
//! ```text
//!   EbicsClient ─┬─ KeyLifecycle ── SubscriberStore (+ per-subscriber locks)
//!                └─ TransactionEngine ── MessageCodec, Transport
//! ```
//!
//! Every key-set mutation (INI, HIA, HPB, letter confirmation) runs as
//! read → validate → exchange → write while holding that subscriber's
//! async mutex. Two concurrent INI calls for one subscriber therefore
//! cannot both see `Missing` and both submit. Business downloads and
//! uploads only read the subscriber and take no lock.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

use crate::config::ClientConfig;
use crate::ebics::{
    DownloadOutcome, EbicsError, KeyManagementOutcome, MessageCodec, OrderParams,
    TransactionEngine, Transport, UploadOutcome,
};
use crate::storage::SubscriberStore;
use crate::subscriber::{KeySlot, OrderType, Subscriber, SubscriberId, SubscriberState};

// ---------------------------------------------------------------------------
// KeyLifecycle
// ---------------------------------------------------------------------------

/// Persisted key lifecycle, serialised per subscriber.
pub struct KeyLifecycle {
    store: Arc<dyn SubscriberStore>,
    locks: DashMap<SubscriberId, Arc<Mutex<()>>>,
}

impl KeyLifecycle {
    pub fn new(store: Arc<dyn SubscriberStore>) -> Self {
        Self {
            store,
            locks: DashMap::new(),
        }
    }

    /// The mutex guarding `id`'s record. Created on first use.
    pub fn lock_for(&self, id: &SubscriberId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Hold `id`'s mutex until the returned guard drops. The map entry is
    /// removed on release once no other task holds or waits on it.
    pub async fn lock(&self, id: &SubscriberId) -> SubscriberGuard<'_> {
        let guard = self.lock_for(id).lock_owned().await;
        SubscriberGuard {
            locks: &self.locks,
            id: id.clone(),
            guard: Some(guard),
        }
    }

    /// Number of subscribers with a live lock entry.
    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }

    /// Register a subscriber with fresh key material.
    pub async fn create_subscriber(
        &self,
        id: SubscriberId,
        ebics_url: &str,
    ) -> Result<Subscriber, EbicsError> {
        id.validate()
            .map_err(|e| EbicsError::Configuration(format!("invalid subscriber id {}: {}", id, e)))?;
        let _guard = self.lock(&id).await;
        if self.store.load(&id)?.is_some() {
            return Err(EbicsError::Configuration(format!(
                "subscriber {} already exists",
                id
            )));
        }
        let subscriber = Subscriber::new(id, ebics_url);
        self.store.save(&subscriber)?;
        info!(subscriber = %subscriber.id, "subscriber created");
        Ok(subscriber)
    }

    pub fn load(&self, id: &SubscriberId) -> Result<Subscriber, EbicsError> {
        self.store
            .load(id)?
            .ok_or_else(|| EbicsError::Configuration(format!("unknown subscriber {}", id)))
    }

    pub fn state(&self, id: &SubscriberId) -> Result<SubscriberState, EbicsError> {
        Ok(self.load(id)?.state())
    }

    /// Record that the institution confirmed `slot` (initialisation letter).
    pub async fn confirm_key(
        &self,
        id: &SubscriberId,
        slot: KeySlot,
    ) -> Result<SubscriberState, EbicsError> {
        let _guard = self.lock(id).await;
        let mut subscriber = self.load(id)?;
        let state = subscriber.keys.record_key_confirmation(slot)?;
        self.store.save(&subscriber)?;
        info!(subscriber = %id, %slot, %state, "key released");
        Ok(state)
    }

    fn save(&self, subscriber: &Subscriber) -> Result<(), EbicsError> {
        Ok(self.store.save(subscriber)?)
    }
}

/// Exclusive access to one subscriber's record.
pub struct SubscriberGuard<'a> {
    locks: &'a DashMap<SubscriberId, Arc<Mutex<()>>>,
    id: SubscriberId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SubscriberGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own handle left: nobody holds or awaits the mutex.
        self.locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

// ---------------------------------------------------------------------------
// EbicsClient
// ---------------------------------------------------------------------------

pub struct EbicsClient {
    lifecycle: KeyLifecycle,
    engine: TransactionEngine,
}

impl EbicsClient {
    pub fn new(
        store: Arc<dyn SubscriberStore>,
        codec: Arc<dyn MessageCodec>,
        transport: Arc<dyn Transport>,
        config: ClientConfig,
    ) -> Self {
        Self {
            lifecycle: KeyLifecycle::new(store),
            engine: TransactionEngine::new(codec, transport, config),
        }
    }

    pub fn lifecycle(&self) -> &KeyLifecycle {
        &self.lifecycle
    }

    pub fn engine(&self) -> &TransactionEngine {
        &self.engine
    }

    // -- Key management -----------------------------------------------------

    /// Submit the signature key (INI).
    pub async fn send_ini(&self, id: &SubscriberId) -> Result<KeyManagementOutcome, EbicsError> {
        self.send_key_submission(id, OrderType::Ini).await
    }

    /// Submit the encryption and authorization keys (HIA).
    pub async fn send_hia(&self, id: &SubscriberId) -> Result<KeyManagementOutcome, EbicsError> {
        self.send_key_submission(id, OrderType::Hia).await
    }

    async fn send_key_submission(
        &self,
        id: &SubscriberId,
        order_type: OrderType,
    ) -> Result<KeyManagementOutcome, EbicsError> {
        let _guard = self.lifecycle.lock(id).await;

        let mut subscriber = self.lifecycle.load(id)?;
        subscriber.keys.check_submission(&order_type)?;

        match self.engine.send_key_order(&subscriber, &order_type).await? {
            Err(code) => Ok(KeyManagementOutcome::BankError(code)),
            Ok(()) => {
                let state = subscriber.keys.record_order_submission(&order_type)?;
                self.lifecycle.save(&subscriber)?;
                Ok(KeyManagementOutcome::Accepted(state))
            }
        }
    }

    /// Fetch and store the institution's public keys (HPB).
    pub async fn fetch_bank_keys(
        &self,
        id: &SubscriberId,
    ) -> Result<KeyManagementOutcome, EbicsError> {
        let _guard = self.lifecycle.lock(id).await;

        let mut subscriber = self.lifecycle.load(id)?;
        match self.engine.download_bank_keys(&subscriber).await? {
            Err(code) => Ok(KeyManagementOutcome::BankError(code)),
            Ok(keys) => {
                subscriber.bank_keys = Some(keys);
                self.lifecycle.save(&subscriber)?;
                Ok(KeyManagementOutcome::Accepted(subscriber.state()))
            }
        }
    }

    // -- Business transactions ----------------------------------------------

    pub async fn download(
        &self,
        id: &SubscriberId,
        order_type: &OrderType,
        params: &OrderParams,
    ) -> Result<DownloadOutcome, EbicsError> {
        let subscriber = self.lifecycle.load(id)?;
        subscriber.keys.require_permitted(order_type)?;
        self.engine.download(&subscriber, order_type, params).await
    }

    pub async fn upload(
        &self,
        id: &SubscriberId,
        order_type: &OrderType,
        params: &OrderParams,
        payload: &[u8],
    ) -> Result<UploadOutcome, EbicsError> {
        let subscriber = self.lifecycle.load(id)?;
        subscriber.keys.require_permitted(order_type)?;
        self.engine
            .upload(&subscriber, order_type, params, payload)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::subscriber::KeyState;

    fn lifecycle() -> KeyLifecycle {
        KeyLifecycle::new(Arc::new(MemoryStore::new()))
    }

    fn id() -> SubscriberId {
        SubscriberId::new("HOST01", "PARTNER1", "USER1")
    }

    #[tokio::test]
    async fn test_create_subscriber_once() {
        let lifecycle = lifecycle();
        let created = lifecycle
            .create_subscriber(id(), "http://localhost/ebics")
            .await
            .unwrap();
        assert_eq!(created.state(), SubscriberState::New);
        assert!(matches!(
            lifecycle.create_subscriber(id(), "http://localhost/ebics").await,
            Err(EbicsError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_subscriber_is_configuration_error() {
        let err = lifecycle().state(&id()).unwrap_err();
        assert!(!err.is_internal());
    }

    #[tokio::test]
    async fn test_confirm_key_requires_submission() {
        let lifecycle = lifecycle();
        lifecycle
            .create_subscriber(id(), "http://localhost/ebics")
            .await
            .unwrap();
        assert!(matches!(
            lifecycle.confirm_key(&id(), KeySlot::Signature).await,
            Err(EbicsError::Lifecycle(_))
        ));

        let mut sub = lifecycle.load(&id()).unwrap();
        sub.keys.record_key_submission(KeySlot::Signature).unwrap();
        lifecycle.save(&sub).unwrap();

        lifecycle.confirm_key(&id(), KeySlot::Signature).await.unwrap();
        assert_eq!(
            lifecycle.load(&id()).unwrap().keys.state_of(KeySlot::Signature),
            KeyState::Released
        );
    }

    #[test]
    fn test_lock_is_shared_per_subscriber() {
        let lifecycle = lifecycle();
        let a = lifecycle.lock_for(&id());
        let b = lifecycle.lock_for(&id());
        let other = lifecycle.lock_for(&SubscriberId::new("HOST01", "PARTNER1", "USER2"));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
    }

    #[tokio::test]
    async fn test_lock_entry_released_after_use() {
        let lifecycle = lifecycle();
        {
            let _guard = lifecycle.lock(&id()).await;
            assert_eq!(lifecycle.lock_count(), 1);
        }
        assert_eq!(lifecycle.lock_count(), 0);

        lifecycle
            .create_subscriber(id(), "http://localhost/ebics")
            .await
            .unwrap();
        assert_eq!(lifecycle.lock_count(), 0);
    }

    #[tokio::test]
    async fn test_lock_entry_kept_while_another_handle_lives() {
        let lifecycle = lifecycle();
        let held = lifecycle.lock_for(&id());
        drop(lifecycle.lock(&id()).await);
        assert_eq!(lifecycle.lock_count(), 1);
        drop(held);
        drop(lifecycle.lock(&id()).await);
        assert_eq!(lifecycle.lock_count(), 0);
    }

    #[tokio::test]
    async fn test_create_subscriber_rejects_invalid_id() {
        let lifecycle = lifecycle();
        let err = lifecycle
            .create_subscriber(
                SubscriberId::new("HOST01", "PARTNER1", "U/S"),
                "http://localhost/ebics",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EbicsError::Configuration(_)));
        assert!(lifecycle.store.list().unwrap().is_empty());
    }
}
