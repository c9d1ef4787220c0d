//! In-memory [`SubscriberStore`].

use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::{DbResult, SubscriberStore};
use crate::subscriber::{Subscriber, SubscriberId};

/// Subscriber records held in a map. Lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    subscribers: RwLock<BTreeMap<SubscriberId, Subscriber>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }
}

impl SubscriberStore for MemoryStore {
    fn load(&self, id: &SubscriberId) -> DbResult<Option<Subscriber>> {
        Ok(self.subscribers.read().get(id).cloned())
    }

    fn save(&self, subscriber: &Subscriber) -> DbResult<()> {
        self.subscribers
            .write()
            .insert(subscriber.id.clone(), subscriber.clone());
        Ok(())
    }

    fn list(&self) -> DbResult<Vec<SubscriberId>> {
        Ok(self
            .subscribers
            .read()
            .values()
            .map(|s| s.id.clone())
            .collect())
    }
}
