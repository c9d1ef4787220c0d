//! # EbicsDb: Persistent Storage Engine
//!
//! Built on sled's embedded key-value store.
//!
//! ## Tree Layout
//!
//! | Tree          | Key                                   | Value                |
//! |---------------|---------------------------------------|----------------------|
//! | `subscribers` | `host/partner/user[/system]` (UTF-8)  | `bincode(Subscriber)`|
//! | `users`       | username (UTF-8)                      | `bincode(NexusUser)` |
//!
//! Subscriber records include private key material. The database
//! directory must be readable by the owning service account only.

use sled::{Db, Tree};
use std::path::Path;

use super::SubscriberStore;
use crate::auth::NexusUser;
use crate::subscriber::{Subscriber, SubscriberId};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type DbResult<T> = Result<T, DbError>;

// ---------------------------------------------------------------------------
// EbicsDb
// ---------------------------------------------------------------------------

/// sled-backed store for subscribers and API users.
///
/// Cheap to clone; clones share the same underlying database.
#[derive(Debug, Clone)]
pub struct EbicsDb {
    db: Db,
    subscribers: Tree,
    users: Tree,
}

impl EbicsDb {
    /// Open or create a database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// In-memory database removed on drop. For tests.
    pub fn open_temporary() -> DbResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let subscribers = db.open_tree("subscribers")?;
        let users = db.open_tree("users")?;
        Ok(Self {
            db,
            subscribers,
            users,
        })
    }

    // -- User operations ----------------------------------------------------

    /// Insert a new user. Fails if the username is taken.
    pub fn create_user(&self, user: &NexusUser) -> DbResult<()> {
        let bytes = encode(user)?;
        let inserted = self
            .users
            .compare_and_swap(user.username.as_bytes(), None as Option<&[u8]>, Some(bytes))?;
        if inserted.is_err() {
            return Err(DbError::AlreadyExists(user.username.clone()));
        }
        self.db.flush()?;
        Ok(())
    }

    pub fn get_user(&self, username: &str) -> DbResult<Option<NexusUser>> {
        self.users
            .get(username.as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl SubscriberStore for EbicsDb {
    fn load(&self, id: &SubscriberId) -> DbResult<Option<Subscriber>> {
        self.subscribers
            .get(encode(id)?)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn save(&self, subscriber: &Subscriber) -> DbResult<()> {
        let bytes = encode(subscriber)?;
        self.subscribers
            .insert(encode(&subscriber.id)?, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    fn list(&self) -> DbResult<Vec<SubscriberId>> {
        self.subscribers
            .iter()
            .values()
            .map(|value| -> DbResult<SubscriberId> {
                let subscriber: Subscriber = decode(&value?)?;
                Ok(subscriber.id)
            })
            .collect()
    }
}

fn encode<T: serde::Serialize>(value: &T) -> DbResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| DbError::Serialization(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> DbResult<T> {
    bincode::deserialize(bytes).map_err(|e| DbError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::BankPublicKeys;
    use crate::subscriber::{KeySlot, KeyState, OrderType};

    fn subscriber(user: &str) -> Subscriber {
        Subscriber::new(
            SubscriberId::new("HOST01", "PARTNER1", user),
            "http://localhost:5000/ebicsweb",
        )
    }

    #[test]
    fn open_temporary_database() {
        let db = EbicsDb::open_temporary().expect("open temp db");
        assert_eq!(db.subscriber_count(), 0);
        assert_eq!(db.user_count(), 0);
    }

    #[test]
    fn subscriber_roundtrip_keeps_keys_and_states() {
        let db = EbicsDb::open_temporary().unwrap();
        let mut sub = subscriber("USER1");
        sub.keys.record_order_submission(&OrderType::Ini).unwrap();
        sub.bank_keys = Some(BankPublicKeys {
            encryption: [1u8; 32],
            authentication: [2u8; 32],
        });
        db.save(&sub).unwrap();

        let loaded = db.load(&sub.id).unwrap().expect("stored");
        assert_eq!(loaded, sub);
        assert_eq!(loaded.keys.state_of(KeySlot::Signature), KeyState::New);
        assert_eq!(
            loaded.keys.signature_key().as_bytes(),
            sub.keys.signature_key().as_bytes()
        );
    }

    #[test]
    fn unknown_subscriber_is_none() {
        let db = EbicsDb::open_temporary().unwrap();
        assert!(db
            .load(&SubscriberId::new("HOST01", "PARTNER1", "NOBODY"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn list_returns_every_subscriber() {
        let db = EbicsDb::open_temporary().unwrap();
        db.save(&subscriber("USER1")).unwrap();
        db.save(&subscriber("USER2")).unwrap();
        db.save(&subscriber("USER1")).unwrap();
        let ids = db.list().unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].user_id, "USER1");
    }

    #[test]
    fn ids_with_same_display_are_kept_apart() {
        let db = EbicsDb::open_temporary().unwrap();
        let a = Subscriber::new(
            SubscriberId::new("HOST01", "PARTNER1", "U").with_system_id("S"),
            "http://a",
        );
        let b = Subscriber::new(SubscriberId::new("HOST01", "PARTNER1", "U/S"), "http://b");
        db.save(&a).unwrap();
        db.save(&b).unwrap();

        assert_eq!(db.subscriber_count(), 2);
        assert_eq!(db.load(&a.id).unwrap(), Some(a));
        assert_eq!(db.load(&b.id).unwrap(), Some(b));
    }

    #[test]
    fn duplicate_user_is_rejected() {
        let db = EbicsDb::open_temporary().unwrap();
        let user = NexusUser::new("alice", "secret", false);
        db.create_user(&user).unwrap();
        assert!(matches!(
            db.create_user(&NexusUser::new("alice", "other", true)),
            Err(DbError::AlreadyExists(name)) if name == "alice"
        ));
        assert_eq!(db.get_user("alice").unwrap(), Some(user));
    }

    #[test]
    fn open_persistent_database() {
        let dir = tempfile::tempdir().expect("tempdir");
        let id = {
            let db = EbicsDb::open(dir.path()).expect("open db");
            let sub = subscriber("USER1");
            db.save(&sub).unwrap();
            sub.id
        };
        let db = EbicsDb::open(dir.path()).expect("reopen db");
        assert!(db.load(&id).unwrap().is_some());
    }
}
