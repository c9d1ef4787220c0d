//! # Subscribers
//!
//! An EBICS subscriber is the tuple (HostID, PartnerID, UserID, optional
//! SystemID): who may act, for which legal entity, at which institution.
//! Each subscriber exclusively owns one [`SubscriberKeySet`] and, after
//! HPB, a copy of the institution's public keys.
//!
//! - `keys` — slot material and [`KeyState`].
//! - `state` — the derived [`SubscriberState`].
//! - `lifecycle` — legal transitions and order-type gating.
//! - `order_type` — the order type codes.

pub mod keys;
pub mod lifecycle;
pub mod order_type;
pub mod state;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::crypto::hash::{letter_fingerprint, public_key_digest};
use crate::crypto::keys::BankPublicKeys;

pub use keys::{KeySlot, KeyState, SubscriberKeySet};
pub use lifecycle::LifecycleError;
pub use order_type::OrderType;
pub use state::SubscriberState;

/// Identity of a subscriber at one institution.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriberId {
    pub host_id: String,
    pub partner_id: String,
    pub user_id: String,
    pub system_id: Option<String>,
}

impl SubscriberId {
    pub fn new(
        host_id: impl Into<String>,
        partner_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            host_id: host_id.into(),
            partner_id: partner_id.into(),
            user_id: user_id.into(),
            system_id: None,
        }
    }

    pub fn with_system_id(mut self, system_id: impl Into<String>) -> Self {
        self.system_id = Some(system_id.into());
        self
    }

    /// Check every field against the EBICS identifier charset: non-empty,
    /// ASCII alphanumerics plus `,` and `=`.
    pub fn validate(&self) -> Result<(), InvalidSubscriberId> {
        let fields = [
            ("host_id", Some(&self.host_id)),
            ("partner_id", Some(&self.partner_id)),
            ("user_id", Some(&self.user_id)),
            ("system_id", self.system_id.as_ref()),
        ];
        for (field, value) in fields {
            let Some(value) = value else { continue };
            if value.is_empty() {
                return Err(InvalidSubscriberId::Empty { field });
            }
            if let Some(ch) = value
                .chars()
                .find(|c| !(c.is_ascii_alphanumeric() || *c == ',' || *c == '='))
            {
                return Err(InvalidSubscriberId::Character { field, ch });
            }
        }
        Ok(())
    }
}

/// A subscriber identifier field outside the EBICS charset.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidSubscriberId {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} contains {ch:?}; only A-Z, a-z, 0-9, ',' and '=' are allowed")]
    Character { field: &'static str, ch: char },
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.host_id, self.partner_id, self.user_id)?;
        if let Some(system) = &self.system_id {
            write!(f, "/{}", system)?;
        }
        Ok(())
    }
}

/// A subscriber record as held by the persistence port.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: SubscriberId,
    /// Institution endpoint all requests are posted to.
    pub ebics_url: String,
    pub keys: SubscriberKeySet,
    /// Known once HPB has completed.
    pub bank_keys: Option<BankPublicKeys>,
}

impl Subscriber {
    /// A new subscriber with freshly generated keys, all `Missing`.
    pub fn new(id: SubscriberId, ebics_url: impl Into<String>) -> Self {
        Self {
            id,
            ebics_url: ebics_url.into(),
            keys: SubscriberKeySet::generate(),
            bank_keys: None,
        }
    }

    pub fn state(&self) -> SubscriberState {
        self.keys.subscriber_state()
    }

    /// Lines for the initialisation letter: each slot with its state and
    /// the SHA-256 fingerprint of its public key. The institution compares
    /// these against what INI/HIA delivered before releasing the keys.
    pub fn key_letter(&self) -> Vec<LetterEntry> {
        KeySlot::ALL
            .iter()
            .map(|slot| LetterEntry {
                slot: *slot,
                state: self.keys.state_of(*slot),
                fingerprint: letter_fingerprint(&public_key_digest(&self.keys.public_key(*slot))),
            })
            .collect()
    }
}

/// One line of the initialisation letter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterEntry {
    pub slot: KeySlot,
    pub state: KeyState,
    pub fingerprint: String,
}
