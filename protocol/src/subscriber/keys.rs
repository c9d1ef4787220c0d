//! The subscriber's key set: three slots, each with material and a state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::keys::KeyMaterial;

/// The three independent key slots of a subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeySlot {
    Signature,
    Encryption,
    Authorization,
}

impl KeySlot {
    pub const ALL: [KeySlot; 3] = [KeySlot::Signature, KeySlot::Encryption, KeySlot::Authorization];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeySlot::Signature => "signature",
            KeySlot::Encryption => "encryption",
            KeySlot::Authorization => "authorization",
        }
    }
}

impl fmt::Display for KeySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KeySlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "signature" | "sig" | "a" => Ok(KeySlot::Signature),
            "encryption" | "enc" | "e" => Ok(KeySlot::Encryption),
            "authorization" | "auth" | "x" => Ok(KeySlot::Authorization),
            other => Err(format!("unknown key slot: {}", other)),
        }
    }
}

/// Where a key is in its life at the institution.
///
/// Ordered: `Missing < New < Released`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyState {
    /// Never communicated to the institution.
    Missing,
    /// Sent electronically (INI/HIA succeeded), not yet confirmed.
    New,
    /// Confirmed out of band (initialisation letter or certificate).
    Released,
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyState::Missing => "MISSING",
            KeyState::New => "NEW",
            KeyState::Released => "RELEASED",
        })
    }
}

/// One slot: private key material plus its state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    pub material: KeyMaterial,
    pub state: KeyState,
}

impl SlotEntry {
    fn fresh() -> Self {
        Self {
            material: KeyMaterial::generate(),
            state: KeyState::Missing,
        }
    }
}

/// The subscriber's three keys. Owned exclusively by one subscriber.
///
/// Fields are private so that states only change through the lifecycle
/// transitions in [`super::lifecycle`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberKeySet {
    signature: SlotEntry,
    encryption: SlotEntry,
    authorization: SlotEntry,
}

impl SubscriberKeySet {
    /// Generate fresh material for all three slots, all `Missing`.
    pub fn generate() -> Self {
        Self {
            signature: SlotEntry::fresh(),
            encryption: SlotEntry::fresh(),
            authorization: SlotEntry::fresh(),
        }
    }

    /// Build from existing material, all `Missing`.
    pub fn from_material(
        signature: KeyMaterial,
        encryption: KeyMaterial,
        authorization: KeyMaterial,
    ) -> Self {
        let missing = |material| SlotEntry {
            material,
            state: KeyState::Missing,
        };
        Self {
            signature: missing(signature),
            encryption: missing(encryption),
            authorization: missing(authorization),
        }
    }

    pub fn entry(&self, slot: KeySlot) -> &SlotEntry {
        match slot {
            KeySlot::Signature => &self.signature,
            KeySlot::Encryption => &self.encryption,
            KeySlot::Authorization => &self.authorization,
        }
    }

    pub(crate) fn entry_mut(&mut self, slot: KeySlot) -> &mut SlotEntry {
        match slot {
            KeySlot::Signature => &mut self.signature,
            KeySlot::Encryption => &mut self.encryption,
            KeySlot::Authorization => &mut self.authorization,
        }
    }

    pub fn state_of(&self, slot: KeySlot) -> KeyState {
        self.entry(slot).state
    }

    pub fn signature_key(&self) -> &KeyMaterial {
        &self.signature.material
    }

    pub fn encryption_key(&self) -> &KeyMaterial {
        &self.encryption.material
    }

    pub fn authorization_key(&self) -> &KeyMaterial {
        &self.authorization.material
    }

    /// Public key for a slot, as sent in INI/HIA.
    pub fn public_key(&self, slot: KeySlot) -> [u8; 32] {
        match slot {
            KeySlot::Encryption => self.encryption.material.encryption_public_key(),
            KeySlot::Signature | KeySlot::Authorization => {
                self.entry(slot).material.signing_public_key()
            }
        }
    }
}
