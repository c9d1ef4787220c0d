//! Derived subscriber state.
//!
//! `SubscriberState` is recomputed from the three key states every time it
//! is needed. It is never persisted, so it cannot drift from the keys it
//! summarises.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::keys::{KeySlot, KeyState, SubscriberKeySet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriberState {
    /// Neither INI nor HIA has completed.
    New,
    /// INI completed, HIA has not.
    PartiallyInitializedIni,
    /// HIA completed, INI has not.
    PartiallyInitializedHia,
    /// INI and HIA completed; at least one key awaits confirmation.
    Initialized,
    /// Every key released. Business orders allowed.
    Ready,
}

impl SubscriberState {
    /// Summarise three key states.
    ///
    /// The INI half is done when the signature key is at least `New`; the
    /// HIA half is done when both encryption and authorization keys are.
    pub fn from_key_states(
        signature: KeyState,
        encryption: KeyState,
        authorization: KeyState,
    ) -> Self {
        let all_released = [signature, encryption, authorization]
            .iter()
            .all(|s| *s == KeyState::Released);
        if all_released {
            return SubscriberState::Ready;
        }

        let ini_done = signature >= KeyState::New;
        let hia_done = encryption >= KeyState::New && authorization >= KeyState::New;

        match (ini_done, hia_done) {
            (true, true) => SubscriberState::Initialized,
            (true, false) => SubscriberState::PartiallyInitializedIni,
            (false, true) => SubscriberState::PartiallyInitializedHia,
            (false, false) => SubscriberState::New,
        }
    }

    pub fn of(keys: &SubscriberKeySet) -> Self {
        Self::from_key_states(
            keys.state_of(KeySlot::Signature),
            keys.state_of(KeySlot::Encryption),
            keys.state_of(KeySlot::Authorization),
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriberState::New => "NEW",
            SubscriberState::PartiallyInitializedIni => "PARTIALLY_INITIALIZED_INI",
            SubscriberState::PartiallyInitializedHia => "PARTIALLY_INITIALIZED_HIA",
            SubscriberState::Initialized => "INITIALIZED",
            SubscriberState::Ready => "READY",
        }
    }
}

impl fmt::Display for SubscriberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use KeyState::*;

    #[test]
    fn test_all_missing_is_new() {
        assert_eq!(
            SubscriberState::from_key_states(Missing, Missing, Missing),
            SubscriberState::New
        );
    }

    #[test]
    fn test_signature_only_is_partial_ini() {
        assert_eq!(
            SubscriberState::from_key_states(New, Missing, Missing),
            SubscriberState::PartiallyInitializedIni
        );
        assert_eq!(
            SubscriberState::from_key_states(Released, Missing, Missing),
            SubscriberState::PartiallyInitializedIni
        );
    }

    #[test]
    fn test_encryption_and_authorization_is_partial_hia() {
        assert_eq!(
            SubscriberState::from_key_states(Missing, New, New),
            SubscriberState::PartiallyInitializedHia
        );
    }

    #[test]
    fn test_half_of_hia_does_not_count() {
        assert_eq!(
            SubscriberState::from_key_states(Missing, New, Missing),
            SubscriberState::New
        );
        assert_eq!(
            SubscriberState::from_key_states(New, Missing, New),
            SubscriberState::PartiallyInitializedIni
        );
    }

    #[test]
    fn test_all_sent_is_initialized() {
        assert_eq!(
            SubscriberState::from_key_states(New, New, New),
            SubscriberState::Initialized
        );
        assert_eq!(
            SubscriberState::from_key_states(Released, Released, New),
            SubscriberState::Initialized
        );
    }

    #[test]
    fn test_all_released_is_ready() {
        assert_eq!(
            SubscriberState::from_key_states(Released, Released, Released),
            SubscriberState::Ready
        );
    }

    #[test]
    fn test_display_names() {
        assert_eq!(SubscriberState::PartiallyInitializedHia.to_string(), "PARTIALLY_INITIALIZED_HIA");
        assert_eq!(SubscriberState::Ready.to_string(), "READY");
    }
}
