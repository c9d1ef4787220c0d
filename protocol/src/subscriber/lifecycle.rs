//! # Key Lifecycle Transitions
//!
//! ```text
//!   MISSING ──(INI / HIA success)──► NEW ──(letter confirmed)──► RELEASED
//! ```
//!
//! No other edge exists. Asking for a transition from the wrong source
//! state is a logic error in the caller: it is reported as
//! [`LifecycleError::IllegalTransition`] and must never be retried or
//! swallowed.
//!
//! These methods are pure state changes. Serialising them per subscriber
//! (read, validate, write under one lock) is the job of
//! [`crate::client::KeyLifecycle`].

use thiserror::Error;
use tracing::debug;

use super::keys::{KeySlot, KeyState, SubscriberKeySet};
use super::order_type::OrderType;
use super::state::SubscriberState;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The slot was not in the state the transition starts from.
    #[error("illegal {slot} key transition: expected {expected}, found {found}")]
    IllegalTransition {
        slot: KeySlot,
        expected: KeyState,
        found: KeyState,
    },

    /// The order type does not submit any keys.
    #[error("order type {0} does not submit subscriber keys")]
    NotKeySubmission(OrderType),

    /// Business order attempted before every key was released.
    #[error("order type {order_type} not permitted in subscriber state {state}")]
    NotPermitted {
        order_type: OrderType,
        state: SubscriberState,
    },
}

impl SubscriberKeySet {
    /// Current derived subscriber state.
    pub fn subscriber_state(&self) -> SubscriberState {
        SubscriberState::of(self)
    }

    /// Check that `slot` is in `expected` without changing anything.
    pub fn require_state(&self, slot: KeySlot, expected: KeyState) -> Result<(), LifecycleError> {
        let found = self.state_of(slot);
        if found != expected {
            return Err(LifecycleError::IllegalTransition {
                slot,
                expected,
                found,
            });
        }
        Ok(())
    }

    /// MISSING → NEW after the key was submitted electronically.
    pub fn record_key_submission(&mut self, slot: KeySlot) -> Result<SubscriberState, LifecycleError> {
        self.transition(slot, KeyState::Missing, KeyState::New)
    }

    /// NEW → RELEASED after the out-of-band confirmation arrived.
    pub fn record_key_confirmation(
        &mut self,
        slot: KeySlot,
    ) -> Result<SubscriberState, LifecycleError> {
        self.transition(slot, KeyState::New, KeyState::Released)
    }

    /// Check that every slot `order_type` submits is still `Missing`.
    pub fn check_submission(&self, order_type: &OrderType) -> Result<(), LifecycleError> {
        let slots = order_type.submitted_slots();
        if slots.is_empty() {
            return Err(LifecycleError::NotKeySubmission(order_type.clone()));
        }
        for slot in slots {
            self.require_state(*slot, KeyState::Missing)?;
        }
        Ok(())
    }

    /// Apply a successful INI or HIA: every submitted slot moves to NEW.
    ///
    /// All slots are validated before any is changed, so HIA never leaves
    /// encryption NEW and authorization MISSING.
    pub fn record_order_submission(
        &mut self,
        order_type: &OrderType,
    ) -> Result<SubscriberState, LifecycleError> {
        self.check_submission(order_type)?;
        for slot in order_type.submitted_slots() {
            self.record_key_submission(*slot)?;
        }
        Ok(self.subscriber_state())
    }

    /// Whether the current state permits sending `order_type`.
    pub fn can_submit(&self, order_type: &OrderType) -> bool {
        order_type.is_key_management() || self.subscriber_state() == SubscriberState::Ready
    }

    /// [`Self::can_submit`] as a `Result`.
    pub fn require_permitted(&self, order_type: &OrderType) -> Result<(), LifecycleError> {
        if self.can_submit(order_type) {
            return Ok(());
        }
        Err(LifecycleError::NotPermitted {
            order_type: order_type.clone(),
            state: self.subscriber_state(),
        })
    }

    fn transition(
        &mut self,
        slot: KeySlot,
        from: KeyState,
        to: KeyState,
    ) -> Result<SubscriberState, LifecycleError> {
        self.require_state(slot, from)?;
        self.entry_mut(slot).state = to;
        let state = self.subscriber_state();
        debug!(%slot, from = %from, to = %to, subscriber_state = %state, "key state changed");
        Ok(state)
    }
}
