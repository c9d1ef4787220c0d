//! EBICS order types.
//!
//! An order type is the three-character code naming the business operation
//! a transaction performs. The engine only cares about one distinction:
//! key-management orders (permitted in any subscriber state) versus
//! business orders (permitted only once every key is released).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::keys::KeySlot;

/// Order types this client knows by name. Anything else is carried as
/// [`OrderType::Other`] and treated as a business order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Send the signature public key.
    Ini,
    /// Send the encryption and authorization public keys.
    Hia,
    /// Download the institution's public keys.
    Hpb,
    /// Download customer and subscriber information.
    Htd,
    /// Download customer information for all subscribers.
    Hkd,
    /// Download available order types.
    Haa,
    /// Account report (camt.052).
    C52,
    /// Statement (camt.053).
    C53,
    /// Debit/credit notification (camt.054).
    C54,
    /// SEPA credit transfer initiation (pain.001).
    Cct,
    /// SEPA direct debit initiation (pain.008).
    Cdd,
    /// Any other three-character code.
    Other(String),
}

impl OrderType {
    /// Wire code, e.g. `"C53"`.
    pub fn as_str(&self) -> &str {
        match self {
            OrderType::Ini => "INI",
            OrderType::Hia => "HIA",
            OrderType::Hpb => "HPB",
            OrderType::Htd => "HTD",
            OrderType::Hkd => "HKD",
            OrderType::Haa => "HAA",
            OrderType::C52 => "C52",
            OrderType::C53 => "C53",
            OrderType::C54 => "C54",
            OrderType::Cct => "CCT",
            OrderType::Cdd => "CDD",
            OrderType::Other(code) => code,
        }
    }

    /// Key-management orders may be sent in any subscriber state.
    pub fn is_key_management(&self) -> bool {
        matches!(self, OrderType::Ini | OrderType::Hia | OrderType::Hpb)
    }

    /// Key slots whose submission this order type performs.
    pub fn submitted_slots(&self) -> &'static [KeySlot] {
        match self {
            OrderType::Ini => &[KeySlot::Signature],
            OrderType::Hia => &[KeySlot::Encryption, KeySlot::Authorization],
            _ => &[],
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("invalid order type: {:?}", s));
        }
        Ok(match code.as_str() {
            "INI" => OrderType::Ini,
            "HIA" => OrderType::Hia,
            "HPB" => OrderType::Hpb,
            "HTD" => OrderType::Htd,
            "HKD" => OrderType::Hkd,
            "HAA" => OrderType::Haa,
            "C52" => OrderType::C52,
            "C53" => OrderType::C53,
            "C54" => OrderType::C54,
            "CCT" => OrderType::Cct,
            "CDD" => OrderType::Cdd,
            _ => OrderType::Other(code),
        })
    }
}
