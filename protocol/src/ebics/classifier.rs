//! Return code classification.
//!
//! The technical code says whether the request was processable at the
//! protocol layer; the bank code says whether the institution accepted it.
//! A wrong technical code is always a protocol violation. A non-OK bank
//! code is always a business rejection, returned as data.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::return_code::ReturnCode;

/// Transaction phase a response belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Initialisation,
    Transfer,
    Receipt,
}

impl Phase {
    /// The only technical code that lets this phase succeed.
    pub fn expected_technical_code(&self) -> ReturnCode {
        match self {
            Phase::Initialisation | Phase::Transfer => ReturnCode::Ok,
            Phase::Receipt => ReturnCode::DownloadPostprocessDone,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Initialisation => "initialisation",
            Phase::Transfer => "transfer",
            Phase::Receipt => "receipt",
        })
    }
}

/// What the orchestrator should do with a response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Phase succeeded; proceed.
    Continue,
    /// The institution rejected the order. Terminal, not a bug.
    BankRejected(ReturnCode),
    /// Unexpected code combination. Fatal for this attempt.
    ProtocolViolation(String),
}

/// Classify a `(technical, bank)` pair observed at `phase`.
pub fn classify(phase: Phase, technical: &ReturnCode, bank: &ReturnCode) -> Outcome {
    let expected = phase.expected_technical_code();
    if *technical != expected {
        return Outcome::ProtocolViolation(format!(
            "unexpected technical return code {} in {} phase (expected {})",
            technical, phase, expected
        ));
    }
    if !bank.is_ok() {
        return Outcome::BankRejected(bank.clone());
    }
    Outcome::Continue
}
