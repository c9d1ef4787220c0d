//! EBICS return codes.
//!
//! Both the technical and the bank return code are six-digit strings on the
//! wire. The first two digits give the severity class (`00` ok, `01` note,
//! `03` warning, `06`/`09` error). Codes we know are named; anything else is
//! kept verbatim in [`ReturnCode::Other`] so it can still be reported.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Serialised as the six-digit wire code; deserialisation applies the same
/// validation as [`FromStr`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReturnCode {
    Ok,
    DownloadPostprocessDone,
    DownloadPostprocessSkipped,
    TxSegmentNumberUnderrun,
    OrderParamsIgnored,
    AuthenticationFailed,
    InvalidRequest,
    InternalError,
    TxRecoverySync,
    InvalidUserOrUserState,
    UserUnknown,
    InvalidUserState,
    InvalidOrderType,
    UnsupportedOrderType,
    AuthorisationOrderTypeFailed,
    NoDownloadDataAvailable,
    TxUnknownTxid,
    TxAbort,
    TxMessageReplay,
    TxSegmentNumberExceeded,
    ProcessingError,
    AccountAuthorisationFailed,
    AmountCheckFailed,
    SignerUnknown,
    InvalidSignerState,
    DuplicateSignature,
    /// A syntactically valid code this client has no name for.
    Other(String),
}

/// Known codes: (variant, wire code, symbolic name).
const KNOWN_CODES: &[(ReturnCode, &str, &str)] = &[
    (ReturnCode::Ok, "000000", "EBICS_OK"),
    (ReturnCode::DownloadPostprocessDone, "011000", "EBICS_DOWNLOAD_POSTPROCESS_DONE"),
    (ReturnCode::DownloadPostprocessSkipped, "011001", "EBICS_DOWNLOAD_POSTPROCESS_SKIPPED"),
    (ReturnCode::TxSegmentNumberUnderrun, "011101", "EBICS_TX_SEGMENT_NUMBER_UNDERRUN"),
    (ReturnCode::OrderParamsIgnored, "031001", "EBICS_ORDER_PARAMS_IGNORED"),
    (ReturnCode::AuthenticationFailed, "061001", "EBICS_AUTHENTICATION_FAILED"),
    (ReturnCode::InvalidRequest, "061002", "EBICS_INVALID_REQUEST"),
    (ReturnCode::InternalError, "061099", "EBICS_INTERNAL_ERROR"),
    (ReturnCode::TxRecoverySync, "061101", "EBICS_TX_RECOVERY_SYNC"),
    (ReturnCode::AuthorisationOrderTypeFailed, "090003", "EBICS_AUTHORISATION_ORDER_TYPE_FAILED"),
    (ReturnCode::NoDownloadDataAvailable, "090005", "EBICS_NO_DOWNLOAD_DATA_AVAILABLE"),
    (ReturnCode::InvalidUserOrUserState, "091002", "EBICS_INVALID_USER_OR_USER_STATE"),
    (ReturnCode::UserUnknown, "091003", "EBICS_USER_UNKNOWN"),
    (ReturnCode::InvalidUserState, "091004", "EBICS_INVALID_USER_STATE"),
    (ReturnCode::InvalidOrderType, "091005", "EBICS_INVALID_ORDER_TYPE"),
    (ReturnCode::UnsupportedOrderType, "091006", "EBICS_UNSUPPORTED_ORDER_TYPE"),
    (ReturnCode::TxUnknownTxid, "091101", "EBICS_TX_UNKNOWN_TXID"),
    (ReturnCode::TxAbort, "091102", "EBICS_TX_ABORT"),
    (ReturnCode::TxMessageReplay, "091103", "EBICS_TX_MESSAGE_REPLAY"),
    (ReturnCode::TxSegmentNumberExceeded, "091104", "EBICS_TX_SEGMENT_NUMBER_EXCEEDED"),
    (ReturnCode::ProcessingError, "091116", "EBICS_PROCESSING_ERROR"),
    (ReturnCode::AccountAuthorisationFailed, "091302", "EBICS_ACCOUNT_AUTHORISATION_FAILED"),
    (ReturnCode::AmountCheckFailed, "091303", "EBICS_AMOUNT_CHECK_FAILED"),
    (ReturnCode::SignerUnknown, "091304", "EBICS_SIGNER_UNKNOWN"),
    (ReturnCode::InvalidSignerState, "091305", "EBICS_INVALID_SIGNER_STATE"),
    (ReturnCode::DuplicateSignature, "091306", "EBICS_DUPLICATE_SIGNATURE"),
];

impl ReturnCode {
    /// Six-digit wire representation.
    pub fn code(&self) -> &str {
        match self {
            ReturnCode::Other(code) => code,
            known => KNOWN_CODES
                .iter()
                .find(|(variant, _, _)| variant == known)
                .map(|(_, code, _)| *code)
                .unwrap_or("??????"),
        }
    }

    /// Symbolic name such as `EBICS_OK`, if known.
    pub fn name(&self) -> Option<&'static str> {
        KNOWN_CODES
            .iter()
            .find(|(variant, _, _)| variant == self)
            .map(|(_, _, name)| *name)
    }

    pub fn is_ok(&self) -> bool {
        *self == ReturnCode::Ok
    }

    /// Severity class from the first two digits. Anything unreadable is
    /// an error.
    pub fn severity(&self) -> Severity {
        match self.code().get(..2) {
            Some("00") => Severity::Ok,
            Some("01") => Severity::Note,
            Some("03") => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Severity class of a return code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Note,
    Warning,
    Error,
}

impl FromStr for ReturnCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("malformed return code: {:?}", s));
        }
        Ok(KNOWN_CODES
            .iter()
            .find(|(_, wire, _)| *wire == code)
            .map(|(variant, _, _)| variant.clone())
            .unwrap_or_else(|| ReturnCode::Other(code.to_string())))
    }
}

impl TryFrom<String> for ReturnCode {
    type Error = String;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

impl From<ReturnCode> for String {
    fn from(code: ReturnCode) -> Self {
        code.code().to_string()
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.code()),
            None => write!(f, "{}", self.code()),
        }
    }
}
