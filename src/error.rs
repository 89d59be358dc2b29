//! Error type shared by the permit, staking and balance modules.

use std::fmt;

use alloy::primitives::{Address, B256};

/// Result alias used across the SDK.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the SDK.
///
/// Nothing in the SDK retries: every variant is surfaced to the caller, which decides
/// whether to reconnect a wallet, re-read state or re-submit.
#[derive(Debug, derive_more::Display, derive_more::IsVariant)]
pub enum Error {
    /// No wallet signer was supplied for an operation that needs one.
    #[display("no wallet signer connected")]
    SignerUnavailable,
    /// The connected signer cannot produce EIP-712 typed data signatures.
    #[display("signer does not support EIP-712 typed data signing")]
    UnsupportedSigner,
    /// The amount is zero or could not be represented in smallest units.
    #[display("invalid amount: {_0}")]
    InvalidAmount(String),
    /// Another permit or staking operation for this owner has not finished yet.
    #[display("an operation for {_0} is already in flight")]
    OperationInFlight(Address),
    /// An action is already running on this [`AccountState`](crate::state::AccountState).
    #[display("an action is already running")]
    Busy,
    /// The signer failed to sign (user rejection, hardware error, ...).
    #[display("signing failed: {_0}")]
    Signing(alloy::signers::Error),
    /// The transaction failed on-chain.
    ///
    /// Expired permits, stale nonces and mismatched spenders are only detected by the
    /// contract and end up here, with the decoded revert reason when one is available.
    #[display("transaction reverted: {}", reason.as_deref().unwrap_or("no reason given"))]
    TransactionReverted {
        reason: Option<String>,
        tx_hash: Option<B256>,
    },
    /// A read-only query failed at the provider.
    #[display("read failed: {_0}")]
    ReadFailed(String),
    /// Submitting a transaction or waiting for its receipt failed at the transport.
    #[display("transport error: {_0}")]
    Transport(String),
    /// Amount conversion between decimal and smallest-unit representations failed.
    #[display("units: {_0}")]
    Units(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Signing(err) => Some(err),
            _ => None,
        }
    }
}

impl Error {
    /// Wraps a provider error from a read-only call.
    pub fn read(err: impl fmt::Display) -> Self {
        Self::ReadFailed(err.to_string())
    }

    /// A revert with a known reason and no mined transaction.
    pub fn reverted(reason: impl Into<String>) -> Self {
        Self::TransactionReverted {
            reason: Some(reason.into()),
            tx_hash: None,
        }
    }

    /// The revert reason, if this is a revert that carried one.
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Self::TransactionReverted { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }
}

impl From<alloy::signers::Error> for Error {
    fn from(err: alloy::signers::Error) -> Self {
        match err {
            alloy::signers::Error::UnsupportedOperation(_) => Self::UnsupportedSigner,
            err => Self::Signing(err),
        }
    }
}
