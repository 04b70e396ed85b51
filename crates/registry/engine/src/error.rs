use core::time::Duration;
use std::borrow::Cow;

use ethers::types::Address;
use trade_registry_domain::TradeId;

pub type Result<T, E = ChainError> = core::result::Result<T, E>;

/// Errors raised by the chain gateway.
///
/// Submission-side failures are never retried internally; callers see the
/// failure and decide whether to resubmit.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The configured signer key is not a usable private key.
    #[error("signer key is not a valid private key")]
    InvalidSignerKey,

    /// Gas estimation failed before submission.
    #[error("gas estimation failed: {0}")]
    EstimationFailed(String),

    /// The signed transaction was rejected at submission.
    #[error("transaction submission failed: {0}")]
    SubmissionFailed(String),

    /// The receipt for a submitted transaction could not be loaded.
    #[error("failed to load transaction receipt: {0}")]
    ReceiptFailed(String),

    /// No receipt arrived within the configured wait window.
    #[error("no receipt for {tx_hash} after {} seconds", .waited.as_secs())]
    ReceiptTimeout {
        /// The submitted transaction hash.
        tx_hash: String,
        /// How long the gateway waited before giving up.
        waited: Duration,
    },

    /// The transaction was mined but reverted.
    #[error("transaction reverted on chain: {tx_hash}")]
    TxReverted {
        /// The reverted transaction hash.
        tx_hash: String,
    },

    /// The supplied transaction targets a different contract.
    #[error("transaction does not target the registry contract at {expected:?}")]
    TxMismatch {
        /// The registry contract address the receipt was checked against.
        expected: Address,
        /// The address the transaction actually targeted, when present.
        actual: Option<Address>,
    },

    /// The supplied transaction hash is not 32 hex bytes.
    #[error("malformed transaction hash: {0}")]
    MalformedTxHash(String),

    /// DAO finalization attempted before any roster member voted.
    #[error("no DAO vote has been cast for {0}")]
    NoVotesCast(TradeId),

    /// The registry holds no registration under this trade id.
    #[error("no registration on chain for {0}")]
    TradeNotFound(TradeId),

    /// A contract call failed for a reason other than a revert.
    #[error("contract call {method} failed: {reason}")]
    CallFailed {
        /// The contract method that was invoked.
        method: &'static str,
        /// The underlying failure.
        reason: String,
    },

    /// An unclassified error occurred.
    #[error("other error: {0}")]
    Other(Cow<'static, str>),
}

impl ChainError {
    /// Creates a [`ChainError::CallFailed`] from any printable cause.
    pub(crate) fn call(method: &'static str, reason: impl ToString) -> Self {
        Self::CallFailed { method, reason: reason.to_string() }
    }

    /// Creates an unclassified error from any printable reason.
    pub fn other(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Other(reason.into())
    }
}
