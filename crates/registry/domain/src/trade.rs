//! Trade identifiers and the on-chain registration record.

use core::{fmt, str::FromStr};

use bon::Builder;
use chrono::{DateTime, Utc};
use dissolve_derive::Dissolve;
use ethers::types::Address;
use thiserror::Error;
use uuid::Uuid;

use crate::hash::DocumentHash;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A unique identifier for one contract-registration lifecycle.
///
/// Trade ids follow the fixed format `TRD-<UTC %Y%m%d%H%M%S>-<8 hex>`, e.g.
/// `TRD-20250101120000-3fa9c01b`. The random suffix comes from a v4 UUID, so
/// two trades minted within the same second stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct TradeId(String);

/// Error raised when parsing a string that is not a well-formed trade id.
#[derive(Debug, Error)]
pub enum TradeIdError {
    /// The input did not match `TRD-<14 digits>-<8 lowercase hex>`.
    #[error("trade id must match TRD-<14 digits>-<8 hex>, got {0:?}")]
    Malformed(String),
}

impl TradeId {
    const TIMESTAMP_LEN: usize = 14;
    const SUFFIX_LEN: usize = 8;

    /// Mints a fresh trade id for the given instant.
    pub fn mint(now: DateTime<Utc>) -> Self {
        let timestamp = now.format("%Y%m%d%H%M%S");
        let random_part = Uuid::new_v4().simple().to_string();

        Self(format!("TRD-{timestamp}-{}", &random_part[..Self::SUFFIX_LEN]))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TradeId {
    type Err = TradeIdError;

    /// Parses a trade id, rejecting anything that does not match the minted
    /// format exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TradeIdError::Malformed(s.into());

        let rest = s.strip_prefix("TRD-").ok_or_else(malformed)?;
        let (timestamp, rest) = rest
            .split_at_checked(Self::TIMESTAMP_LEN)
            .ok_or_else(malformed)?;
        let suffix = rest.strip_prefix('-').ok_or_else(malformed)?;

        let timestamp_ok = timestamp.chars().all(|c| c.is_ascii_digit());
        let suffix_ok = suffix.len() == Self::SUFFIX_LEN
            && suffix
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));

        if !(timestamp_ok && suffix_ok) {
            return Err(malformed());
        }

        Ok(Self(s.into()))
    }
}

impl fmt::Display for TradeId {
    /// Formats the trade id as its underlying string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TradeId> for String {
    /// Converts a `TradeId` into its underlying string.
    fn from(TradeId(id): TradeId) -> Self {
        id
    }
}

/// The registration record held by the registry contract for one trade.
///
/// Immutable once registered; the backend only ever reads it back.
#[derive(Debug, Clone, Builder, Dissolve)]
pub struct TradeRecord {
    /// The sha256 hash of the registered PDF.
    contract_hash: DocumentHash,

    /// The asset the contract concerns.
    asset_id: String,

    /// The address that submitted the registration transaction.
    registrant: Address,

    /// The chain timestamp of the registration block.
    registered_at: DateTime<Utc>,
}

impl TradeRecord {
    /// Returns the registered document hash.
    pub fn contract_hash(&self) -> &DocumentHash {
        &self.contract_hash
    }

    /// Returns the asset id.
    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    /// Returns the registrant address.
    pub fn registrant(&self) -> Address {
        self.registrant
    }

    /// Returns the registration timestamp.
    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }
}

/// The two wallet addresses bound to a trade.
///
/// Party A is the registrant-side signer; party B the counterparty. Both are
/// eligible to cast the first-stage vote.
#[derive(Debug, Clone, Copy, Builder, Dissolve)]
pub struct TradeParties {
    /// Party A of the trade.
    party_a: Address,

    /// Party B of the trade.
    party_b: Address,
}

impl TradeParties {
    /// Returns party A's address.
    pub fn party_a(&self) -> Address {
        self.party_a
    }

    /// Returns party B's address.
    pub fn party_b(&self) -> Address {
        self.party_b
    }

    /// Reports whether the given address is one of the two parties.
    pub fn includes(&self, address: Address) -> bool {
        self.party_a == address || self.party_b == address
    }
}
