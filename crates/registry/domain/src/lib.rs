//! Domain types for the trade registry backend.
//!
//! This crate provides the core domain models for the contract-registration
//! and dual-stage voting lifecycle: trade identifiers, document hashes, the
//! on-chain record/vote views read back from the registry and DAO contracts,
//! and the backend-local file custody record.

pub mod custody;
pub mod hash;
pub mod trade;
pub mod vote;

pub use custody::FileRecord;
pub use hash::DocumentHash;
pub use trade::{TradeId, TradeIdError, TradeParties, TradeRecord};
pub use vote::{DaoTally, DaoVote, VoteStatus, VoterBreakdown};
