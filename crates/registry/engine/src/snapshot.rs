//! A trade's joined on-chain state.

use bon::Builder;
use dissolve_derive::Dissolve;
use trade_registry_domain::{DaoTally, TradeId, TradeParties, TradeRecord, VoteStatus};

/// One trade's full on-chain state, read from both contracts.
///
/// A snapshot is a point-in-time join; nothing in it is cached or kept fresh.
#[derive(Debug, Clone, Builder, Dissolve)]
pub struct TradeSnapshot {
    /// The trade this snapshot describes.
    trade_id: TradeId,

    /// The registration record held by the registry.
    record: TradeRecord,

    /// The two parties bound to the trade.
    parties: TradeParties,

    /// First-stage vote flags.
    status: VoteStatus,

    /// Second-stage DAO tally.
    tally: DaoTally,
}

impl TradeSnapshot {
    /// The trade id.
    pub fn trade_id(&self) -> &TradeId {
        &self.trade_id
    }

    /// The registration record.
    pub fn record(&self) -> &TradeRecord {
        &self.record
    }

    /// The two trade parties.
    pub fn parties(&self) -> TradeParties {
        self.parties
    }

    /// First-stage vote flags.
    pub fn status(&self) -> VoteStatus {
        self.status
    }

    /// The DAO tally.
    pub fn tally(&self) -> DaoTally {
        self.tally
    }
}
