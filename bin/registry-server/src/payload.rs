pub mod request;
pub mod response;

use bon::Builder;
use serde::Serialize;
use serde_with::DisplayFromStr;
use trade_registry_domain::{
    DocumentHash, TradeId, TradeParties, TradeRecord, VoteStatus, VoterBreakdown,
};
use trade_registry_engine::TradeSnapshot;
use trade_registry_utils::checksum_hex;

/// Wire format for on-chain timestamps, matching what wallet frontends render.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One trade's registration data joined with its custody state.
///
/// Flattened into the admin listing payloads, so every field name here is
/// shared wire surface.
#[serde_with::serde_as]
#[derive(Debug, Builder, Serialize)]
pub struct ContractDetailPayload {
    #[serde_as(as = "DisplayFromStr")]
    trade_id: TradeId,

    #[serde_as(as = "DisplayFromStr")]
    #[serde(rename = "contractHash")]
    contract_hash: DocumentHash,

    #[serde(rename = "assetId")]
    asset_id: String,

    registrant: String,

    /// Registration time as unix seconds, straight off the chain.
    timestamp: i64,

    /// The same instant rendered as `YYYY-MM-DD HH:MM:SS` UTC.
    datetime: String,

    #[serde(rename = "partyA")]
    party_a: String,

    #[serde(rename = "partyB")]
    party_b: String,

    #[serde(rename = "fileMoved")]
    file_moved: bool,
}

/// First-stage vote flags for one trade, as listed to its parties.
#[serde_with::serde_as]
#[derive(Debug, Builder, Serialize)]
pub struct VoteStatusPayload {
    #[serde_as(as = "DisplayFromStr")]
    trade_id: TradeId,

    #[serde(rename = "partyA")]
    party_a: String,

    #[serde(rename = "partyB")]
    party_b: String,

    #[serde(rename = "votedA")]
    voted_a: bool,

    #[serde(rename = "votedB")]
    voted_b: bool,

    #[serde(rename = "approvedA")]
    approved_a: bool,

    #[serde(rename = "approvedB")]
    approved_b: bool,

    finalized: bool,
}

/// A party-finalized trade together with its second-stage DAO outcome.
#[derive(Debug, Builder, Serialize)]
pub struct FinalizedContractPayload {
    #[serde(flatten)]
    detail: ContractDetailPayload,

    #[serde(rename = "approvedA")]
    approved_a: bool,

    #[serde(rename = "approvedB")]
    approved_b: bool,

    #[serde(rename = "daoProcessed")]
    dao_processed: bool,

    #[serde(rename = "daoPassed")]
    dao_passed: Option<bool>,
}

/// A trade awaiting DAO finalization, with the roster partitioned by vote.
#[derive(Debug, Builder, Serialize)]
pub struct PendingDaoVotePayload {
    #[serde(flatten)]
    detail: ContractDetailPayload,

    #[serde(rename = "daoProcessed")]
    dao_processed: bool,

    #[serde(rename = "daoPassed")]
    dao_passed: Option<bool>,

    #[serde(rename = "yesVoters")]
    yes_voters: Vec<String>,

    #[serde(rename = "noVoters")]
    no_voters: Vec<String>,

    #[serde(rename = "notVoted")]
    not_voted: Vec<String>,
}

/// A trade whose DAO vote has been processed.
#[derive(Debug, Builder, Serialize)]
pub struct CompletedDaoVotePayload {
    #[serde(flatten)]
    detail: ContractDetailPayload,

    #[serde(rename = "daoProcessed")]
    dao_processed: bool,

    #[serde(rename = "daoPassed")]
    dao_passed: Option<bool>,
}

impl ContractDetailPayload {
    pub fn from_parts(
        trade_id: &TradeId,
        record: &TradeRecord,
        parties: TradeParties,
        file_moved: bool,
    ) -> Self {
        let registered_at = record.registered_at();

        Self::builder()
            .trade_id(trade_id.clone())
            .contract_hash(record.contract_hash().clone())
            .asset_id(record.asset_id().to_owned())
            .registrant(checksum_hex(record.registrant()))
            .timestamp(registered_at.timestamp())
            .datetime(registered_at.format(DATETIME_FORMAT).to_string())
            .party_a(checksum_hex(parties.party_a()))
            .party_b(checksum_hex(parties.party_b()))
            .file_moved(file_moved)
            .build()
    }
}

impl VoteStatusPayload {
    pub fn from_parts(trade_id: &TradeId, parties: TradeParties, status: VoteStatus) -> Self {
        Self::builder()
            .trade_id(trade_id.clone())
            .party_a(checksum_hex(parties.party_a()))
            .party_b(checksum_hex(parties.party_b()))
            .voted_a(status.voted_a())
            .voted_b(status.voted_b())
            .approved_a(status.approved_a())
            .approved_b(status.approved_b())
            .finalized(status.finalized())
            .build()
    }
}

impl FinalizedContractPayload {
    pub fn from_snapshot(snapshot: &TradeSnapshot, file_moved: bool) -> Self {
        let status = snapshot.status();
        let tally = snapshot.tally();

        Self::builder()
            .detail(detail_of(snapshot, file_moved))
            .approved_a(status.approved_a())
            .approved_b(status.approved_b())
            .dao_processed(tally.processed())
            .maybe_dao_passed(tally.passed())
            .build()
    }
}

impl PendingDaoVotePayload {
    pub fn from_parts(
        snapshot: &TradeSnapshot,
        breakdown: &VoterBreakdown,
        file_moved: bool,
    ) -> Self {
        let tally = snapshot.tally();

        Self::builder()
            .detail(detail_of(snapshot, file_moved))
            .dao_processed(tally.processed())
            .maybe_dao_passed(tally.passed())
            .yes_voters(checksummed(breakdown.yes_voters()))
            .no_voters(checksummed(breakdown.no_voters()))
            .not_voted(checksummed(breakdown.not_voted()))
            .build()
    }
}

impl CompletedDaoVotePayload {
    pub fn from_snapshot(snapshot: &TradeSnapshot, file_moved: bool) -> Self {
        let tally = snapshot.tally();

        Self::builder()
            .detail(detail_of(snapshot, file_moved))
            .dao_processed(tally.processed())
            .maybe_dao_passed(tally.passed())
            .build()
    }
}

fn detail_of(snapshot: &TradeSnapshot, file_moved: bool) -> ContractDetailPayload {
    ContractDetailPayload::from_parts(
        snapshot.trade_id(),
        snapshot.record(),
        snapshot.parties(),
        file_moved,
    )
}

fn checksummed(addresses: &[ethers::types::Address]) -> Vec<String> {
    addresses.iter().copied().map(checksum_hex).collect()
}
