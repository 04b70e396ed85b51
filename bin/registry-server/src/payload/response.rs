use bon::Builder;
use serde::Serialize;
use serde_with::DisplayFromStr;
use trade_registry_domain::{DocumentHash, TradeId};

use crate::payload::{
    CompletedDaoVotePayload, FinalizedContractPayload, PendingDaoVotePayload, VoteStatusPayload,
};

#[derive(Debug, Builder, Serialize)]
pub struct NonceResponsePayload {
    nonce: String,
}

#[derive(Debug, Builder, Serialize)]
pub struct MessageResponsePayload {
    message: String,
}

#[derive(Debug, Builder, Serialize)]
pub struct MeResponsePayload {
    address: String,
}

#[serde_with::serde_as]
#[derive(Debug, Builder, Serialize)]
pub struct RegisterResponsePayload {
    message: String,

    #[serde_as(as = "DisplayFromStr")]
    trade_id: TradeId,

    #[serde_as(as = "DisplayFromStr")]
    sha256: DocumentHash,

    tx_hash: String,
}

#[derive(Debug, Builder, Serialize)]
pub struct VoteListResponsePayload {
    vote_list: Vec<VoteStatusPayload>,
}

#[derive(Debug, Builder, Serialize)]
pub struct FinalizedContractsResponsePayload {
    finalized_contracts: Vec<FinalizedContractPayload>,
}

#[derive(Debug, Builder, Serialize)]
pub struct ContractInfoResponsePayload {
    contract_address: String,
    abi: serde_json::Value,
}

#[derive(Debug, Builder, Serialize)]
pub struct CheckAdminResponsePayload {
    is_admin: bool,
}

#[derive(Debug, Builder, Serialize)]
pub struct DaoVotesResponsePayload {
    dao_votes: Vec<FinalizedContractPayload>,
}

#[derive(Debug, Builder, Serialize)]
pub struct PendingDaoVotesResponsePayload {
    pending_dao_votes: Vec<PendingDaoVotePayload>,
}

#[derive(Debug, Builder, Serialize)]
pub struct CompletedDaoVotesResponsePayload {
    completed_dao_votes: Vec<CompletedDaoVotePayload>,
}

#[derive(Debug, Builder, Serialize)]
pub struct FinalizeDaoVoteResponsePayload {
    success: bool,
    message: String,
    tx_hash: String,
}

#[derive(Debug, Builder, Serialize)]
pub struct VoterVoteResponsePayload {
    voted: bool,
    approved: bool,
}

#[derive(Debug, Builder, Serialize)]
pub struct AddVoterResponsePayload {
    success: bool,
    message: String,
    tx_hash: String,
}
