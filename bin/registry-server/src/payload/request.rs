use dissolve_derive::Dissolve;
use serde::Deserialize;

#[derive(Debug, Dissolve, Deserialize)]
pub struct NonceRequestPayload {
    address: String,
}

#[derive(Debug, Dissolve, Deserialize)]
pub struct VerifyRequestPayload {
    address: String,
    signature: String,
}

#[derive(Debug, Dissolve, Deserialize)]
pub struct FinalizeDaoVoteRequestPayload {
    trade_id: String,
    passed: bool,
}

#[derive(Debug, Dissolve, Deserialize)]
pub struct AddVoterRequestPayload {
    voter: String,
}

#[derive(Debug, Dissolve, Deserialize)]
pub struct ContractQueryPayload {
    trade_id: String,
    tx_hash: Option<String>,
}

#[derive(Debug, Dissolve, Deserialize)]
pub struct ViewQueryPayload {
    trade_id: String,
}

#[derive(Debug, Dissolve, Deserialize)]
pub struct VoterVoteQueryPayload {
    trade_id: String,
    voter: String,
}
