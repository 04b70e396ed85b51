//! On-chain gateway to the registry and DAO contracts.
//!
//! All durable trade state lives in two externally-deployed contracts; this
//! crate is the only place the backend touches them. Reads go through
//! `eth_call`, writes are signed locally and submitted over JSON-RPC.
//!
//! # Main Components
//!
//! - [`ChainGateway`]: signs and submits transactions and reads contract
//!   state for both the registry and the DAO.
//! - [`TradeSnapshot`]: one trade's state joined across both contracts.
//! - [`ChainError`]: the failure taxonomy callers branch on.
//!
//! # Usage
//!
//! ```no_run
//! # use core::time::Duration;
//! # use trade_registry_engine::{ChainGateway, ChainGatewayConfig};
//! # fn demo() -> trade_registry_engine::Result<()> {
//! let config = ChainGatewayConfig::builder()
//!     .rpc_url("https://rpc.sepolia.org".parse().unwrap())
//!     .signer_key("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_owned())
//!     .chain_id(11_155_111)
//!     .registry_address("0x5FbDB2315678afecb367f032d93F642f64180aa3".parse().unwrap())
//!     .dao_address("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512".parse().unwrap())
//!     .gas_price_gwei(30)
//!     .receipt_timeout(Duration::from_secs(120))
//!     .build();
//!
//! let gateway = ChainGateway::connect(config)?;
//! # let _ = gateway;
//! # Ok(())
//! # }
//! ```

mod error;
mod snapshot;

pub use self::{
    error::{ChainError, Result},
    snapshot::{TradeSnapshot, TradeSnapshotDissolved},
};

use core::time::Duration;
use std::sync::Arc;

use bon::Builder;
use chrono::{DateTime, Utc};
use ethers::{
    abi::{Abi, Detokenize, Tokenize},
    contract::Contract,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, TxHash, U256, U64},
};
use futures::{Stream, StreamExt, stream};
use trade_registry_domain::{
    DaoTally, DaoVote, DocumentHash, TradeId, TradeParties, TradeRecord, VoteStatus,
    VoterBreakdown,
};
use url::Url;

/// The registry contract ABI, served to wallet frontends as-is.
pub const REGISTRY_ABI_JSON: &str = include_str!("abi/registry.json");

/// The DAO contract ABI, served to wallet frontends as-is.
pub const DAO_ABI_JSON: &str = include_str!("abi/dao.json");

/// Headroom added on top of a gas estimate before submission, in percent.
const GAS_HEADROOM_PERCENT: u64 = 30;

/// Fixed gas limit for the DAO finalize transaction.
const FINALIZE_GAS_LIMIT: u64 = 300_000;

/// The middleware stack every call goes through: local signing over HTTP RPC.
type ChainClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Configuration for the chain gateway.
///
/// # Fields
///
/// * `rpc_url` - JSON-RPC endpoint of the Ethereum-compatible node
/// * `signer_key` - hex-encoded private key that signs every backend transaction
/// * `chain_id` - chain id applied to signatures
/// * `registry_address` - deployed registry contract
/// * `dao_address` - deployed DAO contract
/// * `gas_price_gwei` - fixed gas price applied to every submission
/// * `receipt_timeout` - how long finalization waits for its receipt
#[derive(Builder)]
pub struct ChainGatewayConfig {
    rpc_url: Url,
    signer_key: String,
    chain_id: u64,
    registry_address: Address,
    dao_address: Address,
    gas_price_gwei: u64,
    receipt_timeout: Duration,
}

/// Gateway to the registry and DAO contracts over one signing RPC client.
///
/// Write paths estimate gas with headroom (registration, voter grants) or run
/// at the fixed finalize gas limit, always with the configured fixed gas
/// price. Registration submits fire-and-forget; finalization waits for its
/// receipt under a bounded timeout. Submissions are never retried internally.
pub struct ChainGateway {
    client: Arc<ChainClient>,
    registry: Contract<ChainClient>,
    dao: Contract<ChainClient>,
    gas_price: U256,
    receipt_timeout: Duration,
}

impl ChainGateway {
    /// Builds the signing client and binds both contract instances.
    ///
    /// Nothing is dialed here; the node is first reached by whichever call
    /// runs first.
    ///
    /// # Errors
    ///
    /// [`ChainError::InvalidSignerKey`] when the configured key does not
    /// parse as a private key.
    pub fn connect(config: ChainGatewayConfig) -> Result<Self> {
        let ChainGatewayConfig {
            rpc_url,
            signer_key,
            chain_id,
            registry_address,
            dao_address,
            gas_price_gwei,
            receipt_timeout,
        } = config;

        let wallet: LocalWallet = signer_key.parse().map_err(|_| ChainError::InvalidSignerKey)?;
        let provider = Provider::new(Http::new(rpc_url));
        let client = Arc::new(SignerMiddleware::new(provider, wallet.with_chain_id(chain_id)));

        let registry = Contract::new(
            registry_address,
            parse_abi("registry", REGISTRY_ABI_JSON)?,
            Arc::clone(&client),
        );
        let dao = Contract::new(dao_address, parse_abi("dao", DAO_ABI_JSON)?, Arc::clone(&client));

        Ok(Self {
            client,
            registry,
            dao,
            gas_price: U256::from(gas_price_gwei) * U256::exp10(9),
            receipt_timeout,
        })
    }

    /// The deployed registry contract address.
    pub fn registry_address(&self) -> Address {
        self.registry.address()
    }

    /// The deployed DAO contract address.
    pub fn dao_address(&self) -> Address {
        self.dao.address()
    }

    // REGISTRY CONTRACT
    // --------------------------------------------------------------------------------------------

    /// Registers a document hash on chain and returns the transaction hash.
    ///
    /// Estimates gas, pads the estimate, submits at the fixed gas price, and
    /// returns without waiting for the receipt.
    ///
    /// # Errors
    ///
    /// [`ChainError::EstimationFailed`] or [`ChainError::SubmissionFailed`].
    #[tracing::instrument(skip_all, fields(trade_id = %trade_id))]
    pub async fn register_contract(
        &self,
        contract_hash: &DocumentHash,
        asset_id: &str,
        trade_id: &TradeId,
        parties: TradeParties,
    ) -> Result<String> {
        let args = (
            contract_hash.to_string(),
            asset_id.to_owned(),
            trade_id.to_string(),
            parties.party_a(),
            parties.party_b(),
        );

        self.submit_with_headroom(&self.registry, "registerContract", args).await
    }

    /// Reads one trade's registration record from the registry.
    ///
    /// # Errors
    ///
    /// [`ChainError::TradeNotFound`] when the lookup reverts, which is how
    /// the registry answers an unknown trade id.
    #[tracing::instrument(skip_all, fields(trade_id = %trade_id))]
    pub async fn get_contract(&self, trade_id: &TradeId) -> Result<TradeRecord> {
        let (contract_hash, asset_id, registrant, timestamp) = self
            .registry
            .method::<_, (String, String, Address, U256)>("getContract", trade_id.to_string())
            .map_err(|err| ChainError::call("getContract", err))?
            .call()
            .await
            .map_err(|err| {
                if err.is_revert() {
                    ChainError::TradeNotFound(trade_id.clone())
                } else {
                    ChainError::call("getContract", err)
                }
            })?;

        let record = TradeRecord::builder()
            .contract_hash(DocumentHash::from(contract_hash))
            .asset_id(asset_id)
            .registrant(registrant)
            .registered_at(chain_timestamp(timestamp))
            .build();

        Ok(record)
    }

    /// Reads the two party addresses bound to a trade.
    pub async fn get_voters(&self, trade_id: &TradeId) -> Result<TradeParties> {
        let (party_a, party_b) = self
            .view::<_, (Address, Address)>(&self.registry, "getVoters", trade_id.to_string())
            .await?;

        Ok(TradeParties::builder().party_a(party_a).party_b(party_b).build())
    }

    /// Reads the first-stage vote flags for a trade.
    pub async fn get_vote_status(&self, trade_id: &TradeId) -> Result<VoteStatus> {
        self.view::<_, (bool, bool, bool, bool, bool)>(
            &self.registry,
            "getVoteStatus",
            trade_id.to_string(),
        )
        .await
        .map(VoteStatus::from)
    }

    /// Lists every trade id the registry knows.
    ///
    /// Ids that do not parse are logged and dropped rather than failing the
    /// whole listing.
    #[tracing::instrument(skip_all)]
    pub async fn get_all_trade_ids(&self) -> Result<Vec<TradeId>> {
        let ids = self.view::<_, Vec<String>>(&self.registry, "getAllTradeIds", ()).await?;

        Ok(ids
            .into_iter()
            .filter_map(|id| {
                id.parse::<TradeId>()
                    .inspect_err(|err| tracing::warn!("skipping unparseable trade id: {err}"))
                    .ok()
            })
            .collect())
    }

    // DAO CONTRACT
    // --------------------------------------------------------------------------------------------

    /// Reads the DAO voter roster.
    pub async fn dao_voters(&self) -> Result<Vec<Address>> {
        self.view(&self.dao, "getVotersList", ()).await
    }

    /// Reads one roster member's vote on a trade.
    pub async fn dao_voter_vote(&self, trade_id: &TradeId, voter: Address) -> Result<DaoVote> {
        self.view::<_, (bool, bool)>(&self.dao, "getVoterVote", (trade_id.to_string(), voter))
            .await
            .map(DaoVote::from)
    }

    /// Reads the aggregated second-stage outcome for a trade.
    pub async fn dao_tally(&self, trade_id: &TradeId) -> Result<DaoTally> {
        let (yes, no, processed, passed) = self
            .view::<_, (U256, U256, bool, bool)>(&self.dao, "getVoteResult", trade_id.to_string())
            .await?;

        let tally = DaoTally::builder()
            .yes_count(yes.low_u64())
            .no_count(no.low_u64())
            .processed(processed)
            .passed(passed)
            .build();

        Ok(tally)
    }

    /// Partitions the DAO roster into yes / no / not-voted for one trade.
    ///
    /// The contract only exposes per-voter state, so the roster is probed one
    /// member at a time.
    #[tracing::instrument(skip_all, fields(trade_id = %trade_id))]
    pub async fn dao_breakdown(&self, trade_id: &TradeId) -> Result<VoterBreakdown> {
        let roster = self.dao_voters().await?;

        let mut votes = Vec::with_capacity(roster.len());
        for voter in roster {
            votes.push((voter, self.dao_voter_vote(trade_id, voter).await?));
        }

        Ok(VoterBreakdown::partition(votes))
    }

    /// Closes the DAO vote for a trade and returns the transaction hash.
    ///
    /// Refuses to submit while the roster shows zero cast votes. The
    /// transaction runs with the fixed finalize gas limit and the gateway
    /// waits for its receipt.
    ///
    /// # Errors
    ///
    /// - [`ChainError::NoVotesCast`] before any roster member has voted.
    /// - [`ChainError::ReceiptTimeout`] when the receipt does not arrive in
    ///   time; the transaction may still land afterwards.
    /// - [`ChainError::TxReverted`] when the receipt reports failure status.
    #[tracing::instrument(skip_all, fields(trade_id = %trade_id))]
    pub async fn finalize_dao_vote(&self, trade_id: &TradeId) -> Result<String> {
        if self.dao_breakdown(trade_id).await?.cast_count() == 0 {
            return Err(ChainError::NoVotesCast(trade_id.clone()));
        }

        let call = self
            .dao
            .method::<_, ()>("finalizeVote", trade_id.to_string())
            .map_err(|err| ChainError::call("finalizeVote", err))?
            .legacy()
            .gas(FINALIZE_GAS_LIMIT)
            .gas_price(self.gas_price);

        let pending =
            call.send().await.map_err(|err| ChainError::SubmissionFailed(err.to_string()))?;
        let tx_hash = format!("{:#x}", pending.tx_hash());

        let receipt = tokio::time::timeout(self.receipt_timeout, pending)
            .await
            .map_err(|_| ChainError::ReceiptTimeout {
                tx_hash: tx_hash.clone(),
                waited: self.receipt_timeout,
            })?
            .map_err(|err| ChainError::ReceiptFailed(err.to_string()))?
            .ok_or_else(|| {
                ChainError::ReceiptFailed(format!("transaction {tx_hash} dropped from the mempool"))
            })?;

        if receipt.status != Some(U64::from(1)) {
            return Err(ChainError::TxReverted { tx_hash });
        }

        tracing::info!("DAO vote finalized in {tx_hash}");

        Ok(tx_hash)
    }

    /// Grants DAO voting rights to an address and returns the transaction
    /// hash.
    #[tracing::instrument(skip_all, fields(voter = ?voter))]
    pub async fn add_dao_voter(&self, voter: Address) -> Result<String> {
        self.submit_with_headroom(&self.dao, "addVoter", voter).await
    }

    // RECEIPTS & SCANNING
    // --------------------------------------------------------------------------------------------

    /// Confirms a receipt exists for `tx_hash` and targets the registry.
    ///
    /// # Errors
    ///
    /// [`ChainError::MalformedTxHash`] for unparseable input,
    /// [`ChainError::TxMismatch`] when the receipt targets another address.
    #[tracing::instrument(skip_all)]
    pub async fn verify_registration_tx(&self, tx_hash: &str) -> Result<()> {
        let hash: TxHash =
            tx_hash.parse().map_err(|_| ChainError::MalformedTxHash(tx_hash.to_owned()))?;

        let receipt = self
            .client
            .get_transaction_receipt(hash)
            .await
            .map_err(|err| ChainError::ReceiptFailed(err.to_string()))?
            .ok_or_else(|| ChainError::ReceiptFailed(format!("no receipt found for {tx_hash}")))?;

        let expected = self.registry.address();
        if receipt.to != Some(expected) {
            return Err(ChainError::TxMismatch { expected, actual: receipt.to });
        }

        Ok(())
    }

    /// Joins one trade's state across the registry and DAO contracts.
    pub async fn snapshot(&self, trade_id: &TradeId) -> Result<TradeSnapshot> {
        let record = self.get_contract(trade_id).await?;
        let parties = self.get_voters(trade_id).await?;
        let status = self.get_vote_status(trade_id).await?;
        let tally = self.dao_tally(trade_id).await?;

        let snapshot = TradeSnapshot::builder()
            .trade_id(trade_id.clone())
            .record(record)
            .parties(parties)
            .status(status)
            .tally(tally)
            .build();

        Ok(snapshot)
    }

    /// Streams every known trade paired with its snapshot result.
    ///
    /// Failures stay per trade so one bad record cannot abort a whole
    /// listing; callers choose whether to log and skip or to fail.
    pub async fn scan_snapshots(
        &self,
    ) -> Result<impl Stream<Item = (TradeId, Result<TradeSnapshot>)> + '_> {
        let trade_ids = self.get_all_trade_ids().await?;

        Ok(stream::iter(trade_ids).then(move |trade_id| async move {
            let snapshot = self.snapshot(&trade_id).await;
            (trade_id, snapshot)
        }))
    }

    // HELPERS
    // --------------------------------------------------------------------------------------------

    /// Runs a read-only contract call and decodes its return tuple.
    async fn view<T, D>(
        &self,
        contract: &Contract<ChainClient>,
        method: &'static str,
        args: T,
    ) -> Result<D>
    where
        T: Tokenize,
        D: Detokenize,
    {
        contract
            .method::<T, D>(method, args)
            .map_err(|err| ChainError::call(method, err))?
            .call()
            .await
            .map_err(|err| ChainError::call(method, err))
    }

    /// Estimates, pads, and submits a state-changing call, returning the
    /// transaction hash without waiting for the receipt.
    async fn submit_with_headroom<T>(
        &self,
        contract: &Contract<ChainClient>,
        method: &'static str,
        args: T,
    ) -> Result<String>
    where
        T: Tokenize,
    {
        let call =
            contract.method::<T, ()>(method, args).map_err(|err| ChainError::call(method, err))?;

        let estimate = call
            .estimate_gas()
            .await
            .map_err(|err| ChainError::EstimationFailed(err.to_string()))?;

        let call = call.legacy().gas(pad_gas(estimate)).gas_price(self.gas_price);
        let pending =
            call.send().await.map_err(|err| ChainError::SubmissionFailed(err.to_string()))?;

        Ok(format!("{:#x}", pending.tx_hash()))
    }
}

/// Parses an embedded ABI fixture.
fn parse_abi(name: &'static str, json: &'static str) -> Result<Abi> {
    serde_json::from_str(json)
        .map_err(|err| ChainError::other(format!("embedded {name} abi failed to parse: {err}")))
}

/// Adds the configured headroom on top of a gas estimate.
fn pad_gas(estimate: U256) -> U256 {
    estimate.saturating_mul(U256::from(100 + GAS_HEADROOM_PERCENT)) / U256::from(100)
}

/// Converts a chain timestamp in seconds to UTC.
fn chain_timestamp(seconds: U256) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds.low_u64() as i64, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hardhat's well-known first dev account key; never funded anywhere real.
    const TEST_SIGNER_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn embedded_abis_cover_every_gateway_call() {
        let registry: Abi =
            serde_json::from_str(REGISTRY_ABI_JSON).expect("registry abi must parse");
        let dao: Abi = serde_json::from_str(DAO_ABI_JSON).expect("dao abi must parse");

        for method in [
            "registerContract",
            "getContract",
            "getVoters",
            "getVoteStatus",
            "getAllTradeIds",
            "voteOnContract",
        ] {
            registry
                .function(method)
                .unwrap_or_else(|_| panic!("registry abi is missing {method}"));
        }

        for method in
            ["getVotersList", "getVoterVote", "getVoteResult", "vote", "finalizeVote", "addVoter"]
        {
            dao.function(method).unwrap_or_else(|_| panic!("dao abi is missing {method}"));
        }
    }

    #[test]
    fn gas_padding_adds_thirty_percent() {
        assert_eq!(pad_gas(U256::from(100_000u64)), U256::from(130_000u64));
        assert_eq!(pad_gas(U256::from(21_000u64)), U256::from(27_300u64));
    }

    #[test]
    fn chain_timestamps_decode_to_utc() {
        let at = chain_timestamp(U256::from(1_735_732_800u64));

        assert_eq!(at.to_rfc3339(), "2025-01-01T12:00:00+00:00");
    }

    #[test]
    fn gateway_builds_offline() {
        let gateway = ChainGateway::connect(test_config(TEST_SIGNER_KEY))
            .expect("failed to build gateway");

        assert_eq!(gateway.registry_address(), Address::from_low_u64_be(0xaa));
        assert_eq!(gateway.dao_address(), Address::from_low_u64_be(0xbb));
        assert_eq!(gateway.gas_price, U256::from(30_000_000_000u64));
    }

    #[test]
    fn bad_signer_keys_are_rejected() {
        let result = ChainGateway::connect(test_config("not-a-key"));

        assert!(matches!(result, Err(ChainError::InvalidSignerKey)));
    }

    fn test_config(signer_key: &str) -> ChainGatewayConfig {
        ChainGatewayConfig::builder()
            .rpc_url("http://localhost:8545".parse().expect("valid url"))
            .signer_key(signer_key.to_owned())
            .chain_id(11_155_111)
            .registry_address(Address::from_low_u64_be(0xaa))
            .dao_address(Address::from_low_u64_be(0xbb))
            .gas_price_gwei(30)
            .receipt_timeout(Duration::from_secs(120))
            .build()
    }
}
