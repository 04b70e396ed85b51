use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Query, State},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use chrono::Utc;
use ethers::types::Address;
use trade_registry_domain::{DocumentHash, TradeId, TradeParties};
use trade_registry_engine::{DAO_ABI_JSON, REGISTRY_ABI_JSON};
use trade_registry_store::validate_upload;
use trade_registry_utils::{checksum_hex, parse_wallet_address};

use crate::{
    App, AppDissolved,
    error::AppError,
    payload::{
        ContractDetailPayload, FinalizedContractPayload, VoteStatusPayload,
        request::{
            ContractQueryPayload, ContractQueryPayloadDissolved, ViewQueryPayload,
            ViewQueryPayloadDissolved,
        },
        response::{
            ContractInfoResponsePayload, FinalizedContractsResponsePayload,
            RegisterResponsePayload, VoteListResponsePayload,
        },
    },
    routes, session,
};

#[tracing::instrument(skip_all)]
pub async fn register(
    State(app): State<App>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<RegisterResponsePayload>, AppError> {
    let AppDissolved { auth, gateway, custody, .. } = app.dissolve();

    let party_a = session::authenticate(&auth, &headers)?;
    let form = read_register_form(multipart).await?;

    // Uploads are rejected before anything touches the chain.
    if !form.filename.to_lowercase().ends_with(".pdf") {
        return Err(AppError::NotPdfExtension);
    }
    validate_upload(&form.media_type, &form.content)?;

    let party_b = parse_wallet_address(&form.party_b)?;
    let parties = TradeParties::builder().party_a(party_a).party_b(party_b).build();

    let sha256 = DocumentHash::digest(&form.content);
    let trade_id = TradeId::mint(Utc::now());

    let tx_hash = gateway
        .register_contract(&sha256, &form.asset_id, &trade_id, parties)
        .await
        .inspect_err(|e| tracing::error!("on-chain registration failed: {e}"))?;

    custody.store(&trade_id, &tx_hash, &form.media_type, &form.content).await?;

    let response = RegisterResponsePayload::builder()
        .message("Contract registered".to_owned())
        .trade_id(trade_id)
        .sha256(sha256)
        .tx_hash(tx_hash)
        .build();

    Ok(Json(response))
}

#[tracing::instrument(skip_all)]
pub async fn get_contract(
    State(app): State<App>,
    headers: HeaderMap,
    Query(query): Query<ContractQueryPayload>,
) -> Result<Json<ContractDetailPayload>, AppError> {
    let AppDissolved { auth, gateway, custody, .. } = app.dissolve();

    session::authenticate(&auth, &headers)?;

    let ContractQueryPayloadDissolved { trade_id, tx_hash } = query.dissolve();
    let trade_id: TradeId = trade_id.parse()?;

    if let Some(tx_hash) = tx_hash {
        gateway.verify_registration_tx(&tx_hash).await?;
    }

    let record = gateway.get_contract(&trade_id).await?;
    let parties = gateway.get_voters(&trade_id).await?;
    let file_moved = custody.is_moved(&trade_id);

    Ok(Json(ContractDetailPayload::from_parts(&trade_id, &record, parties, file_moved)))
}

#[tracing::instrument(skip_all)]
pub async fn view_contract(
    State(app): State<App>,
    headers: HeaderMap,
    Query(query): Query<ViewQueryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let AppDissolved { auth, custody, .. } = app.dissolve();

    session::authenticate(&auth, &headers)?;

    let ViewQueryPayloadDissolved { trade_id } = query.dissolve();
    let trade_id: TradeId = trade_id.parse()?;

    let content = custody.reveal(&trade_id).await?;
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_owned()),
        (header::CONTENT_DISPOSITION, format!("inline; filename=\"{trade_id}.pdf\"")),
    ];

    Ok((headers, content))
}

#[tracing::instrument(skip_all)]
pub async fn vote_list(
    State(app): State<App>,
    headers: HeaderMap,
) -> Result<Json<VoteListResponsePayload>, AppError> {
    let AppDissolved { auth, gateway, .. } = app.dissolve();

    let caller = session::authenticate(&auth, &headers)?;

    let snapshots = routes::collect_snapshots(&gateway).await?;
    let vote_list = snapshots
        .iter()
        .filter(|snapshot| snapshot.parties().includes(caller))
        .map(|snapshot| {
            VoteStatusPayload::from_parts(
                snapshot.trade_id(),
                snapshot.parties(),
                snapshot.status(),
            )
        })
        .collect();

    Ok(Json(VoteListResponsePayload::builder().vote_list(vote_list).build()))
}

#[tracing::instrument(skip_all)]
pub async fn finalized_contracts(
    State(app): State<App>,
    headers: HeaderMap,
) -> Result<Json<FinalizedContractsResponsePayload>, AppError> {
    let AppDissolved { auth, gateway, custody, .. } = app.dissolve();

    let caller = session::authenticate(&auth, &headers)?;

    let snapshots = routes::collect_snapshots(&gateway).await?;
    let finalized_contracts = snapshots
        .iter()
        .filter(|snapshot| {
            snapshot.status().finalized() && snapshot.parties().includes(caller)
        })
        .map(|snapshot| {
            FinalizedContractPayload::from_snapshot(snapshot, custody.is_moved(snapshot.trade_id()))
        })
        .collect();

    let response = FinalizedContractsResponsePayload::builder()
        .finalized_contracts(finalized_contracts)
        .build();

    Ok(Json(response))
}

#[tracing::instrument(skip_all)]
pub async fn registry_contract_info(
    State(app): State<App>,
) -> Result<Json<ContractInfoResponsePayload>, AppError> {
    let AppDissolved { gateway, .. } = app.dissolve();

    Ok(Json(contract_info(gateway.registry_address(), REGISTRY_ABI_JSON)?))
}

#[tracing::instrument(skip_all)]
pub async fn dao_contract_info(
    State(app): State<App>,
) -> Result<Json<ContractInfoResponsePayload>, AppError> {
    let AppDissolved { gateway, .. } = app.dissolve();

    Ok(Json(contract_info(gateway.dao_address(), DAO_ABI_JSON)?))
}

// HELPERS
// ================================================================================================

struct RegisterForm {
    filename: String,
    media_type: String,
    content: Bytes,
    asset_id: String,
    party_b: String,
}

/// Reads the registration form fields out of the multipart body.
async fn read_register_form(mut multipart: Multipart) -> Result<RegisterForm, AppError> {
    let mut file = None;
    let mut asset_id = None;
    let mut party_b = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let media_type = field.content_type().unwrap_or_default().to_owned();
                let content = field.bytes().await?;
                file = Some((filename, media_type, content));
            },
            Some("asset_id") => asset_id = Some(field.text().await?),
            Some("party_b") => party_b = Some(field.text().await?),
            _ => {},
        }
    }

    let (filename, media_type, content) = file.ok_or(AppError::MissingField("file"))?;

    Ok(RegisterForm {
        filename,
        media_type,
        content,
        asset_id: asset_id.ok_or(AppError::MissingField("asset_id"))?,
        party_b: party_b.ok_or(AppError::MissingField("party_b"))?,
    })
}

/// Builds the contract descriptor wallet frontends bind to.
fn contract_info(
    address: Address,
    abi_json: &str,
) -> Result<ContractInfoResponsePayload, AppError> {
    let abi = serde_json::from_str(abi_json)
        .map_err(|e| AppError::other(format!("embedded abi failed to parse: {e}")))?;

    Ok(ContractInfoResponsePayload::builder()
        .contract_address(checksum_hex(address))
        .abi(abi)
        .build())
}
