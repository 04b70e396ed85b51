use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use trade_registry_domain::TradeId;
use trade_registry_utils::{checksum_hex, parse_wallet_address};

use crate::{
    App, AppDissolved,
    error::AppError,
    payload::{
        CompletedDaoVotePayload, FinalizedContractPayload, PendingDaoVotePayload,
        request::{
            AddVoterRequestPayload, AddVoterRequestPayloadDissolved,
            FinalizeDaoVoteRequestPayload, FinalizeDaoVoteRequestPayloadDissolved,
            VoterVoteQueryPayload, VoterVoteQueryPayloadDissolved,
        },
        response::{
            AddVoterResponsePayload, CheckAdminResponsePayload, CompletedDaoVotesResponsePayload,
            DaoVotesResponsePayload, FinalizeDaoVoteResponsePayload,
            PendingDaoVotesResponsePayload, VoterVoteResponsePayload,
        },
    },
    routes, session,
};

#[tracing::instrument(skip_all)]
pub async fn check_admin(
    State(app): State<App>,
    headers: HeaderMap,
) -> Result<Json<CheckAdminResponsePayload>, AppError> {
    let AppDissolved { auth, admins, .. } = app.dissolve();

    let caller = session::authenticate(&auth, &headers)?;
    session::authorize_admin(&admins, caller)?;

    Ok(Json(CheckAdminResponsePayload::builder().is_admin(true).build()))
}

#[tracing::instrument(skip_all)]
pub async fn all_dao_votes(
    State(app): State<App>,
    headers: HeaderMap,
) -> Result<Json<DaoVotesResponsePayload>, AppError> {
    let AppDissolved { auth, admins, gateway, custody, .. } = app.dissolve();

    let caller = session::authenticate(&auth, &headers)?;
    session::authorize_admin(&admins, caller)?;

    let snapshots = routes::collect_snapshots(&gateway).await?;
    let dao_votes = snapshots
        .iter()
        .filter(|snapshot| snapshot.status().finalized())
        .map(|snapshot| {
            FinalizedContractPayload::from_snapshot(snapshot, custody.is_moved(snapshot.trade_id()))
        })
        .collect();

    Ok(Json(DaoVotesResponsePayload::builder().dao_votes(dao_votes).build()))
}

#[tracing::instrument(skip_all)]
pub async fn pending_dao_votes(
    State(app): State<App>,
    headers: HeaderMap,
) -> Result<Json<PendingDaoVotesResponsePayload>, AppError> {
    let AppDissolved { auth, admins, gateway, custody, .. } = app.dissolve();

    let caller = session::authenticate(&auth, &headers)?;
    session::authorize_admin(&admins, caller)?;

    let snapshots = routes::collect_snapshots(&gateway).await?;

    let mut pending_dao_votes = Vec::new();
    for snapshot in &snapshots {
        if !snapshot.status().finalized() || snapshot.tally().processed() {
            continue;
        }

        // The roster breakdown is an extra probe per trade; a failure skips
        // that trade only.
        match gateway.dao_breakdown(snapshot.trade_id()).await {
            Ok(breakdown) => pending_dao_votes.push(PendingDaoVotePayload::from_parts(
                snapshot,
                &breakdown,
                custody.is_moved(snapshot.trade_id()),
            )),
            Err(e) => {
                tracing::error!(trade_id = %snapshot.trade_id(), "skipping pending vote: {e}");
            },
        }
    }

    let response =
        PendingDaoVotesResponsePayload::builder().pending_dao_votes(pending_dao_votes).build();

    Ok(Json(response))
}

#[tracing::instrument(skip_all)]
pub async fn completed_dao_votes(
    State(app): State<App>,
    headers: HeaderMap,
) -> Result<Json<CompletedDaoVotesResponsePayload>, AppError> {
    let AppDissolved { auth, admins, gateway, custody, .. } = app.dissolve();

    let caller = session::authenticate(&auth, &headers)?;
    session::authorize_admin(&admins, caller)?;

    let snapshots = routes::collect_snapshots(&gateway).await?;
    let completed_dao_votes = snapshots
        .iter()
        .filter(|snapshot| snapshot.status().finalized() && snapshot.tally().processed())
        .map(|snapshot| {
            CompletedDaoVotePayload::from_snapshot(snapshot, custody.is_moved(snapshot.trade_id()))
        })
        .collect();

    let response =
        CompletedDaoVotesResponsePayload::builder().completed_dao_votes(completed_dao_votes).build();

    Ok(Json(response))
}

#[tracing::instrument(skip_all)]
pub async fn finalize_dao_vote(
    State(app): State<App>,
    headers: HeaderMap,
    Json(payload): Json<FinalizeDaoVoteRequestPayload>,
) -> Result<Json<FinalizeDaoVoteResponsePayload>, AppError> {
    let AppDissolved { auth, admins, gateway, custody, .. } = app.dissolve();

    let caller = session::authenticate(&auth, &headers)?;
    session::authorize_admin(&admins, caller)?;

    let FinalizeDaoVoteRequestPayloadDissolved { trade_id, passed } = payload.dissolve();
    let trade_id: TradeId = trade_id.parse()?;

    // The DAO contract settles the outcome from its own tally; the flag in
    // the payload only records the admin's stated intent.
    tracing::info!(%trade_id, passed, "finalizing DAO vote");

    let tx_hash = gateway
        .finalize_dao_vote(&trade_id)
        .await
        .inspect_err(|e| tracing::error!("DAO finalization failed: {e}"))?;

    custody.finalize(&trade_id).await?;

    let response = FinalizeDaoVoteResponsePayload::builder()
        .success(true)
        .message("Second-stage DAO vote completed".to_owned())
        .tx_hash(tx_hash)
        .build();

    Ok(Json(response))
}

#[tracing::instrument(skip_all)]
pub async fn list_voters(
    State(app): State<App>,
    headers: HeaderMap,
) -> Result<Json<Vec<String>>, AppError> {
    let AppDissolved { auth, admins, gateway, .. } = app.dissolve();

    let caller = session::authenticate(&auth, &headers)?;
    session::authorize_admin(&admins, caller)?;

    let voters = gateway.dao_voters().await?.into_iter().map(checksum_hex).collect();

    Ok(Json(voters))
}

#[tracing::instrument(skip_all)]
pub async fn voter_vote_status(
    State(app): State<App>,
    headers: HeaderMap,
    Query(query): Query<VoterVoteQueryPayload>,
) -> Result<Json<VoterVoteResponsePayload>, AppError> {
    let AppDissolved { auth, admins, gateway, .. } = app.dissolve();

    let caller = session::authenticate(&auth, &headers)?;
    session::authorize_admin(&admins, caller)?;

    let VoterVoteQueryPayloadDissolved { trade_id, voter } = query.dissolve();
    let trade_id: TradeId = trade_id.parse()?;
    let voter = parse_wallet_address(&voter)?;

    let vote = gateway.dao_voter_vote(&trade_id, voter).await?;

    Ok(Json(
        VoterVoteResponsePayload::builder().voted(vote.voted()).approved(vote.approved()).build(),
    ))
}

#[tracing::instrument(skip_all)]
pub async fn add_voter(
    State(app): State<App>,
    headers: HeaderMap,
    Json(payload): Json<AddVoterRequestPayload>,
) -> Result<Json<AddVoterResponsePayload>, AppError> {
    let AppDissolved { auth, admins, gateway, .. } = app.dissolve();

    let caller = session::authenticate(&auth, &headers)?;
    session::authorize_admin(&admins, caller)?;

    let AddVoterRequestPayloadDissolved { voter } = payload.dissolve();
    let voter = parse_wallet_address(&voter)?;

    let tx_hash = gateway
        .add_dao_voter(voter)
        .await
        .inspect_err(|e| tracing::error!("voter grant failed: {e}"))?;

    let response = AddVoterResponsePayload::builder()
        .success(true)
        .message("Voting rights granted".to_owned())
        .tx_hash(tx_hash)
        .build();

    Ok(Json(response))
}
