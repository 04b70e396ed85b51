#![allow(missing_docs)]

pub mod config;

mod error;
mod payload;
mod routes;
mod session;

use std::{collections::HashSet, sync::Arc};

use axum::{Router, extract::DefaultBodyLimit, routing};
use bon::Builder;
use dissolve_derive::Dissolve;
use ethers::types::Address;
use trade_registry_auth::WalletAuth;
use trade_registry_engine::ChainGateway;
use trade_registry_store::FileCustody;

pub fn create_router(app: App) -> Router {
    let body_limit = DefaultBodyLimit::max(app.upload_limit);

    Router::new()
        .route("/health", routing::get(routes::health))
        .route("/auth/nonce", routing::post(routes::auth::request_nonce))
        .route("/auth/verify", routing::post(routes::auth::verify_signature))
        .route("/auth/logout", routing::post(routes::auth::logout))
        .route("/auth/me", routing::get(routes::auth::me))
        .route("/api/register", routing::post(routes::trade::register))
        .route("/api/contract", routing::get(routes::trade::get_contract))
        .route("/api/contract/view", routing::get(routes::trade::view_contract))
        .route("/api/vote-list", routing::get(routes::trade::vote_list))
        .route("/api/finalized-contracts", routing::get(routes::trade::finalized_contracts))
        .route("/api/contract-info", routing::get(routes::trade::registry_contract_info))
        .route("/api/dao/contract-info", routing::get(routes::trade::dao_contract_info))
        .route("/api/admin/check-admin", routing::get(routes::admin::check_admin))
        .route("/api/admin/dao-votes/all", routing::get(routes::admin::all_dao_votes))
        .route("/api/admin/dao-votes/pending", routing::get(routes::admin::pending_dao_votes))
        .route("/api/admin/dao-votes/completed", routing::get(routes::admin::completed_dao_votes))
        .route("/api/admin/dao-votes/finalize", routing::post(routes::admin::finalize_dao_vote))
        .route("/api/admin/dao-votes/voters", routing::get(routes::admin::list_voters))
        .route("/api/admin/dao-votes/vote-status", routing::get(routes::admin::voter_vote_status))
        .route("/api/admin/add-voter", routing::post(routes::admin::add_voter))
        .layer(body_limit)
        .with_state(app)
}

#[derive(Clone, Builder, Dissolve)]
pub struct App {
    gateway: Arc<ChainGateway>,
    auth: Arc<WalletAuth>,
    custody: Arc<FileCustody>,
    admins: Arc<HashSet<Address>>,
    secure_cookies: bool,
    upload_limit: usize,
}
