pub mod admin;
pub mod auth;
pub mod trade;

use axum::http::StatusCode;
use futures::{StreamExt, pin_mut};
use trade_registry_engine::{ChainGateway, TradeSnapshot};

use crate::error::AppError;

#[tracing::instrument]
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Collects a snapshot of every known trade, skipping trades whose reads
/// fail.
///
/// One bad record must never take down a whole listing; failures are logged
/// per trade and the rest of the scan continues.
pub(crate) async fn collect_snapshots(
    gateway: &ChainGateway,
) -> Result<Vec<TradeSnapshot>, AppError> {
    let snapshots = gateway.scan_snapshots().await?;
    pin_mut!(snapshots);

    let mut collected = Vec::new();
    while let Some((trade_id, result)) = snapshots.next().await {
        match result {
            Ok(snapshot) => collected.push(snapshot),
            Err(e) => tracing::error!(%trade_id, "skipping trade during scan: {e}"),
        }
    }

    Ok(collected)
}
