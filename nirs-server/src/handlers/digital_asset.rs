//! Digital asset handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use nirs_core::TransactionScan;

use crate::models::DigitalAssetRequest;
use crate::{AppResult, AppState};

/// Threshold anomalies + counterparty graph over submitted transfers
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<DigitalAssetRequest>, JsonRejection>,
) -> AppResult<Json<TransactionScan>> {
    let Json(request) = payload?;
    Ok(Json(state.pipeline.scan_transactions(&request.transactions)))
}
