//! Ingestion handlers

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Query, State},
    Json,
};
use serde_json::Value;

use crate::models::{IngestParams, IngestResponse};
use crate::{AppResult, AppState};

/// Ingest a column-oriented batch
pub async fn ingest(
    State(state): State<AppState>,
    params: Result<Query<IngestParams>, QueryRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<IngestResponse>> {
    let Query(params) = params?;
    let Json(payload) = payload?;

    let response = submit(&state, &payload, &params).await?;
    tracing::info!("Ingested {} records. Total: {}", response.ingested, response.total);

    Ok(Json(IngestResponse {
        message: format!("Ingested {} records", response.ingested),
        ..response
    }))
}

/// Cross-border exchange: same contract as `ingest`
pub async fn cross_border(
    State(state): State<AppState>,
    params: Result<Query<IngestParams>, QueryRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<IngestResponse>> {
    let Query(params) = params?;
    let Json(payload) = payload?;

    let response = submit(&state, &payload, &params).await?;
    tracing::info!(batch = %response.batch_id, "Cross-border data exchanged ({} records)", response.ingested);

    Ok(Json(IngestResponse {
        message: "Cross-border data exchanged".to_string(),
        ..response
    }))
}

async fn submit(state: &AppState, payload: &Value, params: &IngestParams) -> AppResult<IngestResponse> {
    let report = state.pipeline.ingest(payload).await.map_err(|e| {
        tracing::warn!("Ingestion rejected ({}): {}", e.kind(), e);
        e
    })?;

    Ok(IngestResponse {
        message: String::new(),
        batch_id: report.batch_id,
        ingested: report.ingested,
        total: report.total,
        data: params.snapshot.then(|| state.pipeline.snapshot()),
    })
}
