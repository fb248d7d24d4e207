//! Analytics handlers

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use nirs_core::{KpiReport, RecordAnomaly};
use validator::Validate;

use crate::models::{ForecastQuery, ForecastResponse};
use crate::{AppError, AppResult, AppState};

pub async fn kpis(State(state): State<AppState>) -> AppResult<Json<KpiReport>> {
    let kpis = state.pipeline.kpis().await?;
    tracing::debug!(
        "KPIs: {} records, {} high risk, compliance {}%",
        kpis.total_records,
        kpis.high_risk_count,
        kpis.compliance_rate
    );
    Ok(Json(kpis))
}

pub async fn forecast(
    State(state): State<AppState>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> AppResult<Json<ForecastResponse>> {
    let Query(query) = query?;
    query.validate()?;

    let summary = state.pipeline.summarize(Some(query.request())).await?;
    let forecast = summary
        .forecast
        .ok_or_else(|| AppError::Internal("forecast missing from summary".to_string()))?;

    Ok(Json(ForecastResponse {
        kpis: summary.kpis,
        forecast,
    }))
}

/// Stored records that break a threshold rule
pub async fn anomalies(State(state): State<AppState>) -> AppResult<Json<Vec<RecordAnomaly>>> {
    let anomalies = state.pipeline.scan_records().await?;
    tracing::debug!("{} stored records flagged", anomalies.len());
    Ok(Json(anomalies))
}
