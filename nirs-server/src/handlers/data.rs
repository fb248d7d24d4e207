//! Dataset query handlers

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use nirs_core::{Record, Verification};
use validator::Validate;

use crate::models::DataQuery;
use crate::{AppError, AppResult, AppState};

/// List records matching the query, in insertion order
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<DataQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Record>>> {
    let Query(query) = query?;
    query.validate()?;

    Ok(Json(state.pipeline.query(&query.into_filter())))
}

/// Recompute a stored record's signature
pub async fn verify(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Verification>> {
    let verification = state
        .pipeline
        .verify(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Record {} not found", id)))?;

    Ok(Json(verification))
}
