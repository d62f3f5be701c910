use axum::{
    extract::{Path, State},
    response::Json,
};
use std::sync::Arc;

use super::AppState;
use crate::api::models::{GlobalStatsResponse, HeadToHeadResponse};
use crate::errors::ApiResult;
use crate::services::statistics;

pub async fn get_global_statistics(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<GlobalStatsResponse>> {
    let conn = state.pool.get()?;
    let stats = statistics::global_statistics(&conn, &state.engine)?;
    Ok(Json(stats.into()))
}

pub async fn get_head_to_head_comparison(
    State(state): State<Arc<AppState>>,
    Path((player1_id, player2_id)): Path<(i64, i64)>,
) -> ApiResult<Json<HeadToHeadResponse>> {
    let conn = state.pool.get()?;
    let h2h = statistics::head_to_head(&conn, &state.engine, player1_id, player2_id)?;
    Ok(Json(HeadToHeadResponse::new(h2h, &state.engine)))
}
