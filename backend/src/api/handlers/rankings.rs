use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::sync::Arc;

use super::AppState;
use crate::api::models::{RankingEntryResponse, RatingHistoryResponse};
use crate::errors::ApiResult;
use crate::services::rankings;

const DEFAULT_RANKING_LIMIT: usize = 100;
const MAX_RANKING_LIMIT: usize = 500;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingParams {
    pub category: Option<String>,
    pub limit: Option<usize>,
    pub min_matches: Option<i64>,
}

/// A history range bound: either `2024-01-31T18:00:00` or a plain `2024-01-31`.
/// A plain date covers the whole day on both ends of the range.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DateBound {
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

impl DateBound {
    pub fn as_start(self) -> NaiveDateTime {
        match self {
            DateBound::DateTime(at) => at,
            DateBound::Date(day) => day.and_time(NaiveTime::default()),
        }
    }

    pub fn as_end(self) -> NaiveDateTime {
        match self {
            DateBound::DateTime(at) => at,
            DateBound::Date(day) => day
                .and_hms_nano_opt(23, 59, 59, 999_999_999)
                .unwrap_or_else(|| day.and_time(NaiveTime::default())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub start: Option<DateBound>,
    pub end: Option<DateBound>,
}

pub async fn get_rankings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RankingParams>,
) -> ApiResult<Json<Vec<RankingEntryResponse>>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_RANKING_LIMIT)
        .clamp(1, MAX_RANKING_LIMIT);
    let min_matches = params.min_matches.unwrap_or(0).max(0);

    let conn = state.pool.get()?;
    let entries = rankings::list_rankings(
        &conn,
        &state.engine,
        params.category.as_deref(),
        limit,
        min_matches,
    )?;

    Ok(Json(entries.into_iter().map(RankingEntryResponse::from).collect()))
}

pub async fn get_rating_history(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Vec<RatingHistoryResponse>>> {
    let conn = state.pool.get()?;
    let history = rankings::player_history(
        &conn,
        player_id,
        params.start.map(DateBound::as_start),
        params.end.map(DateBound::as_end),
    )?;
    Ok(Json(history.into_iter().map(RatingHistoryResponse::from).collect()))
}
